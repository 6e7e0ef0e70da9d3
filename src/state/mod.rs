//! State Module - Component-local state threaded across render passes.
//!
//! - **Hooks** - Index-addressed state cells, pending-action queues, and the
//!   render request raised by `Dispatch`

mod hooks;

pub use hooks::*;
