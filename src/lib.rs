//! # spark-fiber
//!
//! Incremental reconciliation engine for declarative trees.
//!
//! ## Architecture
//!
//! A render pass grows a shadow "fiber" tree one fiber at a time, diffing it
//! against the last committed tree, and applies the collected host mutations
//! in a single synchronous commit at the end:
//!
//! ```text
//! Element → Reconciler → Fiber (work-in-progress) → Commit → Host
//! ```
//!
//! Work is cooperative and single-threaded. The host program drives the
//! engine with a time budget per slice; the engine yields between fibers and
//! never exposes a half-finished tree.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Value, Listener, EffectTag, PropDelta)
//! - [`primitives`] - Element model and `create_element`
//! - [`engine`] - Fiber arena and reconciler
//! - [`pipeline`] - Scheduler, commit, mount/driver, config
//! - [`state`] - Hook state cells and dispatch
//! - [`renderer`] - Host trait, in-memory host, terminal outline
//! - [`error`] - Engine errors

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{EngineError, Result};

pub use engine::{Fiber, FiberArena, FiberId, FiberKind};

pub use primitives::{create_element, text_element, Child, Component, Element, ElementKind, Props};

pub use pipeline::{
    flush, mount, mount_with_config, run_until_idle, tick, CommitStats, Deadline, Engine,
    EngineConfig, Phase, SliceBudget, SliceOutcome, UnitBudget,
};

pub use renderer::{Host, MemoryHost, MemoryNode, MutationKind};

pub use state::{Dispatch, HookCell, Hooks, RenderRequest};
