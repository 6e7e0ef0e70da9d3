//! Engine - Fiber tree and reconciler.
//!
//! The engine owns the data structures a render pass grows:
//! - Fiber: one tree position in one generation, addressed by `FiberId`
//! - FiberArena: slotmap holding the current and work-in-progress generations
//! - Reconciler: positional diff of new element slots against the old chain
//!
//! # Architecture
//!
//! Fibers are NOT heap objects pointing at each other. They are keys into one
//! arena, and every link is a key:
//!
//! ```text
//! FiberId(1): Root      (child=2)
//! FiberId(2): Component (parent=1, child=3, prev=FiberId(7))
//! FiberId(3): Host div  (parent=2, sibling=None, prev=FiberId(8))
//! ```
//!
//! Back-links (`parent`, `previous_generation`) never own anything, so an old
//! generation disappears as soon as it is swept.

mod fiber;
mod reconcile;

pub use fiber::*;
pub use reconcile::*;
