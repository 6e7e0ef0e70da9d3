//! Render Pipeline
//!
//! This module drives elements through fibers to host mutations.
//!
//! # Pipeline Architecture
//!
//! ```text
//! render(element) → work loop (reconcile fiber by fiber) → commit → host
//!        ▲                                                          │
//!        └──────────────── dispatch (state update) ◄────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. **scheduler** - `Engine` owns both generations and runs time-sliced
//!    passes over the work-in-progress tree
//! 2. **commit** - Applies deletions, insertions, and prop deltas in one
//!    synchronous sweep
//! 3. **mount** - Entry point plus the `tick` / `run_until_idle` driver
//!
//! ## Key Design Principles
//!
//! - **Interruptible render**: yields only between fibers
//! - **Atomic commit**: no host mutation is visible before the pass completes
//! - **No globals**: one `Engine` per root, passed explicitly

pub mod commit;
pub mod config;
pub mod mount;
pub mod scheduler;

// Re-exports
pub use commit::{commit_root, CommitStats};
pub use config::EngineConfig;
pub use mount::{flush, mount, mount_with_config, run_until_idle, tick};
pub use scheduler::{Deadline, Engine, Phase, SliceBudget, SliceOutcome, UnitBudget};
