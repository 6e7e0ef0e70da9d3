//! Scheduler - The interruptible work loop.
//!
//! # State machine
//!
//! ```text
//!            render / dispatch
//!   Idle ─────────────────────► Rendering ──(last fiber done)──► ReadyToCommit
//!    ▲                          │  ▲    │                                │
//!    │                          │  └────┘ one fiber per unit              │
//!    │                          └── yield when the budget runs out       │
//!    └──────────────────────────── commit ◄─────────────────────────────┘
//! ```
//!
//! A unit of work (one fiber) always runs to completion. The budget is only
//! checked between units, and at least one unit runs per slice so every slice
//! makes progress.
//!
//! The scheduler never drives itself: the host program calls
//! [`Engine::work_loop`] again at its next idle opportunity, forever.

use std::cell::Cell;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::commit::{commit_root, CommitStats};
use super::config::EngineConfig;
use crate::engine::{process_fiber, Fiber, FiberArena, FiberId};
use crate::error::Result;
use crate::primitives::{Element, Props};
use crate::renderer::Host;
use crate::state::{HookCell, RenderRequest};

// =============================================================================
// Deadlines
// =============================================================================

/// Remaining-time signal for one slice of work.
pub trait Deadline {
    /// Time left before this slice should end.
    fn time_remaining(&self) -> Duration;
}

/// Wall-clock slice budget.
#[derive(Debug, Clone, Copy)]
pub struct SliceBudget {
    deadline: Option<Instant>,
}

impl SliceBudget {
    /// A slice ending `budget` from now.
    pub fn new(budget: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(budget),
        }
    }

    /// A slice that never runs out.
    pub fn unbounded() -> Self {
        Self { deadline: None }
    }
}

impl Deadline for SliceBudget {
    fn time_remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }
}

/// Deterministic budget granting a fixed number of units.
///
/// Each check consumes one unit; the check that consumes the last one reports
/// no time left. Useful for tests and for hosts without a clock.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        if left == 0 { Duration::ZERO } else { Duration::MAX }
    }
}

// =============================================================================
// Phase / Outcome
// =============================================================================

/// Where the engine stands between slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No pending fiber and no work-in-progress tree.
    Idle,
    /// A pending fiber exists.
    Rendering,
    /// Traversal finished; the next slice commits.
    ReadyToCommit,
}

/// Result of one slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    /// Nothing to do.
    Idle,
    /// Budget ran out with work remaining.
    Yielded { units: usize },
    /// The pass finished and was committed in this slice.
    Committed { units: usize, stats: CommitStats },
}

/// Why a pass started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassReason {
    Render,
    Dispatch,
}

// =============================================================================
// Engine
// =============================================================================

/// Host container plus the single element mounted into it.
#[derive(Debug, Clone)]
struct RootAnchor<N> {
    container: N,
    element: Element,
}

/// Reconciliation engine for one root.
///
/// Owns the host, the fiber arena, both generation pointers, the pending
/// fiber, and the deletion list. Nothing here is global; run as many engines
/// as there are roots.
pub struct Engine<H: Host> {
    host: H,
    config: EngineConfig,
    arena: FiberArena<H::Node>,
    anchor: Option<RootAnchor<H::Node>>,
    current_root: Option<FiberId>,
    wip_root: Option<FiberId>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    request: RenderRequest,
}

impl<H: Host> Engine<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    pub fn with_config(host: H, config: EngineConfig) -> Self {
        Self {
            host,
            config,
            arena: FiberArena::new(),
            anchor: None,
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            request: RenderRequest::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Entry point
    // -------------------------------------------------------------------------

    /// Mount `element` into `container`, starting a new pass.
    ///
    /// The new root's previous generation is the committed root, so rendering
    /// into the same container again diffs instead of rebuilding.
    pub fn render(&mut self, element: Element, container: H::Node) {
        self.request.take();
        self.anchor = Some(RootAnchor {
            container: container.clone(),
            element: element.clone(),
        });
        let props = Props::new().with_children(vec![Some(element)]);
        self.start_pass(container, props, PassReason::Render);
    }

    fn start_pass(&mut self, container: H::Node, props: Props, reason: PassReason) {
        let root = self.arena.insert(Fiber::root(container, props, self.current_root));
        if self.wip_root.is_some() {
            debug!(?reason, "abandoning in-progress pass");
        }
        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.deletions.clear();
        debug!(?reason, previous = ?self.current_root, "render pass started");
    }

    /// Restart at the committed root after a state dispatch.
    fn restart_from_dispatch(&mut self) {
        let Some(anchor) = &self.anchor else {
            trace!("dispatch before any render, ignoring");
            return;
        };
        let committed = self.current_root.and_then(|id| self.arena.get(id));
        let container = committed
            .and_then(|root| root.host_node.clone())
            .unwrap_or_else(|| anchor.container.clone());
        let props = committed.map_or_else(
            || Props::new().with_children(vec![Some(anchor.element.clone())]),
            |root| root.props.clone(),
        );
        self.start_pass(container, props, PassReason::Dispatch);
    }

    // -------------------------------------------------------------------------
    // Work loop
    // -------------------------------------------------------------------------

    /// Run one slice of work under `deadline`.
    ///
    /// Processes fibers until the budget runs out or traversal completes, then
    /// commits if the pass is finished. Invariant violations found at commit
    /// are returned as errors and leave the host untouched.
    pub fn work_loop(&mut self, deadline: &dyn Deadline) -> Result<SliceOutcome> {
        let mut units = 0;
        let mut should_yield = false;

        while !should_yield {
            if self.request.take() {
                self.restart_from_dispatch();
            }
            let Some(unit) = self.next_unit else { break };

            process_fiber(
                &mut self.host,
                &mut self.arena,
                &mut self.deletions,
                &self.request,
                unit,
            );
            self.next_unit = self.arena.next_unit(unit);
            units += 1;

            should_yield = deadline.time_remaining() < self.config.yield_threshold
                || self
                    .config
                    .max_units_per_slice
                    .is_some_and(|max| units >= max);
        }

        // A dispatch during the last unit invalidates the finished traversal.
        if self.request.take() {
            self.restart_from_dispatch();
        }

        if self.next_unit.is_none() {
            if let Some(root) = self.wip_root {
                let stats = self.commit(root)?;
                return Ok(SliceOutcome::Committed { units, stats });
            }
        }

        if units == 0 && self.wip_root.is_none() {
            return Ok(SliceOutcome::Idle);
        }
        trace!(units, "slice yielded");
        Ok(SliceOutcome::Yielded { units })
    }

    fn commit(&mut self, root: FiberId) -> Result<CommitStats> {
        let mut stats = commit_root(&mut self.host, &self.arena, root, &self.deletions)?;

        self.current_root = Some(root);
        self.wip_root = None;
        self.deletions.clear();
        self.settle_hooks(root);

        if self.config.sweep_stale_fibers {
            stats.swept = self.arena.sweep(root);
        }
        debug!(swept = stats.swept, live = self.arena.len(), "generation promoted to current");
        Ok(stats)
    }

    /// Trim every action the committed cells already include.
    fn settle_hooks(&mut self, root: FiberId) {
        for id in self.arena.descendants(root) {
            if let Some(fiber) = self.arena.get_mut(id) {
                fiber.hooks.iter_mut().for_each(HookCell::settle);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        match (self.next_unit, self.wip_root) {
            (Some(_), _) => Phase::Rendering,
            (None, Some(_)) => Phase::ReadyToCommit,
            (None, None) => Phase::Idle,
        }
    }

    /// Whether a slice would do anything: pending work or a pending dispatch.
    pub fn has_work(&self) -> bool {
        self.wip_root.is_some() || (self.request.is_pending() && self.anchor.is_some())
    }

    /// No pass in flight and no dispatch waiting.
    pub fn is_idle(&self) -> bool {
        !self.has_work()
    }

    pub fn is_mounted(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn arena(&self) -> &FiberArena<H::Node> {
        &self.arena
    }

    pub fn fiber(&self, id: FiberId) -> Option<&Fiber<H::Node>> {
        self.arena.get(id)
    }

    /// Root of the last committed generation.
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Root of the generation being built.
    pub fn work_in_progress(&self) -> Option<FiberId> {
        self.wip_root
    }

    pub fn pending_deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    /// Host container of the root anchor.
    pub fn container(&self) -> Option<&H::Node> {
        self.anchor.as_ref().map(|anchor| &anchor.container)
    }
}

// =============================================================================
// Tests
// =============================================================================
