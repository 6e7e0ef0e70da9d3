//! Mount API - Entry point and driver loop.
//!
//! The engine does no work on its own. A host program mounts a tree and then
//! calls [`tick`] whenever it has idle time, passing the budget it can spare.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::pipeline::mount;
//!
//! let mut engine = mount::mount(host, app, container);
//!
//! // Option 1: drive until nothing is left
//! mount::run_until_idle(&mut engine, Duration::from_millis(4))?;
//!
//! // Option 2: tick from your own idle callback
//! loop {
//!     mount::tick(&mut engine, Duration::from_millis(4))?;
//!     // handle input, fire listeners ...
//! }
//! ```

use std::time::Duration;

use tracing::trace;

use super::config::EngineConfig;
use super::scheduler::{Engine, SliceBudget, SliceOutcome};
use crate::error::{EngineError, Result};
use crate::primitives::Element;
use crate::renderer::Host;

/// Create an engine and start the first pass for `element` in `container`.
pub fn mount<H: Host>(host: H, element: Element, container: H::Node) -> Engine<H> {
    mount_with_config(host, element, container, EngineConfig::default())
}

/// [`mount`] with an explicit configuration.
pub fn mount_with_config<H: Host>(
    host: H,
    element: Element,
    container: H::Node,
    config: EngineConfig,
) -> Engine<H> {
    let mut engine = Engine::with_config(host, config);
    engine.render(element, container);
    engine
}

/// Run one slice with a wall-clock budget.
///
/// Fails with [`EngineError::NotMounted`] if nothing was ever rendered.
pub fn tick<H: Host>(engine: &mut Engine<H>, budget: Duration) -> Result<SliceOutcome> {
    if !engine.is_mounted() {
        return Err(EngineError::NotMounted);
    }
    engine.work_loop(&SliceBudget::new(budget))
}

/// Drive slices until the engine goes idle.
///
/// Returns the number of slices that did work. A component that dispatches
/// on every render never goes idle; this loop does not guard against that.
pub fn run_until_idle<H: Host>(engine: &mut Engine<H>, budget: Duration) -> Result<usize> {
    let mut slices = 0;
    loop {
        match tick(engine, budget)? {
            SliceOutcome::Idle => break,
            outcome => {
                trace!(?outcome, "slice done");
                slices += 1;
            }
        }
    }
    Ok(slices)
}

/// Drive one complete pass with no time limit.
pub fn flush<H: Host>(engine: &mut Engine<H>) -> Result<usize> {
    run_until_idle(engine, Duration::MAX)
}

// =============================================================================
// Tests
// =============================================================================
