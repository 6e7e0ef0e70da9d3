//! Hook State Store - Per-component state cells threaded across passes.
//!
//! Every time a component fiber is processed it receives a fresh [`Hooks`]
//! context. Calls to [`Hooks::use_state`] are addressed purely by call order:
//! the n-th call reads the n-th cell of the fiber's previous generation.
//!
//! # Cell lifecycle
//!
//! Each hook slot owns one action queue shared by every generation of the
//! slot. A cell records how many queued actions its value already includes:
//!
//! ```text
//! committed:  cell(value=3, folded=0)   queue=[+1, *2]   <- dispatch pushes here
//! next pass:  cell(value=fold([+1, *2], 3)=8, folded=2)
//! commit:     queue trimmed to [], folded=0
//! ```
//!
//! Any [`Dispatch`] for the slot, whichever render handed it out, writes to
//! the same queue. A pass abandoned by a restart therefore never loses an
//! action: the restarted pass folds everything past the committed cell's
//! count.
//!
//! # Contract
//!
//! A component must call `use_state` the same number of times, in the same
//! order, on every render. Anything else is undefined behavior: cells are
//! matched by index only. A cell whose stored type does not match the
//! requested type is re-seeded from `initial` and a warning is logged.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{trace, warn};

// =============================================================================
// Render Request
// =============================================================================

/// Shared flag raised by [`Dispatch`] and consumed by the scheduler.
///
/// One request restarts the pass at the root anchor no matter how many
/// dispatches raised it.
#[derive(Clone, Default)]
pub struct RenderRequest(Rc<Cell<bool>>);

impl RenderRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a new render pass.
    pub fn request(&self) {
        self.0.set(true);
    }

    /// Check for a pending request without consuming it.
    pub fn is_pending(&self) -> bool {
        self.0.get()
    }

    /// Consume the pending request, if any.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderRequest").field(&self.0.get()).finish()
    }
}

// =============================================================================
// Hook Cell
// =============================================================================

/// Type-erased `Box<dyn Fn(&T) -> T>`.
type ErasedAction = Rc<dyn Any>;

/// One index-addressed state slot of a component fiber.
#[derive(Clone)]
pub struct HookCell {
    value: Rc<dyn Any>,
    queue: Rc<RefCell<Vec<ErasedAction>>>,
    /// Leading queue entries already included in `value`.
    folded: usize,
}

impl HookCell {
    fn new(value: Rc<dyn Any>, queue: Rc<RefCell<Vec<ErasedAction>>>, folded: usize) -> Self {
        Self {
            value,
            queue,
            folded,
        }
    }

    /// Committed value of this cell, if it holds a `T`.
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Number of queued actions not yet included in this cell's value.
    pub fn pending_len(&self) -> usize {
        self.queue.borrow().len().saturating_sub(self.folded)
    }

    /// Fold every action queued after this cell's count over `value`.
    ///
    /// Returns the new value and the queue length it covers. The queue is
    /// read, not drained: a pass abandoned by a restart must leave it intact
    /// for the pass that replaces it.
    fn fold<T: 'static>(&self, mut value: T) -> (T, usize) {
        let actions: Vec<ErasedAction> = self.queue.borrow().clone();
        for action in actions.iter().skip(self.folded) {
            match action.downcast_ref::<Box<dyn Fn(&T) -> T>>() {
                Some(action) => value = action(&value),
                None => warn!("state action type does not match its cell, skipping"),
            }
        }
        (value, actions.len())
    }

    /// Drop the queued actions this cell's value already includes.
    ///
    /// Called once the cell's generation is committed; older generations of
    /// the slot are never read again.
    pub fn settle(&mut self) {
        let mut queue = self.queue.borrow_mut();
        let folded = self.folded.min(queue.len());
        queue.drain(..folded);
        self.folded = 0;
    }
}

impl fmt::Debug for HookCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCell")
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// State setter returned by [`Hooks::use_state`].
///
/// Every call enqueues an action on the cell and requests a new pass rooted
/// at the committed root. Actions queued before that pass begins are all
/// applied, in call order.
pub struct Dispatch<T> {
    queue: Rc<RefCell<Vec<ErasedAction>>>,
    request: RenderRequest,
    _marker: PhantomData<fn(&T) -> T>,
}

impl<T: 'static> Dispatch<T> {
    /// Enqueue an update action.
    pub fn dispatch(&self, action: impl Fn(&T) -> T + 'static) {
        let action: Box<dyn Fn(&T) -> T> = Box::new(action);
        let mut queue = self.queue.borrow_mut();
        queue.push(Rc::new(action));
        trace!(queued = queue.len(), "state action queued");
        self.request.request();
    }

    /// Enqueue a replacement value.
    pub fn set(&self, value: T)
    where
        T: Clone,
    {
        self.dispatch(move |_| value.clone());
    }
}

impl<T> Clone for Dispatch<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            request: self.request.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Dispatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

// =============================================================================
// Hooks Context
// =============================================================================

/// Hook context for the component fiber currently being processed.
pub struct Hooks {
    previous: Vec<HookCell>,
    cells: Vec<HookCell>,
    request: RenderRequest,
}

impl Hooks {
    /// Start a render with the previous generation's cells.
    pub fn new(previous: Vec<HookCell>, request: RenderRequest) -> Self {
        Self {
            previous,
            cells: Vec::new(),
            request,
        }
    }

    /// Index-addressed local state.
    ///
    /// Returns the current value and a setter. The value is `initial` when the
    /// fiber has no previous cell at this index; otherwise it is the previous
    /// committed value advanced by every action the slot queued since.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, Dispatch<T>) {
        let index = self.cells.len();

        let (value, queue, folded) = match self.previous.get(index) {
            Some(previous) => match previous.value::<T>() {
                Some(committed) => {
                    let (value, folded) = previous.fold(committed.clone());
                    (value, previous.queue.clone(), folded)
                }
                None => {
                    warn!(index, "state cell type changed between renders, reseeding");
                    (initial, Rc::default(), 0)
                }
            },
            None => (initial, Rc::default(), 0),
        };

        let cell = HookCell::new(Rc::new(value.clone()), queue, folded);
        let dispatch = Dispatch {
            queue: cell.queue.clone(),
            request: self.request.clone(),
            _marker: PhantomData,
        };
        self.cells.push(cell);

        (value, dispatch)
    }

    /// Number of hook calls made so far in this render.
    pub fn index(&self) -> usize {
        self.cells.len()
    }

    /// Finish the render, yielding the cells to store on the fiber.
    pub fn into_cells(self) -> Vec<HookCell> {
        self.cells
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn render_once<T: Clone + 'static>(
        previous: Vec<HookCell>,
        request: &RenderRequest,
        initial: T,
    ) -> (T, Dispatch<T>, Vec<HookCell>) {
        let mut hooks = Hooks::new(previous, request.clone());
        let (value, dispatch) = hooks.use_state(initial);
        (value, dispatch, hooks.into_cells())
    }

    #[test]
    fn test_initial_value_without_previous() {
        let request = RenderRequest::new();
        let (value, _, cells) = render_once(Vec::new(), &request, 0);

        assert_eq!(value, 0);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].value::<i32>(), Some(&0));
        assert!(!request.is_pending());
    }

    #[test]
    fn test_dispatch_threads_into_next_render() {
        let request = RenderRequest::new();
        let (first, dispatch, cells) = render_once(Vec::new(), &request, 0);
        assert_eq!(first, 0);

        dispatch.dispatch(|c| c + 1);
        assert!(request.take());

        let (second, _, _) = render_once(cells, &request, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn test_actions_fold_in_enqueue_order() {
        let request = RenderRequest::new();
        let (_, dispatch, cells) = render_once(Vec::new(), &request, 3);

        dispatch.dispatch(|c| c + 1);
        dispatch.dispatch(|c| c * 2);

        let (value, _, _) = render_once(cells, &request, 3);
        assert_eq!(value, 8);
    }

    #[test]
    fn test_fold_does_not_drain_queue() {
        let request = RenderRequest::new();
        let (_, dispatch, cells) = render_once(Vec::new(), &request, 10);
        dispatch.dispatch(|c| c - 1);

        // An abandoned pass reads the queue, the restarted pass reads it again.
        let (abandoned, _, _) = render_once(cells.clone(), &request, 10);
        let (restarted, _, _) = render_once(cells.clone(), &request, 10);

        assert_eq!(abandoned, 9);
        assert_eq!(restarted, 9);
        assert_eq!(cells[0].pending_len(), 1);
    }

    #[test]
    fn test_slot_queue_is_shared_across_generations() {
        let request = RenderRequest::new();
        let (_, first_setter, committed) = render_once(Vec::new(), &request, 0);

        // A render that never commits hands out a newer setter for the slot.
        first_setter.dispatch(|c| c + 1);
        let (seen, newer_setter, _abandoned) = render_once(committed.clone(), &request, 0);
        assert_eq!(seen, 1);
        newer_setter.dispatch(|c| c + 1);

        // Restarting from the committed cell picks up both actions.
        let (value, _, cells) = render_once(committed, &request, 0);
        assert_eq!(value, 2);
        assert_eq!(cells[0].pending_len(), 0);
    }

    #[test]
    fn test_settle_trims_folded_actions() {
        let request = RenderRequest::new();
        let (_, setter, committed) = render_once(Vec::new(), &request, 1);
        setter.dispatch(|c| c * 10);

        let (value, _, mut cells) = render_once(committed, &request, 1);
        assert_eq!(value, 10);
        cells[0].settle();
        assert_eq!(cells[0].pending_len(), 0);

        // Later actions still apply once, on top of the settled value.
        setter.dispatch(|c| c + 5);
        assert_eq!(cells[0].pending_len(), 1);
        let (value, _, _) = render_once(cells, &request, 1);
        assert_eq!(value, 15);
    }

    #[test]
    fn test_cells_are_index_addressed() {
        let request = RenderRequest::new();
        let mut hooks = Hooks::new(Vec::new(), request.clone());
        let (_, set_a) = hooks.use_state("a".to_string());
        let (_, set_b) = hooks.use_state(1u8);
        assert_eq!(hooks.index(), 2);
        let cells = hooks.into_cells();

        set_b.set(9);
        set_a.set("z".to_string());

        let mut hooks = Hooks::new(cells, request);
        let (a, _) = hooks.use_state(String::new());
        let (b, _) = hooks.use_state(0u8);
        assert_eq!(a, "z");
        assert_eq!(b, 9);
    }

    #[test]
    fn test_type_mismatch_reseeds() {
        let request = RenderRequest::new();
        let (_, _, cells) = render_once(Vec::new(), &request, 5i32);

        let (value, _, _) = render_once(cells, &request, "fresh".to_string());
        assert_eq!(value, "fresh");
    }
}
