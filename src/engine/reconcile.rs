//! Reconciler - Grow the next fiber generation one fiber at a time.
//!
//! # Algorithm
//!
//! `reconcile_children` walks the new element slots in lockstep with the old
//! child list (`parent.previous_generation.child`), pairing by slot index.
//! Every fiber records the slot it fills, so empty slots in either
//! generation keep later siblings paired with the right old fiber:
//!
//! ```text
//! slot:  0     1     2     3
//! new:  [div, p,    None, span]
//! old:  [div, span, b,    None]
//!        │    │     │     │
//!     Update  Create Delete Create
//!             +Delete(span)
//! ```
//!
//! Positional matching only: reordering children produces create/delete
//! pairs, never moves.
//!
//! `process_fiber` is one unit of work: materialize a host node when missing
//! and reconcile the fiber's children, or run a component and reconcile its
//! single result.

use tracing::trace;

use super::fiber::{Fiber, FiberArena, FiberId, FiberKind};
use crate::primitives::{Element, ElementKind, Props};
use crate::renderer::{apply_props, Host};
use crate::state::{Hooks, RenderRequest};
use crate::types::EffectTag;

// =============================================================================
// Reconcile Children
// =============================================================================

/// Link fresh child fibers under `parent` for the given element slots.
///
/// Old fibers that lose their position are tagged `Delete` and appended to
/// `deletions`; they are never linked into the new tree.
pub fn reconcile_children<N: Clone>(
    arena: &mut FiberArena<N>,
    deletions: &mut Vec<FiberId>,
    parent: FiberId,
    elements: &[Option<Element>],
) {
    let old: Vec<(usize, FiberId)> = arena
        .get(parent)
        .and_then(Fiber::previous_generation)
        .map(|previous| arena.children(previous))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|id| arena.get(id).map(|fiber| (fiber.index, id)))
        .collect();
    let slots = old
        .last()
        .map_or(0, |&(index, _)| index + 1)
        .max(elements.len());
    let mut old = old.into_iter().peekable();
    let mut previous_new: Option<FiberId> = None;

    if let Some(fiber) = arena.get_mut(parent) {
        fiber.child = None;
    }

    for index in 0..slots {
        // Old slots ascend; drop any the cursor has passed.
        while old.next_if(|&(slot, _)| slot < index).is_some() {}
        let old_id = old.next_if(|&(slot, _)| slot == index).map(|(_, id)| id);
        let element = elements.get(index).and_then(Option::as_ref);

        let reuse = match (element, old_id.and_then(|id| arena.get(id))) {
            (Some(element), Some(fiber)) if fiber.kind.matches(element.kind()) => {
                Some(fiber.host_node.clone())
            }
            _ => None,
        };

        let new_fiber = match (element, reuse) {
            (Some(element), Some(host_node)) => Some(Fiber::new(
                FiberKind::Element(element.kind().clone()),
                element.props().clone(),
                host_node,
                Some(parent),
                old_id,
                EffectTag::Update,
            )),
            (element, None) => {
                if let Some(old_id) = old_id {
                    if let Some(fiber) = arena.get_mut(old_id) {
                        fiber.effect = EffectTag::Delete;
                        deletions.push(old_id);
                    }
                }
                element.map(|element| {
                    Fiber::new(
                        FiberKind::Element(element.kind().clone()),
                        element.props().clone(),
                        None,
                        Some(parent),
                        None,
                        EffectTag::Create,
                    )
                })
            }
            (None, Some(_)) => None,
        };

        if let Some(mut fiber) = new_fiber {
            fiber.index = index;
            let id = arena.insert(fiber);
            let link = match previous_new {
                Some(sibling) => arena.get_mut(sibling).map(|f| &mut f.sibling),
                None => arena.get_mut(parent).map(|f| &mut f.child),
            };
            if let Some(link) = link {
                *link = Some(id);
            }
            previous_new = Some(id);
        }
    }
}

// =============================================================================
// Fiber Processing
// =============================================================================

/// Run one unit of work on `id`.
pub fn process_fiber<H: Host>(
    host: &mut H,
    arena: &mut FiberArena<H::Node>,
    deletions: &mut Vec<FiberId>,
    request: &RenderRequest,
    id: FiberId,
) {
    let Some(fiber) = arena.get(id) else { return };

    match fiber.kind.clone() {
        FiberKind::Root => {
            let children = fiber.props.children().to_vec();
            reconcile_children(arena, deletions, id, &children);
        }
        FiberKind::Element(ElementKind::Component(component)) => {
            let props = fiber.props.clone();
            let previous = arena
                .previous_of(id)
                .map(|prev| prev.hooks.clone())
                .unwrap_or_default();

            let mut hooks = Hooks::new(previous, request.clone());
            let element = component.render(&props, &mut hooks);
            trace!(component = component.name(), hooks = hooks.index(), "component rendered");

            if let Some(fiber) = arena.get_mut(id) {
                fiber.hooks = hooks.into_cells();
            }
            reconcile_children(arena, deletions, id, &[Some(element)]);
        }
        FiberKind::Element(kind) => {
            if fiber.host_node.is_none() {
                let node = match &kind {
                    ElementKind::Host(tag) => host.create_node(tag),
                    _ => host.create_text_node(),
                };
                apply_props(host, &node, &Props::new(), &fiber.props);
                if let Some(fiber) = arena.get_mut(id) {
                    fiber.host_node = Some(node);
                }
            }

            let children = arena
                .get(id)
                .map(|f| f.props.children().to_vec())
                .unwrap_or_default();
            reconcile_children(arena, deletions, id, &children);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
