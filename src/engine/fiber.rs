//! Fiber Tree - The mutable shadow tree, stored in an arena.
//!
//! Fibers are addressed by [`FiberId`] keys into a slotmap. All links are
//! plain keys:
//!
//! ```text
//!            parent (back-link)
//!                 ▲
//!   previous ◄── fiber ──► sibling
//!  generation      │
//!                  ▼
//!                child
//! ```
//!
//! Ownership is the `child`/`sibling` linkage of the current generation.
//! `parent` and `previous_generation` never keep anything alive: once a
//! generation is unreachable it is swept from the arena and stale keys simply
//! resolve to `None`.

use std::collections::HashSet;

use slotmap::SlotMap;

use crate::primitives::{ElementKind, Props};
use crate::state::HookCell;
use crate::types::EffectTag;

slotmap::new_key_type! {
    /// Key of a fiber in a [`FiberArena`].
    pub struct FiberId;
}

// =============================================================================
// Fiber Kind
// =============================================================================

/// What a fiber stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum FiberKind {
    /// The root anchor: host container plus the single mounted element.
    Root,
    /// A fiber grown from an element.
    Element(ElementKind),
}

impl FiberKind {
    /// Whether a fiber of this kind can be updated in place by `kind`.
    #[inline]
    pub fn matches(&self, kind: &ElementKind) -> bool {
        match self {
            FiberKind::Root => false,
            FiberKind::Element(own) => own == kind,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, FiberKind::Element(ElementKind::Component(_)))
    }
}

// =============================================================================
// Fiber
// =============================================================================

/// One tree position in one render generation.
#[derive(Debug)]
pub struct Fiber<N> {
    pub kind: FiberKind,
    pub props: Props,
    /// Host node, once materialized.
    pub host_node: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    /// Child slot this fiber fills under its parent. Empty slots have no
    /// fiber, so sibling order alone does not give the slot.
    pub index: usize,
    pub effect: EffectTag,
    /// State cells; always empty for non-component fibers.
    pub hooks: Vec<HookCell>,
    previous_generation: Option<FiberId>,
}

impl<N> Fiber<N> {
    /// Create a fiber. `previous_generation` is fixed for the fiber's lifetime.
    pub fn new(
        kind: FiberKind,
        props: Props,
        host_node: Option<N>,
        parent: Option<FiberId>,
        previous_generation: Option<FiberId>,
        effect: EffectTag,
    ) -> Self {
        Self {
            kind,
            props,
            host_node,
            parent,
            child: None,
            sibling: None,
            index: 0,
            effect,
            hooks: Vec::new(),
            previous_generation,
        }
    }

    /// Root anchor fiber wrapping an existing host container.
    pub fn root(container: N, props: Props, previous_generation: Option<FiberId>) -> Self {
        Self::new(
            FiberKind::Root,
            props,
            Some(container),
            None,
            previous_generation,
            EffectTag::None,
        )
    }

    /// The fiber at the same position in the last committed pass.
    #[inline]
    pub fn previous_generation(&self) -> Option<FiberId> {
        self.previous_generation
    }
}

// =============================================================================
// Fiber Arena
// =============================================================================

/// Slotmap arena holding every live fiber generation.
#[derive(Debug)]
pub struct FiberArena<N> {
    fibers: SlotMap<FiberId, Fiber<N>>,
}

impl<N> Default for FiberArena<N> {
    fn default() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }
}

impl<N> FiberArena<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id)
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// The fiber a fiber was diffed against, if it is still in the arena.
    pub fn previous_of(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.get(id)?
            .previous_generation()
            .and_then(|prev| self.get(prev))
    }

    /// Child list of a fiber, first to last.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut next = self.get(id).and_then(|f| f.child);
        while let Some(child) = next {
            out.push(child);
            next = self.get(child).and_then(|f| f.sibling);
        }
        out
    }

    /// Depth-first successor of `id`: its child, else the nearest sibling
    /// found walking up through parents, else `None`.
    pub fn next_unit(&self, id: FiberId) -> Option<FiberId> {
        let fiber = self.get(id)?;
        if let Some(child) = fiber.child {
            return Some(child);
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let fiber = self.get(current)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            cursor = fiber.parent;
        }
        None
    }

    /// Pre-order list of every fiber below `root`, excluding `root`.
    pub fn descendants(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack: Vec<FiberId> = self.children(root).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// Nearest ancestor (parent chain, excluding `id`) that owns a host node.
    pub fn host_parent(&self, id: FiberId) -> Option<FiberId> {
        let mut cursor = self.get(id)?.parent;
        while let Some(current) = cursor {
            let fiber = self.get(current)?;
            if fiber.host_node.is_some() {
                return Some(current);
            }
            cursor = fiber.parent;
        }
        None
    }

    /// Drop every fiber not reachable from `root` through child/sibling links.
    ///
    /// Returns how many fibers were freed.
    pub fn sweep(&mut self, root: FiberId) -> usize {
        let mut live: HashSet<FiberId> = self.descendants(root).into_iter().collect();
        live.insert(root);

        let before = self.fibers.len();
        self.fibers.retain(|id, _| live.contains(&id));
        before - self.fibers.len()
    }
}

impl<N: Clone> FiberArena<N> {
    /// Host node of the nearest host-bearing ancestor.
    pub fn host_parent_node(&self, id: FiberId) -> Option<N> {
        self.host_parent(id)
            .and_then(|parent| self.get(parent))
            .and_then(|fiber| fiber.host_node.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn host_kind(tag: &str) -> FiberKind {
        FiberKind::Element(ElementKind::from(tag))
    }

    /// root ─ a ─ a1
    ///      │   └ a2
    ///      └ b
    fn build() -> (FiberArena<u32>, [FiberId; 5]) {
        let mut arena = FiberArena::new();
        let root = arena.insert(Fiber::root(0, Props::new(), None));
        let a = arena.insert(Fiber::new(host_kind("a"), Props::new(), None, Some(root), None, EffectTag::Create));
        let b = arena.insert(Fiber::new(host_kind("b"), Props::new(), Some(2), Some(root), None, EffectTag::Create));
        let a1 = arena.insert(Fiber::new(host_kind("a1"), Props::new(), Some(3), Some(a), None, EffectTag::Create));
        let a2 = arena.insert(Fiber::new(host_kind("a2"), Props::new(), Some(4), Some(a), None, EffectTag::Create));

        arena.get_mut(root).unwrap().child = Some(a);
        arena.get_mut(a).unwrap().sibling = Some(b);
        arena.get_mut(a).unwrap().child = Some(a1);
        arena.get_mut(a1).unwrap().sibling = Some(a2);

        (arena, [root, a, b, a1, a2])
    }

    #[test]
    fn test_next_unit_is_depth_first() {
        let (arena, [root, a, b, a1, a2]) = build();

        assert_eq!(arena.next_unit(root), Some(a));
        assert_eq!(arena.next_unit(a), Some(a1));
        assert_eq!(arena.next_unit(a1), Some(a2));
        assert_eq!(arena.next_unit(a2), Some(b));
        assert_eq!(arena.next_unit(b), None);
    }

    #[test]
    fn test_descendants_pre_order() {
        let (arena, [root, a, b, a1, a2]) = build();
        assert_eq!(arena.descendants(root), vec![a, a1, a2, b]);
        assert_eq!(arena.children(a), vec![a1, a2]);
    }

    #[test]
    fn test_host_parent_skips_nodeless_fibers() {
        let (arena, [root, a, b, a1, _]) = build();

        // `a` has no host node, so a1's host parent is the root anchor.
        assert_eq!(arena.host_parent(a1), Some(root));
        assert_eq!(arena.host_parent_node(a1), Some(0));
        assert_eq!(arena.host_parent(b), Some(root));
        assert_eq!(arena.host_parent(root), None);
    }

    #[test]
    fn test_sweep_frees_unreachable() {
        let (mut arena, [root, a, _, _, _]) = build();
        let stale = arena.insert(Fiber::new(host_kind("old"), Props::new(), None, None, None, EffectTag::Delete));
        let next = arena.insert(Fiber::new(host_kind("a"), Props::new(), None, Some(root), Some(a), EffectTag::Update));

        assert_eq!(arena.sweep(root), 2);
        assert!(!arena.contains(stale));
        assert!(!arena.contains(next));
        assert_eq!(arena.len(), 5);
    }

    #[test]
    fn test_previous_of_resolves_weakly() {
        let (mut arena, [root, a, _, _, _]) = build();
        let next = arena.insert(Fiber::new(host_kind("a"), Props::new(), None, None, Some(a), EffectTag::Update));

        assert_eq!(arena.previous_of(next).map(|f| f.kind.clone()), Some(host_kind("a")));

        let new_root = arena.insert(Fiber::root(0, Props::new(), Some(root)));
        arena.get_mut(new_root).unwrap().child = Some(next);
        arena.get_mut(next).unwrap().parent = Some(new_root);
        arena.sweep(new_root);

        assert!(arena.previous_of(next).is_none());
        assert_eq!(arena.get(next).unwrap().previous_generation(), Some(a));
    }

    #[test]
    fn test_kind_matching() {
        assert!(host_kind("div").matches(&ElementKind::from("div")));
        assert!(!host_kind("div").matches(&ElementKind::from("span")));
        assert!(!FiberKind::Root.matches(&ElementKind::Text));
    }
}
