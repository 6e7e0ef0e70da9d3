//! In-memory host - A document tree kept in plain vectors.
//!
//! `MemoryHost` is the reference [`Host`]: nodes are indices into a node
//! vector, every call the engine makes is appended to a mutation log, and
//! listeners can be fired to drive state changes without a real UI.
//!
//! Nodes are never freed. Host nodes built by an abandoned pass simply stay
//! detached.

use std::fmt::Write as _;

use super::Host;
use crate::types::{Listener, Value, TEXT_VALUE_KEY};

// =============================================================================
// Node Handle
// =============================================================================

/// Handle to a node inside a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryNode(usize);

impl MemoryNode {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element(String),
    Text,
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    attributes: Vec<(String, Value)>,
    listeners: Vec<(String, Listener)>,
    children: Vec<MemoryNode>,
    parent: Option<MemoryNode>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

// =============================================================================
// Mutation Log
// =============================================================================

/// Kind of host call recorded in the mutation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateNode,
    CreateTextNode,
    SetAttribute,
    RemoveAttribute,
    AddListener,
    RemoveListener,
    AppendChild,
    RemoveChild,
}

impl MutationKind {
    /// Whether this call changes an existing node (creation does not).
    pub fn is_mutation(self) -> bool {
        !matches!(self, MutationKind::CreateNode | MutationKind::CreateTextNode)
    }
}

/// One recorded host call.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub kind: MutationKind,
    /// Node the call targeted (the parent for append/remove).
    pub node: MemoryNode,
    /// Attribute or event name, or the child for append/remove.
    pub detail: MutationDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationDetail {
    None,
    Name(String),
    Child(MemoryNode),
}

// =============================================================================
// Memory Host
// =============================================================================

/// In-memory document implementing [`Host`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<NodeData>,
    log: Vec<Mutation>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached container node to render into. Not logged.
    pub fn create_container(&mut self, tag: &str) -> MemoryNode {
        self.push(NodeKind::Element(tag.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> MemoryNode {
        let node = MemoryNode(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        node
    }

    fn record(&mut self, kind: MutationKind, node: MemoryNode, detail: MutationDetail) {
        self.log.push(Mutation { kind, node, detail });
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Number of nodes ever created, containers included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Tag of an element node, `None` for text nodes.
    pub fn tag(&self, node: MemoryNode) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text => None,
        }
    }

    pub fn is_text(&self, node: MemoryNode) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|data| data.kind == NodeKind::Text)
    }

    pub fn attribute(&self, node: MemoryNode, name: &str) -> Option<&Value> {
        self.nodes
            .get(node.0)?
            .attributes
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    /// Attributes in the order they were first set.
    pub fn attributes(&self, node: MemoryNode) -> &[(String, Value)] {
        self.nodes
            .get(node.0)
            .map(|data| data.attributes.as_slice())
            .unwrap_or_default()
    }

    pub fn children(&self, node: MemoryNode) -> &[MemoryNode] {
        self.nodes
            .get(node.0)
            .map(|data| data.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: MemoryNode) -> Option<MemoryNode> {
        self.nodes.get(node.0)?.parent
    }

    pub fn listener_count(&self, node: MemoryNode, event: &str) -> usize {
        self.nodes.get(node.0).map_or(0, |data| {
            data.listeners.iter().filter(|(e, _)| e == event).count()
        })
    }

    /// Concatenated content of every text node under `node`.
    pub fn text_content(&self, node: MemoryNode) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: MemoryNode, out: &mut String) {
        if self.is_text(node) {
            if let Some(value) = self.attribute(node, TEXT_VALUE_KEY) {
                let _ = write!(out, "{value}");
            }
            return;
        }
        for &child in self.children(node) {
            self.collect_text(child, out);
        }
    }

    /// Depth-first pre-order walk with depth.
    pub fn walk(&self, root: MemoryNode, visit: &mut dyn FnMut(MemoryNode, usize)) {
        fn go(host: &MemoryHost, node: MemoryNode, depth: usize, visit: &mut dyn FnMut(MemoryNode, usize)) {
            visit(node, depth);
            for &child in host.children(node) {
                go(host, child, depth + 1, visit);
            }
        }
        go(self, root, 0, visit);
    }

    /// One-line description of a node: `<div id="foo">` or `"Hello"`.
    pub fn describe(&self, node: MemoryNode) -> String {
        if self.is_text(node) {
            let text = self
                .attribute(node, TEXT_VALUE_KEY)
                .map(ToString::to_string)
                .unwrap_or_default();
            return format!("{text:?}");
        }
        let mut out = format!("<{}", self.tag(node).unwrap_or("?"));
        for (name, value) in self.attributes(node) {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        out.push('>');
        out
    }

    /// Indented outline of the subtree under `root`, one node per line.
    pub fn outline(&self, root: MemoryNode) -> String {
        let mut out = String::new();
        self.walk(root, &mut |node, depth| {
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), self.describe(node));
        });
        out
    }

    // -------------------------------------------------------------------------
    // Mutation log
    // -------------------------------------------------------------------------

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Count logged calls of one kind.
    pub fn count(&self, kind: MutationKind) -> usize {
        self.log.iter().filter(|m| m.kind == kind).count()
    }

    /// Whether any logged call changed an existing node.
    pub fn has_mutations(&self) -> bool {
        self.log.iter().any(|m| m.kind.is_mutation())
    }

    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Invoke every listener for `event` on `node`.
    ///
    /// Listeners are cloned out first, so they may freely dispatch state
    /// updates. Returns how many listeners ran.
    pub fn fire(&self, node: MemoryNode, event: &str, payload: &Value) -> usize {
        let listeners: Vec<Listener> = self.nodes.get(node.0).map_or_else(Vec::new, |data| {
            data.listeners
                .iter()
                .filter(|(e, _)| e == event)
                .map(|(_, l)| l.clone())
                .collect()
        });
        for listener in &listeners {
            listener.call(payload);
        }
        listeners.len()
    }

    fn detach(&mut self, child: MemoryNode) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }
}

impl Host for MemoryHost {
    type Node = MemoryNode;

    fn create_node(&mut self, tag: &str) -> MemoryNode {
        let node = self.push(NodeKind::Element(tag.to_string()));
        self.record(MutationKind::CreateNode, node, MutationDetail::Name(tag.to_string()));
        node
    }

    fn create_text_node(&mut self) -> MemoryNode {
        let node = self.push(NodeKind::Text);
        self.record(MutationKind::CreateTextNode, node, MutationDetail::None);
        node
    }

    fn set_attribute(&mut self, node: &MemoryNode, name: &str, value: &Value) {
        let attributes = &mut self.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value.clone(),
            None => attributes.push((name.to_string(), value.clone())),
        }
        self.record(MutationKind::SetAttribute, *node, MutationDetail::Name(name.to_string()));
    }

    fn remove_attribute(&mut self, node: &MemoryNode, name: &str) {
        self.nodes[node.0].attributes.retain(|(k, _)| k != name);
        self.record(MutationKind::RemoveAttribute, *node, MutationDetail::Name(name.to_string()));
    }

    fn add_listener(&mut self, node: &MemoryNode, event: &str, listener: &Listener) {
        self.nodes[node.0]
            .listeners
            .push((event.to_string(), listener.clone()));
        self.record(MutationKind::AddListener, *node, MutationDetail::Name(event.to_string()));
    }

    fn remove_listener(&mut self, node: &MemoryNode, event: &str, listener: &Listener) {
        self.nodes[node.0]
            .listeners
            .retain(|(e, l)| !(e == event && l.ptr_eq(listener)));
        self.record(MutationKind::RemoveListener, *node, MutationDetail::Name(event.to_string()));
    }

    fn append_child(&mut self, parent: &MemoryNode, child: &MemoryNode) {
        self.detach(*child);
        self.nodes[parent.0].children.push(*child);
        self.nodes[child.0].parent = Some(*parent);
        self.record(MutationKind::AppendChild, *parent, MutationDetail::Child(*child));
    }

    fn remove_child(&mut self, parent: &MemoryNode, child: &MemoryNode) {
        self.nodes[parent.0].children.retain(|c| c != child);
        if self.nodes[child.0].parent == Some(*parent) {
            self.nodes[child.0].parent = None;
        }
        self.record(MutationKind::RemoveChild, *parent, MutationDetail::Child(*child));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_build_and_outline() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let div = host.create_node("div");
        host.set_attribute(&div, "id", &Value::from("foo"));
        let text = host.create_text_node();
        host.set_attribute(&text, TEXT_VALUE_KEY, &Value::from("Hi"));
        host.append_child(&div, &text);
        host.append_child(&root, &div);

        assert_eq!(host.children(root), &[div]);
        assert_eq!(host.parent(text), Some(div));
        assert_eq!(host.text_content(root), "Hi");
        assert_eq!(host.outline(root), "<root>\n  <div id=\"foo\">\n    \"Hi\"\n");
    }

    #[test]
    fn test_append_moves_node() {
        let mut host = MemoryHost::new();
        let a = host.create_container("a");
        let b = host.create_container("b");
        let child = host.create_node("span");

        host.append_child(&a, &child);
        host.append_child(&b, &child);

        assert!(host.children(a).is_empty());
        assert_eq!(host.children(b), &[child]);
    }

    #[test]
    fn test_remove_child() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let child = host.create_node("p");
        host.append_child(&root, &child);
        host.remove_child(&root, &child);

        assert!(host.children(root).is_empty());
        assert_eq!(host.parent(child), None);
        assert_eq!(host.count(MutationKind::RemoveChild), 1);
    }

    #[test]
    fn test_fire_listeners() {
        let mut host = MemoryHost::new();
        let button = host.create_node("button");
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();
        let listener = Listener::new(move |_| clicks_clone.set(clicks_clone.get() + 1));

        host.add_listener(&button, "click", &listener);
        assert_eq!(host.fire(button, "click", &Value::Null), 1);
        assert_eq!(host.fire(button, "keydown", &Value::Null), 0);

        host.remove_listener(&button, "click", &listener);
        assert_eq!(host.fire(button, "click", &Value::Null), 0);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_creation_is_not_a_mutation() {
        let mut host = MemoryHost::new();
        host.create_node("div");
        host.create_text_node();

        assert_eq!(host.mutations().len(), 2);
        assert!(!host.has_mutations());
    }
}
