//! Renderer - The host surface the reconciler mutates.
//!
//! The engine never touches a concrete UI. It materializes and mutates host
//! nodes exclusively through the [`Host`] trait:
//!
//! ```text
//! Element → Fiber (work-in-progress) → commit → Host primitives
//! ```
//!
//! - [`Host`] - node factory + mutation primitives
//! - [`props`] - prop application and update deltas
//! - [`MemoryHost`] - in-memory document, mutation log, event firing
//! - [`terminal`] - crossterm outline printer for a `MemoryHost`

pub mod memory;
pub mod props;
pub mod terminal;

pub use memory::{MemoryHost, MemoryNode, Mutation, MutationDetail, MutationKind};
pub use props::{apply_props, event_name, is_listener_prop};

use std::fmt::Debug;

use crate::types::{Listener, Value};

/// Host collaborator: creates host nodes and applies mutations to them.
///
/// Handles are cheap to clone and compare. The engine stores one handle per
/// materialized fiber and never inspects it.
pub trait Host {
    /// Handle to a host node.
    type Node: Clone + PartialEq + Debug;

    /// Create an element node for a host tag.
    fn create_node(&mut self, tag: &str) -> Self::Node;

    /// Create an empty text node. Its content arrives as the `value` attribute.
    fn create_text_node(&mut self) -> Self::Node;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &Value);

    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn add_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener);

    fn remove_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener);

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
}
