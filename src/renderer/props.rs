//! Prop application - Turning a prop diff into host mutations.
//!
//! # Algorithm
//!
//! Given the previous and next prop sets of one host node:
//! 1. Remove listeners that are gone or changed
//! 2. Remove attributes that are gone
//! 3. Set attributes that are new or changed
//! 4. Add listeners that are new or changed
//!
//! Unchanged props cause no host call at all. Materializing a node is the
//! same operation with an empty previous set.

use super::Host;
use crate::primitives::Props;
use crate::types::{PropDelta, Value, LISTENER_PREFIX};

/// A prop becomes a host listener when its value is a listener.
#[inline]
pub fn is_listener_prop(value: &Value) -> bool {
    value.is_listener()
}

/// Host event name for a listener prop key: `onClick` -> `click`.
pub fn event_name(key: &str) -> String {
    key.strip_prefix(LISTENER_PREFIX)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(key)
        .to_lowercase()
}

/// Apply the delta between `previous` and `next` to `node`.
///
/// Returns the classes of mutation that were issued.
pub fn apply_props<H: Host>(
    host: &mut H,
    node: &H::Node,
    previous: &Props,
    next: &Props,
) -> PropDelta {
    let mut delta = PropDelta::empty();

    // 1. Stale listeners
    for (key, value) in previous.iter() {
        let Some(listener) = value.as_listener() else { continue };
        if next.get(key) != Some(value) {
            host.remove_listener(node, &event_name(key), listener);
            delta |= PropDelta::LISTENERS_REMOVED;
        }
    }

    // 2. Gone attributes
    for (key, value) in previous.iter() {
        if is_listener_prop(value) {
            continue;
        }
        let gone = match next.get(key) {
            None => true,
            Some(next_value) => is_listener_prop(next_value),
        };
        if gone {
            host.remove_attribute(node, key);
            delta |= PropDelta::ATTRIBUTES_REMOVED;
        }
    }

    // 3. New or changed attributes
    for (key, value) in next.iter() {
        if is_listener_prop(value) {
            continue;
        }
        if previous.get(key) != Some(value) {
            host.set_attribute(node, key, value);
            delta |= PropDelta::ATTRIBUTES_SET;
        }
    }

    // 4. New or changed listeners
    for (key, value) in next.iter() {
        let Some(listener) = value.as_listener() else { continue };
        if previous.get(key) != Some(value) {
            host.add_listener(node, &event_name(key), listener);
            delta |= PropDelta::LISTENERS_ADDED;
        }
    }

    delta
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{MemoryHost, MutationKind};
    use crate::types::Listener;

    #[test]
    fn test_event_name() {
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onKeyDown"), "keydown");
        assert_eq!(event_name("on"), "on");
        assert_eq!(event_name("submit"), "submit");
    }

    #[test]
    fn test_initial_application() {
        let mut host = MemoryHost::new();
        let node = host.create_node("button");
        let listener = Listener::new(|_| {});
        let props = Props::new()
            .with("id", "go")
            .with("onClick", listener);

        let delta = apply_props(&mut host, &node, &Props::new(), &props);

        assert_eq!(delta, PropDelta::ATTRIBUTES_SET | PropDelta::LISTENERS_ADDED);
        assert_eq!(host.attribute(node, "id"), Some(&Value::from("go")));
        assert_eq!(host.listener_count(node, "click"), 1);
    }

    #[test]
    fn test_identical_props_are_a_no_op() {
        let mut host = MemoryHost::new();
        let node = host.create_node("div");
        let listener = Listener::new(|_| {});
        let props = Props::new().with("id", "a").with("onClick", listener);
        apply_props(&mut host, &node, &Props::new(), &props);
        host.clear_mutations();

        let delta = apply_props(&mut host, &node, &props, &props.clone());

        assert!(delta.is_empty());
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn test_nan_attribute_is_not_reapplied() {
        let mut host = MemoryHost::new();
        let node = host.create_node("meter");
        let props = Props::new().with("value", f64::NAN);
        apply_props(&mut host, &node, &Props::new(), &props);
        host.clear_mutations();

        let next = Props::new().with("value", f64::NAN);
        let delta = apply_props(&mut host, &node, &props, &next);

        assert!(delta.is_empty());
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn test_symmetric_difference() {
        let mut host = MemoryHost::new();
        let node = host.create_node("div");
        let old_listener = Listener::new(|_| {});
        let new_listener = Listener::new(|_| {});

        let previous = Props::new()
            .with("id", "a")
            .with("title", "gone")
            .with("onClick", old_listener);
        apply_props(&mut host, &node, &Props::new(), &previous);
        host.clear_mutations();

        let next = Props::new()
            .with("id", "b")
            .with("onClick", new_listener);
        let delta = apply_props(&mut host, &node, &previous, &next);

        assert_eq!(delta, PropDelta::all());
        assert_eq!(host.count(MutationKind::RemoveListener), 1);
        assert_eq!(host.count(MutationKind::RemoveAttribute), 1);
        assert_eq!(host.count(MutationKind::SetAttribute), 1);
        assert_eq!(host.count(MutationKind::AddListener), 1);
        assert_eq!(host.attribute(node, "id"), Some(&Value::from("b")));
        assert_eq!(host.attribute(node, "title"), None);
        assert_eq!(host.listener_count(node, "click"), 1);
    }
}
