//! Core types for spark-fiber.
//!
//! These are the values that flow from elements through fibers to the host.
//! Nothing here knows about the work loop; everything else builds on it.

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Reserved Prop Keys
// =============================================================================

/// Reserved prop key holding an element's child sequence.
///
/// Children live in their own slot on [`Props`](crate::Props) and are never
/// applied to a host node.
pub const CHILDREN_KEY: &str = "children";

/// Prop key carrying the content of a text element.
pub const TEXT_VALUE_KEY: &str = "value";

/// Prefix that marks a prop key as an event listener (`onClick` -> `click`).
pub const LISTENER_PREFIX: &str = "on";

// =============================================================================
// Listener
// =============================================================================

/// Event listener attached to a host node.
///
/// Listeners compare by identity: two listeners are equal only when they are
/// clones of the same closure. Re-rendering a component that builds a new
/// closure therefore swaps the listener on the host node.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Value)>);

impl Listener {
    /// Wrap a closure as a listener.
    pub fn new(callback: impl Fn(&Value) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invoke the listener with an event payload.
    pub fn call(&self, payload: &Value) {
        (self.0)(payload)
    }

    /// Check whether two listeners wrap the same closure.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Value
// =============================================================================

/// A prop value.
///
/// Plain variants become host attributes, [`Value::Listener`] becomes a host
/// event listener.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Listener(Listener),
}

impl Value {
    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the listener payload, if any.
    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Value::Listener(l) => Some(l),
            _ => None,
        }
    }

    /// Get the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn is_listener(&self) -> bool {
        matches!(self, Value::Listener(_))
    }
}

/// Floats compare by bit pattern, so a `NaN` prop equals itself and is not
/// re-applied on every render.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Listener(a), Value::Listener(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Listener(_) => f.write_str("[listener]"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Listener> for Value {
    fn from(value: Listener) -> Self {
        Value::Listener(value)
    }
}

// =============================================================================
// Effect Tag
// =============================================================================

/// Host mutation a fiber requires at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectTag {
    /// Nothing to do. Only the root anchor keeps this tag.
    #[default]
    None,
    /// Materialize and insert the fiber's host node.
    Create,
    /// Reuse the host node and apply the prop delta.
    Update,
    /// Remove the fiber's host node. Deleted fibers live on the deletion list.
    Delete,
}

// =============================================================================
// Prop Delta (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Classes of host mutation applied while diffing two prop sets.
    ///
    /// An empty delta means the host node was not touched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PropDelta: u8 {
        const LISTENERS_REMOVED = 1 << 0;
        const ATTRIBUTES_REMOVED = 1 << 1;
        const ATTRIBUTES_SET = 1 << 2;
        const LISTENERS_ADDED = 1 << 3;

        const LISTENERS = Self::LISTENERS_REMOVED.bits() | Self::LISTENERS_ADDED.bits();
        const ATTRIBUTES = Self::ATTRIBUTES_REMOVED.bits() | Self::ATTRIBUTES_SET.bits();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_listener_identity() {
        let a = Listener::new(|_| {});
        let b = a.clone();
        let c = Listener::new(|_| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(Value::Listener(a.clone()), Value::Listener(b));
        assert_ne!(Value::Listener(a), Value::Listener(c));
    }

    #[test]
    fn test_listener_call() {
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let listener = Listener::new(move |payload| {
            hits_clone.set(hits_clone.get() + payload.as_int().unwrap_or(1));
        });

        listener.call(&Value::Int(5));
        listener.call(&Value::Null);
        assert_eq!(hits.get(), 6);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("foo").to_string(), "foo");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_float_values_compare_by_bits() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::from(1.5), Value::Float(1.5));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Float(1.0), Value::Int(1));
    }

    #[test]
    fn test_int_conversions() {
        assert_eq!(Value::from(-7i32), Value::Int(-7));
        assert_eq!(Value::from(i32::MAX), Value::Int(2_147_483_647));
    }

    #[test]
    fn test_prop_delta_groups() {
        let delta = PropDelta::ATTRIBUTES_SET | PropDelta::LISTENERS_ADDED;
        assert!(delta.intersects(PropDelta::ATTRIBUTES));
        assert!(delta.intersects(PropDelta::LISTENERS));
        assert!(!delta.contains(PropDelta::ATTRIBUTES_REMOVED));
        assert!(PropDelta::default().is_empty());
    }
}
