//! Element Model - Immutable description of the desired tree.
//!
//! An [`Element`] is a kind, an ordered prop map, and an ordered child
//! sequence. Elements carry no identity: the reconciler compares only their
//! [`ElementKind`] and position.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{children, create_element, Props};
//!
//! let tree = create_element(
//!     "div",
//!     Props::new().with("id", "foo"),
//!     children![create_element("h1", Props::new(), children!["Hello"])],
//! );
//! ```

use std::fmt;
use std::rc::Rc;

use crate::state::Hooks;
use crate::types::{Value, TEXT_VALUE_KEY};

// =============================================================================
// Component
// =============================================================================

/// Render function of a component.
pub type RenderFn = dyn Fn(&Props, &mut Hooks) -> Element;

/// A function component.
///
/// Components compare by identity, so build each one once and clone it into
/// every element that uses it. Two separately constructed components are two
/// different kinds, even when their closures are identical.
#[derive(Clone)]
pub struct Component {
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    /// Create a component from its render function.
    pub fn new(
        name: &'static str,
        render: impl Fn(&Props, &mut Hooks) -> Element + 'static,
    ) -> Self {
        Self {
            name,
            render: Rc::new(render),
        }
    }

    /// Debug name of the component.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the render function once.
    pub fn render(&self, props: &Props, hooks: &mut Hooks) -> Element {
        (self.render)(props, hooks)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

// =============================================================================
// Element Kind
// =============================================================================

/// What an element materializes into.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Host node with the given tag.
    Host(String),
    /// Host text node; content lives in the `value` prop.
    Text,
    /// Function component producing exactly one element.
    Component(Component),
}

impl ElementKind {
    /// Host tag, if this is a host kind.
    pub fn tag(&self) -> Option<&str> {
        match self {
            ElementKind::Host(tag) => Some(tag),
            _ => None,
        }
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        ElementKind::Host(tag.to_string())
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        ElementKind::Host(tag)
    }
}

impl From<Component> for ElementKind {
    fn from(component: Component) -> Self {
        ElementKind::Component(component)
    }
}

impl From<&Component> for ElementKind {
    fn from(component: &Component) -> Self {
        ElementKind::Component(component.clone())
    }
}

// =============================================================================
// Props
// =============================================================================

/// Ordered prop map plus the reserved children slot.
///
/// A `None` child is an empty slot: it keeps the positions of its siblings
/// stable and deletes whatever previously lived there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: Vec<(String, Value)>,
    children: Vec<Option<Element>>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Props::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder that replaces the children slot.
    pub fn with_children(mut self, children: Vec<Option<Element>>) -> Self {
        self.children = children;
        self
    }

    /// Insert or replace a prop, keeping first-insertion order.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a prop by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Iterate props in insertion order. Children are not included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of props, not counting children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The child slots.
    pub fn children(&self) -> &[Option<Element>] {
        &self.children
    }
}

// =============================================================================
// Element
// =============================================================================

/// Immutable element. Cloning is cheap.
#[derive(Clone)]
pub struct Element(Rc<ElementData>);

struct ElementData {
    kind: ElementKind,
    props: Props,
}

impl Element {
    /// Build an element from a kind and fully-formed props.
    pub fn new(kind: impl Into<ElementKind>, props: Props) -> Self {
        Self(Rc::new(ElementData {
            kind: kind.into(),
            props,
        }))
    }

    pub fn kind(&self) -> &ElementKind {
        &self.0.kind
    }

    pub fn props(&self) -> &Props {
        &self.0.props
    }

    pub fn children(&self) -> &[Option<Element>] {
        self.0.props.children()
    }

    /// Text content, for text elements.
    pub fn text(&self) -> Option<&str> {
        match self.kind() {
            ElementKind::Text => self.props().get(TEXT_VALUE_KEY).and_then(Value::as_str),
            _ => None,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || (self.0.kind == other.0.kind && self.0.props == other.0.props)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.0.kind)
            .field("props", &self.0.props)
            .finish()
    }
}

// =============================================================================
// Child normalization
// =============================================================================

/// A child passed to [`create_element`].
///
/// Anything that is not already an element becomes a text element.
#[derive(Debug, Clone)]
pub enum Child {
    Element(Element),
    Text(String),
    Empty,
}

impl Child {
    fn into_slot(self) -> Option<Element> {
        match self {
            Child::Element(element) => Some(element),
            Child::Text(text) => Some(text_element(text)),
            Child::Empty => None,
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<Option<Element>> for Child {
    fn from(element: Option<Element>) -> Self {
        element.map_or(Child::Empty, Child::Element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Text(value.to_string())
    }
}

/// Build a `Vec<Child>` from heterogeneous children.
///
/// ```ignore
/// children![create_element("b", Props::new(), children![]), "text", 42]
/// ```
#[macro_export]
macro_rules! children {
    ($($child:expr),* $(,)?) => {
        vec![$($crate::Child::from($child)),*]
    };
}

/// Build an element, normalizing every non-element child into a text element.
pub fn create_element(
    kind: impl Into<ElementKind>,
    props: Props,
    children: Vec<Child>,
) -> Element {
    let slots = children.into_iter().map(Child::into_slot).collect();
    Element::new(kind, props.with_children(slots))
}

/// Build a text element.
pub fn text_element(text: impl Into<String>) -> Element {
    Element::new(
        ElementKind::Text,
        Props::new().with(TEXT_VALUE_KEY, Value::Str(text.into())),
    )
}

// =============================================================================
// Tests
// =============================================================================
