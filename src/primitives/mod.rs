//! Primitives - The declarative element model.
//!
//! Elements describe the desired tree shape. They have no behavior; the
//! reconciler consumes them to grow the next fiber generation.
//!
//! - **Element** - kind + props + children, cheap to clone
//! - **Component** - render function `(props, hooks) -> Element`
//! - **create_element** - construction with text normalization

mod element;

pub use element::*;
