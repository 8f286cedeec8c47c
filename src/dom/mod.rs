//! Host DOM model - the platform side of the custom element bridge.
//!
//! A small in-memory document: elements with attributes and children, text
//! nodes, and a thread-local custom element registry. Mutations fire the
//! custom element lifecycle callbacks the same way a browser would:
//!
//! - `set_attribute` / `remove_attribute` → attribute-changed (observed names only)
//! - attaching to a connected tree → connected, in tree order
//! - detaching from a connected tree → disconnected, in tree order
//!
//! Callback failures are returned to the caller of the mutation.
//!
//! # Example
//!
//! ```ignore
//! use spark_elements::dom::Document;
//!
//! let document = Document::new();
//! let el = document.create_element("x-counter")?;
//! el.set_attribute("count", "3")?;
//! document.body().append_child(el.clone())?; // connected callback runs here
//! ```

mod document;
mod node;
mod registry;

pub use document::Document;
pub use node::{create_element, Element, Node, WeakElement};
pub use registry::{
    define, defined_names, get_definition, is_defined, reset_registry, validate_tag_name,
    CustomElement, ElementConstructor, ElementDefinition,
};
