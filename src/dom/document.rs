//! Document - owner of the connected tree.

use super::node::{create_element, Element, Node};
use crate::error::Result;

/// A document with a connected `<body>`.
pub struct Document {
    body: Element,
}

impl Document {
    pub fn new() -> Self {
        Self {
            body: Element::new_root("body"),
        }
    }

    /// The connected root everything is attached under.
    pub fn body(&self) -> Element {
        self.body.clone()
    }

    /// Create an element, running the custom element constructor if the
    /// tag is defined.
    pub fn create_element(&self, tag: &str) -> Result<Element> {
        create_element(tag)
    }

    pub fn create_text_node(&self, text: &str) -> Node {
        Node::text(text)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
