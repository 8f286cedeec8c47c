//! Elements and text nodes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::registry::{get_definition, CustomElement};
use crate::error::Result;

// =============================================================================
// Node
// =============================================================================

/// A child node: an element or a run of text.
#[derive(Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.text_content(),
        }
    }

    /// Deep copy. Elements are recreated through the registry.
    pub fn clone_deep(&self) -> Result<Node> {
        Ok(match self {
            Node::Text(text) => Node::Text(text.clone()),
            Node::Element(el) => Node::Element(el.clone_deep()?),
        })
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(el) => el.fmt(f),
            Node::Text(text) => write!(f, "{text:?}"),
        }
    }
}

// =============================================================================
// Element
// =============================================================================

struct Upgrade {
    hooks: Rc<dyn CustomElement>,
    observed: Rc<[String]>,
}

struct ElementData {
    tag: String,
    attributes: RefCell<Vec<(String, String)>>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<ElementData>>,
    connected: Cell<bool>,
    upgrade: RefCell<Option<Upgrade>>,
}

/// Shared handle to an element.
#[derive(Clone)]
pub struct Element(Rc<ElementData>);

/// Non-owning element handle, held by custom element instances.
#[derive(Clone)]
pub struct WeakElement(Weak<ElementData>);

impl WeakElement {
    pub fn upgrade(&self) -> Option<Element> {
        self.0.upgrade().map(Element)
    }
}

/// Create an element, upgrading it when its tag is a defined custom element.
pub fn create_element(tag: &str) -> Result<Element> {
    let element = Element::new(tag);
    if let Some(definition) = get_definition(element.tag()) {
        let hooks = (definition.constructor)(element.downgrade())?;
        *element.0.upgrade.borrow_mut() = Some(Upgrade {
            hooks,
            observed: definition.observed_attributes.clone().into(),
        });
    }
    Ok(element)
}

impl Element {
    /// A plain, never-upgraded element.
    pub fn new(tag: &str) -> Self {
        Element(Rc::new(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            connected: Cell::new(false),
            upgrade: RefCell::new(None),
        }))
    }

    /// An element that is the root of a connected tree.
    pub(crate) fn new_root(tag: &str) -> Self {
        let root = Element::new(tag);
        root.0.connected.set(true);
        root
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_connected(&self) -> bool {
        self.0.connected.get()
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.parent.borrow().upgrade().map(Element)
    }

    /// The upgraded instance, downcast to its concrete type.
    pub fn custom_element<T: 'static>(&self) -> Option<Rc<T>> {
        let hooks = self.hooks()?;
        hooks.into_any().downcast::<T>().ok()
    }

    fn hooks(&self) -> Option<Rc<dyn CustomElement>> {
        self.0.upgrade.borrow().as_ref().map(|u| u.hooks.clone())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Attribute value. Names are case-insensitive.
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.0
            .attributes
            .borrow()
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0.attributes.borrow().clone()
    }

    /// Set an attribute and run the attribute-changed callback.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old = {
            let mut attrs = self.0.attributes.borrow_mut();
            match attrs.iter_mut().find(|(k, _)| *k == name) {
                Some(entry) => Some(std::mem::replace(&mut entry.1, value.to_string())),
                None => {
                    attrs.push((name.clone(), value.to_string()));
                    None
                }
            }
        };
        self.attribute_changed(&name, old.as_deref(), Some(value))
    }

    /// Remove an attribute. The callback only runs if it was present.
    pub fn remove_attribute(&self, name: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old = {
            let mut attrs = self.0.attributes.borrow_mut();
            let position = attrs.iter().position(|(k, _)| *k == name);
            position.map(|i| attrs.remove(i).1)
        };
        match old {
            Some(old) => self.attribute_changed(&name, Some(&old), None),
            None => Ok(()),
        }
    }

    fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>) -> Result<()> {
        let hooks = {
            let upgrade = self.0.upgrade.borrow();
            match upgrade.as_ref() {
                Some(u) if u.observed.iter().any(|a| a == name) => u.hooks.clone(),
                _ => return Ok(()),
            }
        };
        hooks.attribute_changed(name, old, new)
    }

    // =========================================================================
    // Children
    // =========================================================================

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    /// Element children only.
    pub fn child_elements(&self) -> Vec<Element> {
        self.0
            .children
            .borrow()
            .iter()
            .filter_map(|n| n.as_element().cloned())
            .collect()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.children.borrow().first().cloned()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn text_content(&self) -> String {
        self.children().iter().map(Node::text_content).collect()
    }

    /// Append a node. An element that already has a parent is moved.
    pub fn append_child(&self, node: impl Into<Node>) -> Result<()> {
        let node = node.into();
        if let Node::Element(child) = &node {
            if let Some(old_parent) = child.parent() {
                old_parent.remove_child(child)?;
            }
            *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }
        self.0.children.borrow_mut().push(node.clone());

        match node {
            Node::Element(child) if self.is_connected() => child.connect_subtree(),
            _ => Ok(()),
        }
    }

    /// Remove a child element. Returns false if it was not a child.
    pub fn remove_child(&self, child: &Element) -> Result<bool> {
        let removed = {
            let mut children = self.0.children.borrow_mut();
            let position = children
                .iter()
                .position(|n| n.as_element().is_some_and(|el| el.ptr_eq(child)));
            position.map(|i| children.remove(i))
        };
        if removed.is_none() {
            return Ok(false);
        }
        *child.0.parent.borrow_mut() = Weak::new();
        if child.is_connected() {
            child.disconnect_subtree()?;
        }
        Ok(true)
    }

    /// Remove every child.
    pub fn clear_children(&self) -> Result<()> {
        let removed = std::mem::take(&mut *self.0.children.borrow_mut());
        for node in removed {
            if let Node::Element(child) = node {
                *child.0.parent.borrow_mut() = Weak::new();
                if child.is_connected() {
                    child.disconnect_subtree()?;
                }
            }
        }
        Ok(())
    }

    /// Replace every child with `nodes`.
    ///
    /// Elements that are already children and appear again in `nodes` stay
    /// attached (only reordered), so they see no disconnect/connect.
    pub fn replace_children(&self, nodes: Vec<Node>) -> Result<()> {
        let kept = |el: &Element| {
            nodes
                .iter()
                .any(|n| n.as_element().is_some_and(|other| other.ptr_eq(el)))
        };

        let old = std::mem::take(&mut *self.0.children.borrow_mut());
        let mut retained = Vec::new();
        for node in old {
            let Node::Element(child) = node else {
                continue;
            };
            if kept(&child) {
                retained.push(child);
                continue;
            }
            *child.0.parent.borrow_mut() = Weak::new();
            if child.is_connected() {
                child.disconnect_subtree()?;
            }
        }

        for node in nodes {
            match &node {
                Node::Element(child) if retained.iter().any(|r| r.ptr_eq(child)) => {
                    retained.retain(|r| !r.ptr_eq(child));
                    self.0.children.borrow_mut().push(node);
                }
                _ => self.append_child(node)?,
            }
        }
        Ok(())
    }

    /// Deep copy: same tag, attributes and cloned children, not connected.
    pub fn clone_deep(&self) -> Result<Element> {
        let copy = create_element(self.tag())?;
        for (name, value) in self.attributes() {
            copy.set_attribute(&name, &value)?;
        }
        for child in self.children() {
            copy.append_child(child.clone_deep()?)?;
        }
        Ok(copy)
    }

    // =========================================================================
    // Connection
    // =========================================================================

    // The callback may rewrite this element's children; anything it appends
    // is already connected, so only still-unconnected children are visited.
    fn connect_subtree(&self) -> Result<()> {
        self.0.connected.set(true);
        if let Some(hooks) = self.hooks() {
            hooks.connected()?;
        }
        for child in self.child_elements() {
            if !child.is_connected() {
                child.connect_subtree()?;
            }
        }
        Ok(())
    }

    fn disconnect_subtree(&self) -> Result<()> {
        self.0.connected.set(false);
        if let Some(hooks) = self.hooks() {
            hooks.disconnected()?;
        }
        for child in self.child_elements() {
            if child.is_connected() {
                child.disconnect_subtree()?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag())?;
        for (name, value) in self.attributes() {
            write!(f, " {name}={value:?}")?;
        }
        f.write_str(">")?;
        for child in self.children() {
            child.fmt(f)?;
        }
        write!(f, "</{}>", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_are_case_insensitive() {
        let el = Element::new("div");
        el.set_attribute("Title", "hello").unwrap();
        assert_eq!(el.get_attribute("title").as_deref(), Some("hello"));
        assert_eq!(el.get_attribute("TITLE").as_deref(), Some("hello"));
        assert_eq!(el.attributes(), vec![("title".to_string(), "hello".to_string())]);

        el.remove_attribute("title").unwrap();
        assert!(!el.has_attribute("title"));
    }

    #[test]
    fn test_append_sets_parent_and_connection() {
        let root = Element::new_root("body");
        let parent = Element::new("div");
        let child = Element::new("span");

        parent.append_child(child.clone()).unwrap();
        assert!(!child.is_connected());
        assert!(child.parent().unwrap().ptr_eq(&parent));

        root.append_child(parent.clone()).unwrap();
        assert!(parent.is_connected());
        assert!(child.is_connected());

        assert!(root.remove_child(&parent).unwrap());
        assert!(!parent.is_connected());
        assert!(!child.is_connected());
        assert!(parent.parent().is_none());
    }

    #[test]
    fn test_append_moves_element() {
        let a = Element::new("div");
        let b = Element::new("div");
        let child = Element::new("p");

        a.append_child(child.clone()).unwrap();
        b.append_child(child.clone()).unwrap();

        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert!(child.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_text_content_and_clone() {
        let el = Element::new("p");
        el.set_attribute("class", "note").unwrap();
        el.append_child(Node::text("Hello ")).unwrap();
        let b = Element::new("b");
        b.append_child(Node::text("world")).unwrap();
        el.append_child(b).unwrap();

        assert_eq!(el.text_content(), "Hello world");

        let copy = el.clone_deep().unwrap();
        assert!(!copy.ptr_eq(&el));
        assert_eq!(copy.text_content(), "Hello world");
        assert_eq!(copy.get_attribute("class").as_deref(), Some("note"));
        assert!(!copy.child_elements()[0].ptr_eq(&el.child_elements()[0]));
    }

    #[test]
    fn test_replace_children() {
        let el = Element::new("div");
        el.append_child(Node::text("old")).unwrap();
        el.replace_children(vec![Node::text("a"), Node::text("b")]).unwrap();
        assert_eq!(el.text_content(), "ab");
        el.clear_children().unwrap();
        assert!(el.first_child().is_none());
    }

    #[test]
    fn test_replace_children_keeps_reused_elements_connected() {
        let root = Element::new_root("body");
        let kept = Element::new("b");
        let dropped = Element::new("i");
        root.append_child(dropped.clone()).unwrap();
        root.append_child(kept.clone()).unwrap();

        let added = Element::new("u");
        root.replace_children(vec![
            Node::text("x"),
            Node::Element(kept.clone()),
            Node::Element(added.clone()),
        ])
        .unwrap();

        assert!(kept.is_connected());
        assert!(kept.parent().unwrap().ptr_eq(&root));
        assert!(added.is_connected());
        assert!(!dropped.is_connected());
        assert!(dropped.parent().is_none());

        let tags: Vec<String> = root.child_elements().iter().map(|e| e.tag().to_string()).collect();
        assert_eq!(tags, vec!["b", "u"]);
        assert_eq!(root.child_count(), 3);
    }
}
