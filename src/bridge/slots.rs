//! Slot capture - light DOM content projected into the component.

use crate::component::{SlotMap, DEFAULT_SLOT};
use crate::dom::{Element, Node};
use crate::error::Result;

/// Collect the host's light DOM children into slots.
///
/// - The first non-blank top-level text (trimmed) seeds the default slot.
/// - Child elements with a `slot` attribute go to that named slot, in
///   document order. Unnamed child elements take over the default slot
///   from the text. Each is deep-cloned so the original subtree stays
///   intact.
pub fn capture_slots(host: &Element) -> Result<SlotMap> {
    let mut slots = SlotMap::new();

    let text = host
        .children()
        .iter()
        .filter_map(|n| n.as_text().map(str::trim).map(str::to_string))
        .find(|t| !t.is_empty());
    if let Some(text) = text {
        slots.insert(DEFAULT_SLOT.to_string(), vec![Node::Text(text)]);
    }

    let mut default_from_elements = false;
    for child in host.child_elements() {
        let name = match child.get_attribute("slot") {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_SLOT.to_string(),
        };
        if name == DEFAULT_SLOT && !default_from_elements {
            slots.remove(DEFAULT_SLOT);
            default_from_elements = true;
        }
        let copy = child.clone_deep()?;
        slots.entry(name).or_default().push(Node::Element(copy));
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_host() {
        let host = Element::new("x-alert");
        host.append_child(Node::text("   ")).unwrap();
        host.append_child(Node::text("\n  Careful!  ")).unwrap();

        let slots = capture_slots(&host).unwrap();
        let default = &slots[DEFAULT_SLOT];
        assert_eq!(default.len(), 1);
        assert_eq!(default[0].as_text(), Some("Careful!"));
    }

    #[test]
    fn test_empty_host_has_no_slots() {
        let host = Element::new("x-alert");
        host.append_child(Node::text("  ")).unwrap();
        assert!(capture_slots(&host).unwrap().is_empty());
    }

    #[test]
    fn test_named_and_default_elements() {
        let host = Element::new("x-card");
        let footer = Element::new("div");
        footer.set_attribute("slot", "footer").unwrap();
        footer.append_child(Node::text("bye")).unwrap();
        let body = Element::new("p");
        body.append_child(Node::text("hello")).unwrap();
        let unnamed = Element::new("span");
        unnamed.set_attribute("slot", "").unwrap();

        host.append_child(Node::text("replaced by unnamed elements")).unwrap();
        host.append_child(footer.clone()).unwrap();
        host.append_child(body.clone()).unwrap();
        host.append_child(unnamed).unwrap();

        let slots = capture_slots(&host).unwrap();
        assert_eq!(slots.len(), 2);

        let footer_nodes = &slots["footer"];
        assert_eq!(footer_nodes.len(), 1);
        assert_eq!(footer_nodes[0].text_content(), "bye");
        assert!(!footer_nodes[0].as_element().unwrap().ptr_eq(&footer), "projected a clone");

        let default = &slots[DEFAULT_SLOT];
        assert_eq!(default.len(), 2);
        assert_eq!(default[0].as_element().unwrap().tag(), "p");
        assert_eq!(default[1].as_element().unwrap().tag(), "span");

        // Originals untouched
        assert_eq!(host.child_count(), 4);
        assert!(footer.parent().unwrap().ptr_eq(&host));
    }

    #[test]
    fn test_text_kept_beside_named_elements() {
        let host = Element::new("x-card");
        host.append_child(Node::text("  Hello ")).unwrap();
        let footer = Element::new("small");
        footer.set_attribute("slot", "footer").unwrap();
        footer.append_child(Node::text("bye")).unwrap();
        host.append_child(footer).unwrap();

        let slots = capture_slots(&host).unwrap();
        assert_eq!(slots[DEFAULT_SLOT].len(), 1);
        assert_eq!(slots[DEFAULT_SLOT][0].as_text(), Some("Hello"));
        assert_eq!(slots["footer"][0].text_content(), "bye");
    }
}
