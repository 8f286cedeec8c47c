//! Custom element registry - tag name to definition.
//!
//! One registry per thread, the way a browser has one per window.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::WeakElement;
use crate::error::{BridgeError, Result};

// =============================================================================
// Lifecycle Hooks
// =============================================================================

/// Lifecycle callbacks of an upgraded element.
pub trait CustomElement: Any {
    /// An observed attribute was set or removed.
    fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>) -> Result<()>;

    /// The element was attached to a connected tree.
    fn connected(&self) -> Result<()>;

    /// The element was detached from a connected tree.
    fn disconnected(&self) -> Result<()>;

    /// Upcast for [`super::Element::custom_element`].
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Creates the per-node instance. Receives a weak handle to its host element.
pub type ElementConstructor = Rc<dyn Fn(WeakElement) -> Result<Rc<dyn CustomElement>>>;

/// A registered custom element class.
pub struct ElementDefinition {
    pub name: String,
    /// Lower-cased attribute names that trigger `attribute_changed`.
    pub observed_attributes: Vec<String>,
    pub constructor: ElementConstructor,
}

thread_local! {
    static DEFINITIONS: RefCell<HashMap<String, Rc<ElementDefinition>>> = RefCell::new(HashMap::new());
}

// Names the platform reserves even though they are hyphenated.
const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Check the host's custom element naming rules.
pub fn validate_tag_name(name: &str) -> Result<()> {
    let starts_lower = name.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'));

    if !starts_lower || !valid_chars || !name.contains('-') || RESERVED_NAMES.contains(&name) {
        return Err(BridgeError::InvalidTagName(name.to_string()));
    }
    Ok(())
}

/// Define a custom element.
///
/// Fails with `InvalidTagName` or `DuplicateRegistration`. Elements created
/// before the definition are not upgraded.
pub fn define(definition: ElementDefinition) -> Result<()> {
    validate_tag_name(&definition.name)?;

    DEFINITIONS.with(|defs| {
        let mut defs = defs.borrow_mut();
        if defs.contains_key(&definition.name) {
            return Err(BridgeError::DuplicateRegistration(definition.name.clone()));
        }
        debug!(
            name = %definition.name,
            observed = ?definition.observed_attributes,
            "custom element defined"
        );
        defs.insert(definition.name.clone(), Rc::new(definition));
        Ok(())
    })
}

/// Look up a definition by tag name.
pub fn get_definition(name: &str) -> Option<Rc<ElementDefinition>> {
    DEFINITIONS.with(|defs| defs.borrow().get(name).cloned())
}

pub fn is_defined(name: &str) -> bool {
    DEFINITIONS.with(|defs| defs.borrow().contains_key(name))
}

/// All defined names, sorted.
pub fn defined_names() -> Vec<String> {
    let mut names: Vec<String> = DEFINITIONS.with(|defs| defs.borrow().keys().cloned().collect());
    names.sort();
    names
}

/// Forget every definition (for testing).
pub fn reset_registry() {
    DEFINITIONS.with(|defs| defs.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;

    impl CustomElement for Inert {
        fn attribute_changed(&self, _: &str, _: Option<&str>, _: Option<&str>) -> Result<()> {
            Ok(())
        }
        fn connected(&self) -> Result<()> {
            Ok(())
        }
        fn disconnected(&self) -> Result<()> {
            Ok(())
        }
        fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
            self
        }
    }

    fn inert(name: &str) -> ElementDefinition {
        ElementDefinition {
            name: name.to_string(),
            observed_attributes: Vec::new(),
            constructor: Rc::new(|_| Ok(Rc::new(Inert) as Rc<dyn CustomElement>)),
        }
    }

    #[test]
    fn test_tag_name_rules() {
        assert!(validate_tag_name("x-counter").is_ok());
        assert!(validate_tag_name("my-el.v2_beta").is_ok());
        assert!(validate_tag_name("counter").is_err());
        assert!(validate_tag_name("X-counter").is_err());
        assert!(validate_tag_name("x-Counter").is_err());
        assert!(validate_tag_name("1-counter").is_err());
        assert!(validate_tag_name("font-face").is_err());
        assert!(validate_tag_name("").is_err());
    }

    #[test]
    fn test_define_and_lookup() {
        reset_registry();
        define(inert("x-one")).unwrap();
        define(inert("x-two")).unwrap();

        assert!(is_defined("x-one"));
        assert!(get_definition("x-two").is_some());
        assert!(get_definition("x-three").is_none());
        assert_eq!(defined_names(), vec!["x-one", "x-two"]);
    }

    #[test]
    fn test_duplicate_definition_fails() {
        reset_registry();
        define(inert("x-dup")).unwrap();
        let err = define(inert("x-dup")).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateRegistration(ref n) if n == "x-dup"));
    }
}
