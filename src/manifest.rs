//! Element manifests - declarative registration.
//!
//! A manifest maps tag names to components from a [`ComponentLibrary`]:
//!
//! ```json
//! {
//!   "elements": [
//!     { "tag": "x-counter", "component": "Counter", "props": { "count": "number" } },
//!     { "tag": "x-card", "component": "Card", "props": ["title"] }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bridge::{register_with_namespace, PropertySchema};
use crate::component::ComponentFactory;
use crate::error::{BridgeError, Result};
use crate::namespace::{self, Object};

/// One tag registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEntry {
    pub tag: String,
    /// Name of the component in the library.
    pub component: String,
    #[serde(default)]
    pub props: PropertySchema,
}

/// A set of tag registrations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementManifest {
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
}

impl ElementManifest {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Component factories by name.
#[derive(Clone, Default)]
pub struct ComponentLibrary {
    factories: HashMap<String, ComponentFactory>,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, factory: ComponentFactory) -> Self {
        self.insert(name, factory);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, factory: ComponentFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn get(&self, name: &str) -> Option<ComponentFactory> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

/// Register every manifest entry against the global namespace.
pub fn register_manifest(manifest: &ElementManifest, library: &ComponentLibrary) -> Result<()> {
    register_manifest_with_namespace(manifest, library, namespace::global())
}

/// Register every manifest entry, resolving paths against `namespace`.
///
/// Component names are checked up front, so an `UnknownComponent` leaves
/// the registry untouched. Registration errors stop at the failing entry.
pub fn register_manifest_with_namespace(
    manifest: &ElementManifest,
    library: &ComponentLibrary,
    namespace: Object,
) -> Result<()> {
    let factories = manifest
        .elements
        .iter()
        .map(|entry| {
            library
                .get(&entry.component)
                .ok_or_else(|| BridgeError::UnknownComponent(entry.component.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    for (entry, factory) in manifest.elements.iter().zip(factories) {
        debug!(tag = %entry.tag, component = %entry.component, "manifest entry");
        register_with_namespace(&entry.tag, factory, entry.props.clone(), namespace.clone())?;
    }
    Ok(())
}
