//! Property schema - declared props and their coercion kinds.

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Kind;

/// Ordered property declarations shared by every instance of one element.
///
/// Built from a list of names (each defaults to [`Kind::String`]) or from
/// explicit `(name, kind)` pairs. In JSON: `["title", "count"]` or
/// `{"title": "string", "count": "number"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySchema {
    entries: Vec<(String, Kind)>,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every name with string coercion.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(|n| (n.into(), Kind::String)).collect()
    }

    /// Add or redeclare a property.
    pub fn with(mut self, name: impl Into<String>, kind: Kind) -> Self {
        self.insert(name.into(), kind);
        self
    }

    fn insert(&mut self, name: String, kind: Kind) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = kind,
            None => self.entries.push((name, kind)),
        }
    }

    pub fn entries(&self) -> &[(String, Kind)] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, k)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower-cased attribute names the host observes.
    pub fn observed_attributes(&self) -> Vec<String> {
        let mut attributes: Vec<String> = Vec::with_capacity(self.entries.len());
        for (name, _) in &self.entries {
            let attr = name.to_ascii_lowercase();
            if !attributes.contains(&attr) {
                attributes.push(attr);
            }
        }
        attributes
    }

    /// Declared property for a lower-cased attribute name.
    pub fn property_for_attribute(&self, attribute: &str) -> Option<(&str, Kind)> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(attribute))
            .map(|(n, k)| (n.as_str(), *k))
    }
}

impl FromIterator<(String, Kind)> for PropertySchema {
    fn from_iter<T: IntoIterator<Item = (String, Kind)>>(iter: T) -> Self {
        let mut schema = PropertySchema::new();
        for (name, kind) in iter {
            schema.insert(name, kind);
        }
        schema
    }
}

impl<const N: usize> From<[&str; N]> for PropertySchema {
    fn from(names: [&str; N]) -> Self {
        PropertySchema::from_names(names)
    }
}

impl From<Vec<&str>> for PropertySchema {
    fn from(names: Vec<&str>) -> Self {
        PropertySchema::from_names(names)
    }
}

impl From<Vec<String>> for PropertySchema {
    fn from(names: Vec<String>) -> Self {
        PropertySchema::from_names(names)
    }
}

impl<const N: usize> From<[(&str, Kind); N]> for PropertySchema {
    fn from(pairs: [(&str, Kind); N]) -> Self {
        pairs.into_iter().map(|(n, k)| (n.to_string(), k)).collect()
    }
}

impl From<Vec<(String, Kind)>> for PropertySchema {
    fn from(pairs: Vec<(String, Kind)>) -> Self {
        pairs.into_iter().collect()
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for PropertySchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, kind) in &self.entries {
            map.serialize_entry(name, kind)?;
        }
        map.end()
    }
}

struct SchemaVisitor;

impl<'de> Visitor<'de> for SchemaVisitor {
    type Value = PropertySchema;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of property names or a map of property name to kind")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut schema = PropertySchema::new();
        while let Some(name) = seq.next_element::<String>()? {
            schema.insert(name, Kind::String);
        }
        Ok(schema)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut schema = PropertySchema::new();
        while let Some((name, kind)) = map.next_entry::<String, Kind>()? {
            if schema.kind_of(&name).is_some() {
                return Err(de::Error::custom(format!("duplicate property '{name}'")));
            }
            schema.insert(name, kind);
        }
        Ok(schema)
    }
}

impl<'de> Deserialize<'de> for PropertySchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SchemaVisitor)
    }
}
