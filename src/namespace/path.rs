//! Dotted path resolution.

use super::Object;
use crate::types::Value;

/// A live link to an external mutable location.
///
/// `container` is the object reached by walking every segment except the
/// last; `property` is the last segment.
#[derive(Debug, Clone)]
pub struct BindingTarget {
    pub path: Vec<String>,
    pub container: Object,
    pub property: String,
}

impl BindingTarget {
    /// The full dotted path, e.g. `app.state.count`.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// Current value at the bound location.
    pub fn read(&self) -> Value {
        self.container.get(&self.property)
    }

    /// Write through the bound location (setter included).
    pub fn write(&self, value: Value) {
        self.container.set(&self.property, value);
    }

    /// Whether two targets name the same location.
    pub fn same_location(&self, other: &BindingTarget) -> bool {
        self.container.ptr_eq(&other.container) && self.property == other.property
    }
}

/// Resolve `text` as a dotted path from `root`.
///
/// Returns `None` (the text is a literal) when the text contains an empty
/// segment or any intermediate segment is not an object. A single segment
/// only resolves when `root` already has that property; with two or more,
/// the final property does not have to exist yet.
pub fn resolve_path(root: &Object, text: &str) -> Option<BindingTarget> {
    let segments: Vec<&str> = text.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    if let [only] = segments.as_slice() {
        if !root.has(only) {
            return None;
        }
    }

    let (property, intermediate) = segments.split_last()?;
    let mut container = root.clone();
    for segment in intermediate {
        container = match container.get(segment) {
            Value::Object(next) => next,
            _ => return None,
        };
    }

    Some(BindingTarget {
        path: segments.iter().map(|s| s.to_string()).collect(),
        container,
        property: property.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_root() -> Object {
        let b = Object::with_entries([("c", 5)]);
        let a = Object::new();
        a.define_value("b", b);
        a.define_value("label", "not an object");
        let root = Object::new();
        root.define_value("a", a);
        root
    }

    #[test]
    fn test_resolves_nested_path() {
        let root = sample_root();
        let target = resolve_path(&root, "a.b.c").expect("path should resolve");

        assert_eq!(target.path, vec!["a", "b", "c"]);
        assert_eq!(target.property, "c");
        assert_eq!(target.dotted(), "a.b.c");
        assert_eq!(target.read(), Value::from(5));

        let b = root.get("a").as_object().unwrap().get("b");
        assert!(target.container.ptr_eq(b.as_object().unwrap()));
    }

    #[test]
    fn test_missing_intermediate_is_literal() {
        let root = sample_root();
        assert!(resolve_path(&root, "a.x.c").is_none());
        assert!(resolve_path(&root, "nope.c").is_none());
        assert!(resolve_path(&root, "a.label.length").is_none());
    }

    #[test]
    fn test_single_segment_binds_existing_root_property() {
        let root = sample_root();
        let target = resolve_path(&root, "a").expect("root property should resolve");
        assert!(target.container.ptr_eq(&root));
        assert_eq!(target.property, "a");
        assert_eq!(target.dotted(), "a");

        assert!(resolve_path(&root, "Hello").is_none());
        assert!(resolve_path(&root, "42").is_none());
    }

    #[test]
    fn test_unknown_single_segment_and_empty_segments_are_literal() {
        let root = sample_root();
        assert!(resolve_path(&root, "missing").is_none());
        assert!(resolve_path(&root, "").is_none());
        assert!(resolve_path(&root, "a.").is_none());
        assert!(resolve_path(&root, "a..c").is_none());
        assert!(resolve_path(&root, "3.14").is_none());
    }

    #[test]
    fn test_final_property_may_be_absent() {
        let root = sample_root();
        let target = resolve_path(&root, "a.b.missing").unwrap();
        assert_eq!(target.read(), Value::Undefined);
    }

    #[test]
    fn test_write_through() {
        let root = sample_root();
        let target = resolve_path(&root, "a.b.c").unwrap();
        target.write(Value::from(9));
        assert_eq!(resolve_path(&root, "a.b.c").unwrap().read(), Value::from(9));
    }
}
