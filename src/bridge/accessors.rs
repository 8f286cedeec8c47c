//! Generated accessors - `getX` / `setX` per declared property.
//!
//! Built once per connection. The getter reads the component's context by
//! property index; the setter pushes a single-property update.

use std::rc::{Rc, Weak};

use crate::component::{Component, Props};
use crate::namespace::{Getter, Setter};
use crate::types::{Kind, Value};

/// Which half of an accessor pair a method name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorMethod {
    Get,
    Set,
}

/// Accessor pair for one property.
#[derive(Clone)]
pub struct Accessor {
    pub property: String,
    pub getter_name: String,
    pub setter_name: String,
    pub get: Getter,
    pub set: Setter,
}

/// `count` → `getCount`.
pub fn getter_name(property: &str) -> String {
    format!("get{}", capitalize(property))
}

/// `count` → `setCount`.
pub fn setter_name(property: &str) -> String {
    format!("set{}", capitalize(property))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Closed set of accessors of one connected element.
#[derive(Clone, Default)]
pub struct AccessorTable {
    entries: Vec<Accessor>,
}

impl AccessorTable {
    /// One pair per declared property, bound to `component`.
    ///
    /// Accessors hold the component weakly; once it is gone they read
    /// `Undefined` and ignore writes.
    pub fn build(properties: &[(String, Kind)], component: &Rc<dyn Component>) -> Self {
        let entries = properties
            .iter()
            .map(|(name, _)| {
                let weak: Weak<dyn Component> = Rc::downgrade(component);
                let weak_set = weak.clone();
                let get_name = name.clone();
                let set_name = name.clone();

                Accessor {
                    property: name.clone(),
                    getter_name: getter_name(name),
                    setter_name: setter_name(name),
                    get: Rc::new(move || {
                        weak.upgrade()
                            .map(|c| c.value_of(&get_name))
                            .unwrap_or_default()
                    }),
                    set: Rc::new(move |value: Value| {
                        if let Some(c) = weak_set.upgrade() {
                            c.update(Props::from([(set_name.clone(), value)]));
                        }
                    }),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, property: &str) -> Option<&Accessor> {
        self.entries.iter().find(|a| a.property == property)
    }

    /// Look up by generated method name (`getCount`, `setCount`).
    pub fn by_method(&self, method: &str) -> Option<(&Accessor, AccessorMethod)> {
        self.entries.iter().find_map(|a| {
            if a.getter_name == method {
                Some((a, AccessorMethod::Get))
            } else if a.setter_name == method {
                Some((a, AccessorMethod::Set))
            } else {
                None
            }
        })
    }

    /// Every generated method name, getter first per property.
    pub fn method_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|a| [a.getter_name.clone(), a.setter_name.clone()])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(getter_name("count"), "getCount");
        assert_eq!(setter_name("onEvent"), "setOnEvent");
        assert_eq!(getter_name("x"), "getX");
        assert_eq!(getter_name(""), "get");
    }
}
