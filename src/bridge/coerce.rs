//! Attribute coercion - raw attribute text to typed property values.
//!
//! Every attribute value is first tried as a dotted path into the namespace.
//! A path that resolves yields a live binding and the current value at the
//! bound location, which must already have the declared kind. Anything else
//! is literal text, coerced by kind.

use crate::error::{BridgeError, Result};
use crate::namespace::{resolve_path, BindingTarget, Object};
use crate::types::{Kind, Value};

/// Outcome of coercing one attribute value.
#[derive(Debug, Clone)]
pub struct Coerced {
    pub value: Value,
    /// Present when the raw text resolved to a path.
    pub binding: Option<BindingTarget>,
}

impl Coerced {
    fn literal(value: Value) -> Self {
        Self {
            value,
            binding: None,
        }
    }
}

/// Coerce the raw attribute value of property `name`.
///
/// An absent attribute coerces to `Undefined`.
///
/// # Errors
///
/// - `TypeMismatch` when a path resolves but its current value is not `kind`.
/// - `LiteralNotCoercible` for literal text under a path-only kind
///   (`Function`, `Object`).
pub fn coerce_value(root: &Object, name: &str, kind: Kind, raw: Option<&str>) -> Result<Coerced> {
    let Some(raw) = raw else {
        return Ok(Coerced::literal(Value::Undefined));
    };

    if let Some(target) = resolve_path(root, raw) {
        let current = target.read();
        if !kind.accepts(&current) {
            return Err(BridgeError::TypeMismatch {
                expected: kind,
                actual: current.type_name(),
                path: target.dotted(),
            });
        }
        return Ok(Coerced {
            value: current,
            binding: Some(target),
        });
    }

    kind.coerce_literal(name, raw)
        .map(Coerced::literal)
        .ok_or_else(|| BridgeError::LiteralNotCoercible {
            property: name.to_string(),
            kind,
            raw: raw.to_string(),
        })
}
