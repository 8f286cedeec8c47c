//! Core types - property values and coercion kinds.
//!
//! [`Value`] is what flows between attributes, the ambient namespace and the
//! embedded component. [`Kind`] is the declared target type of a property.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::namespace::Object;

// =============================================================================
// Callback
// =============================================================================

/// A function value. Compared by identity, like any host function.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&[Value]) -> Value>);

impl Callback {
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Callback(Rc::new(f))
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// Value
// =============================================================================

/// A dynamically typed property value.
///
/// Equality is strict equality: numbers by IEEE value (`NaN != NaN`),
/// functions and objects by identity.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Function(Callback),
    Object(Object),
}

impl Value {
    /// Runtime type name, as reported in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Callback> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Text form used when a value is rendered into a text node.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) if n.is_nan() => f.write_str("NaN"),
            Value::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) if *n == 0.0 => f.write_str("0"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Function(_) => f.write_str("function"),
            Value::Object(_) => f.write_str("[object Object]"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Callback> for Value {
    fn from(value: Callback) -> Self {
        Value::Function(value)
    }
}

// =============================================================================
// Kind
// =============================================================================

/// Declared coercion kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    String,
    Number,
    Boolean,
    Function,
    Object,
}

/// Coercion function and type check for one kind.
struct KindOps {
    name: &'static str,
    /// Coerce literal attribute text. `None` means the kind has no literal form.
    coerce: fn(property: &str, raw: &str) -> Option<Value>,
    /// Whether a runtime value already has this kind.
    accepts: fn(&Value) -> bool,
}

// Indexed by `Kind as usize`.
static KIND_TABLE: [KindOps; 5] = [
    KindOps {
        name: "string",
        coerce: |_, raw| Some(Value::String(raw.to_string())),
        accepts: |v| matches!(v, Value::String(_)),
    },
    KindOps {
        name: "number",
        coerce: |_, raw| Some(Value::Number(parse_number(raw))),
        accepts: |v| matches!(v, Value::Number(_)),
    },
    KindOps {
        name: "boolean",
        coerce: |property, raw| Some(Value::Boolean(raw.is_empty() || raw == property)),
        accepts: |v| matches!(v, Value::Boolean(_)),
    },
    KindOps {
        name: "function",
        coerce: |_, _| None,
        accepts: |v| matches!(v, Value::Function(_)),
    },
    KindOps {
        name: "object",
        coerce: |_, _| None,
        accepts: |v| matches!(v, Value::Object(_)),
    },
];

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::String,
        Kind::Number,
        Kind::Boolean,
        Kind::Function,
        Kind::Object,
    ];

    fn ops(self) -> &'static KindOps {
        &KIND_TABLE[self as usize]
    }

    /// Lower-case kind name.
    pub fn name(self) -> &'static str {
        self.ops().name
    }

    /// Coerce literal attribute text for `property`.
    ///
    /// Returns `None` for kinds that can only be bound by path.
    pub fn coerce_literal(self, property: &str, raw: &str) -> Option<Value> {
        (self.ops().coerce)(property, raw)
    }

    /// Check that a runtime value matches this kind.
    pub fn accepts(self, value: &Value) -> bool {
        (self.ops().accepts)(value)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Numeric parse
// =============================================================================

/// Parse attribute text as a number.
///
/// Surrounding whitespace is ignored, empty text is `0`, `0x`/`0o`/`0b`
/// prefixes and `Infinity` are understood. Anything else that does not parse
/// is `NaN`; it is never rejected.
pub fn parse_number(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        // Digits only: no sign after the prefix, no width limit
        let digits = &text[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN);
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust also accepts "inf" and "nan"; the host does not.
    if text
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E'))
    {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("  -3.5 "), -3.5);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0x1f"), 31.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("12px").is_nan());
        assert!(parse_number("0x").is_nan());
    }

    #[test]
    fn test_parse_prefixed_digits_only() {
        assert!(parse_number("0x+1").is_nan());
        assert!(parse_number("0b-1").is_nan());
        assert_eq!(parse_number("0o17"), 15.0);
        assert_eq!(parse_number("0B101"), 5.0);

        // Wider than any integer type still parses
        let wide = parse_number(&format!("0x{}", "f".repeat(40)));
        assert!(wide.is_finite());
        assert!(wide > 1e47);
    }

    #[test]
    fn test_boolean_literal() {
        assert_eq!(Kind::Boolean.coerce_literal("open", ""), Some(Value::Boolean(true)));
        assert_eq!(Kind::Boolean.coerce_literal("open", "open"), Some(Value::Boolean(true)));
        assert_eq!(Kind::Boolean.coerce_literal("open", "true"), Some(Value::Boolean(false)));
        assert_eq!(Kind::Boolean.coerce_literal("open", "false"), Some(Value::Boolean(false)));
    }

    #[test]
    fn test_function_and_object_have_no_literal_form() {
        assert_eq!(Kind::Function.coerce_literal("onEvent", "alert"), None);
        assert_eq!(Kind::Object.coerce_literal("state", "{}"), None);
    }

    #[test]
    fn test_kind_table_matches_names() {
        for kind in Kind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn test_accepts() {
        assert!(Kind::Number.accepts(&Value::Number(f64::NAN)));
        assert!(!Kind::Number.accepts(&Value::from("5")));
        assert!(Kind::Function.accepts(&Value::from(Callback::new(|_| Value::Undefined))));
        assert!(!Kind::String.accepts(&Value::Undefined));
    }

    #[test]
    fn test_strict_equality() {
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(Value::from(1), Value::Number(1.0));
        assert_ne!(Value::from("1"), Value::Number(1.0));

        let f = Callback::new(|_| Value::Null);
        assert_eq!(Value::from(f.clone()), Value::from(f));
        let g = Callback::new(|_| Value::Null);
        let h = Callback::new(|_| Value::Null);
        assert_ne!(Value::from(g), Value::from(h));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }
}
