//! Bridge errors.
//!
//! Every failure surfaces synchronously to the host callback that triggered
//! it (construction, attribute change, connection). Nothing is caught or
//! retried inside the bridge.

use thiserror::Error;

use crate::types::Kind;

/// Errors raised by registration, coercion and the host lifecycle.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The tag name is already defined in the custom element registry.
    #[error("custom element '{0}' is already defined")]
    DuplicateRegistration(String),

    /// The tag name is not a valid custom element name.
    ///
    /// Valid names are lowercase ASCII, start with a letter and contain a hyphen.
    #[error("'{0}' is not a valid custom element name")]
    InvalidTagName(String),

    /// A path-bound value has the wrong runtime type for its declared kind.
    #[error("type mismatch for '{path}': expected {expected}, found {actual}")]
    TypeMismatch {
        expected: Kind,
        actual: &'static str,
        path: String,
    },

    /// Literal attribute text was given for a kind that only binds by path.
    #[error("property '{property}' has kind {kind} and must be bound to a path, got literal '{raw}'")]
    LiteralNotCoercible {
        property: String,
        kind: Kind,
        raw: String,
    },

    /// A manifest names a component the library does not provide.
    #[error("no component named '{0}' in the library")]
    UnknownComponent(String),

    /// A manifest could not be parsed.
    #[error("invalid element manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
