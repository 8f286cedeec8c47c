//! Ambient namespace - shared mutable objects reachable by dotted paths.
//!
//! An attribute value such as `app.state.count` is resolved against a
//! namespace root. Each [`Object`] property is either a plain data value or
//! an accessor pair; the bridge swaps a bound data property for an accessor
//! so the external location reads and writes the embedded component.
//!
//! The root is injected: [`global()`] is only the thread-local default.

mod object;
mod path;

pub use object::{Getter, Object, Property, Setter};
pub use path::{resolve_path, BindingTarget};

thread_local! {
    /// Default namespace root, one per thread like a window object.
    static GLOBAL: Object = Object::new();
}

/// The thread-local default namespace root.
pub fn global() -> Object {
    GLOBAL.with(|root| root.clone())
}

/// Remove every property from the default root (for testing).
pub fn reset_global() {
    GLOBAL.with(|root| root.clear());
}
