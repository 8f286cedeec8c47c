//! # spark-elements
//!
//! Custom element bridge for reactive components.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! reference component runtime.
//!
//! ## Architecture
//!
//! A registered tag wraps one component instance per element node. The
//! bridge sits between the host document and the component:
//!
//! ```text
//! attributes ──coerce──▶ props ──update──▶ Component ──render──▶ host children
//!     │                                        │
//!     └── dotted path ──▶ namespace location ◀─┘  (two-way, accessor pair)
//! light DOM ──capture──▶ slots ────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Property values and coercion kinds
//! - [`namespace`] - Shared objects and dotted path resolution
//! - [`dom`] - Host document model and custom element registry
//! - [`component`] - The contract an embedded component fulfills
//! - [`runtime`] - Reactive reference runtime (spark-signals)
//! - [`bridge`] - Registration and per-element lifecycle
//! - [`manifest`] - Declarative registration from JSON

pub mod bridge;
pub mod component;
pub mod dom;
pub mod error;
pub mod manifest;
pub mod namespace;
pub mod runtime;
pub mod types;

// Re-export commonly used items
pub use types::{parse_number, Callback, Kind, Value};

pub use error::{BridgeError, Result};

pub use namespace::{global, reset_global, resolve_path, BindingTarget, Object, Property};

pub use dom::{create_element, reset_registry, Document, Element, Node};

pub use component::{
    Component, ComponentFactory, ComponentOptions, Props, SlotMap, SubscriptionId, DEFAULT_SLOT,
};

pub use runtime::{flush, reset_scheduler, ReactiveComponent, Template};

pub use bridge::{
    instance_of, register, register_with_namespace, ElementInstance, LifecycleState,
    PropertySchema,
};

pub use manifest::{
    register_manifest, register_manifest_with_namespace, ComponentLibrary, ElementEntry,
    ElementManifest,
};
