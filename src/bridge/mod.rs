//! Bridge - exposes a component as a custom element.
//!
//! [`register`] defines a tag whose instances:
//! - coerce observed attributes to typed properties,
//! - resolve dotted attribute values (`app.state.count`) against the ambient
//!   namespace and keep those locations two-way bound,
//! - project light DOM children into named slots,
//! - expose `getX` / `setX` per declared property once connected.
//!
//! # Example
//!
//! ```ignore
//! use spark_elements::{register, runtime::Template, types::Kind, PropertySchema};
//!
//! let counter = Template::new(|scope| vec![Node::text(scope.prop("count").to_string())])
//!     .prop("count", 0);
//!
//! register("x-counter", counter.factory(), PropertySchema::new().with("count", Kind::Number))?;
//! ```

mod accessors;
mod coerce;
mod element;
mod schema;
mod slots;

use std::rc::Rc;

use tracing::debug;

pub use accessors::{getter_name, setter_name, Accessor, AccessorMethod, AccessorTable};
pub use coerce::{coerce_value, Coerced};
pub use element::{instance_of, ElementInstance, LifecycleState};
pub use schema::PropertySchema;
pub use slots::capture_slots;

use crate::component::ComponentFactory;
use crate::dom::{self, CustomElement, ElementDefinition};
use crate::error::Result;
use crate::namespace::{self, Object};

/// Shared by every instance of one registered tag.
pub(crate) struct BridgeDefinition {
    pub(crate) name: String,
    pub(crate) factory: ComponentFactory,
    pub(crate) schema: PropertySchema,
    /// Root for path resolution.
    pub(crate) namespace: Object,
}

/// Register `factory` as the custom element `name`, resolving paths against
/// the thread's global namespace.
pub fn register(
    name: &str,
    factory: ComponentFactory,
    schema: impl Into<PropertySchema>,
) -> Result<()> {
    register_with_namespace(name, factory, schema, namespace::global())
}

/// Register `factory` as the custom element `name`, resolving paths against
/// `namespace`.
///
/// Fails with `InvalidTagName` or `DuplicateRegistration`; nothing is
/// registered in that case.
pub fn register_with_namespace(
    name: &str,
    factory: ComponentFactory,
    schema: impl Into<PropertySchema>,
    namespace: Object,
) -> Result<()> {
    let schema = schema.into();
    let observed_attributes = schema.observed_attributes();
    debug!(name, props = schema.len(), "registering element");

    let definition = Rc::new(BridgeDefinition {
        name: name.to_string(),
        factory,
        schema,
        namespace,
    });

    dom::define(ElementDefinition {
        name: name.to_string(),
        observed_attributes,
        constructor: Rc::new(move |host| {
            Ok(ElementInstance::construct(host, definition.clone()) as Rc<dyn CustomElement>)
        }),
    })
}
