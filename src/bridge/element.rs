//! ElementInstance - per-node state machine of a registered element.
//!
//! ```text
//! Unattached ──connected──▶ Connected ──disconnected──▶ Disconnected
//!                               ▲                            │
//!                               └─────────connected──────────┘
//! ```
//!
//! Connection coerces every declared attribute, captures slots, clears the
//! host, mounts the component, builds the accessor table, links every path
//! binding both ways and subscribes to the component's update cycle.
//! Disconnection undoes all of it; a reconnect starts from scratch.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::accessors::{AccessorMethod, AccessorTable};
use super::coerce::coerce_value;
use super::slots::capture_slots;
use super::BridgeDefinition;
use crate::component::{Component, ComponentOptions, Props, SubscriptionId};
use crate::dom::{CustomElement, Element, WeakElement};
use crate::error::Result;
use crate::namespace::{BindingTarget, Property};
use crate::types::{Kind, Value};

/// Lifecycle state of an [`ElementInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, never connected.
    Unattached,
    Connected,
    Disconnected,
}

/// Bridge state attached to one custom element node.
pub struct ElementInstance {
    this: Weak<ElementInstance>,
    host: WeakElement,
    definition: Rc<BridgeDefinition>,
    /// Instance copy of the schema.
    props: Vec<(String, Kind)>,
    bindings: RefCell<BTreeMap<String, BindingTarget>>,
    component: RefCell<Option<Rc<dyn Component>>>,
    accessors: RefCell<AccessorTable>,
    subscription: Cell<Option<SubscriptionId>>,
    state: Cell<LifecycleState>,
}

impl ElementInstance {
    pub(crate) fn construct(host: WeakElement, definition: Rc<BridgeDefinition>) -> Rc<Self> {
        let props = definition.schema.entries().to_vec();
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            host,
            definition,
            props,
            bindings: RefCell::new(BTreeMap::new()),
            component: RefCell::new(None),
            accessors: RefCell::new(AccessorTable::default()),
            subscription: Cell::new(None),
            state: Cell::new(LifecycleState::Unattached),
        })
    }

    /// Registered tag name.
    pub fn tag(&self) -> &str {
        &self.definition.name
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn props(&self) -> &[(String, Kind)] {
        &self.props
    }

    /// The mounted component, while connected.
    pub fn component(&self) -> Option<Rc<dyn Component>> {
        self.component.borrow().clone()
    }

    /// Active path bindings, by property name.
    pub fn bindings(&self) -> Vec<(String, BindingTarget)> {
        self.bindings
            .borrow()
            .iter()
            .map(|(n, b)| (n.clone(), b.clone()))
            .collect()
    }

    pub fn binding(&self, property: &str) -> Option<BindingTarget> {
        self.bindings.borrow().get(property).cloned()
    }

    // =========================================================================
    // Generated Accessors
    // =========================================================================

    /// Generated method names (`getCount`, `setCount`, ...). Empty until connected.
    pub fn accessor_names(&self) -> Vec<String> {
        self.accessors.borrow().method_names()
    }

    /// Read a property through its generated getter.
    pub fn get(&self, property: &str) -> Option<Value> {
        let get = self.accessors.borrow().get(property).map(|a| a.get.clone())?;
        Some(get())
    }

    /// Write a property through its generated setter. Applied on the next
    /// update cycle. Returns false when there is no such accessor.
    pub fn set(&self, property: &str, value: impl Into<Value>) -> bool {
        let set = self.accessors.borrow().get(property).map(|a| a.set.clone());
        match set {
            Some(set) => {
                set(value.into());
                true
            }
            None => false,
        }
    }

    /// Invoke a generated method by name: `getX()` returns the value,
    /// `setX(value)` returns `Undefined`.
    pub fn call(&self, method: &str, args: &[Value]) -> Option<Value> {
        let (kind, get, set) = {
            let accessors = self.accessors.borrow();
            let (accessor, kind) = accessors.by_method(method)?;
            (kind, accessor.get.clone(), accessor.set.clone())
        };
        match kind {
            AccessorMethod::Get => Some(get()),
            AccessorMethod::Set => {
                set(args.first().cloned().unwrap_or_default());
                Some(Value::Undefined)
            }
        }
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn is_linked(&self) -> bool {
        self.state.get() == LifecycleState::Connected && self.component.borrow().is_some()
    }

    /// Redefine the external location as this element's accessor pair.
    fn link(&self, property: &str, binding: &BindingTarget) {
        let accessor = self.accessors.borrow().get(property).cloned();
        if let Some(accessor) = accessor {
            trace!(tag = self.tag(), property, path = %binding.dotted(), "linking binding");
            binding
                .container
                .define_accessor(binding.property.clone(), accessor.get, accessor.set);
        }
    }

    /// Turn the external location back into a plain value, unless someone
    /// else has redefined it since.
    fn unlink(&self, property: &str, binding: &BindingTarget, last: Value) {
        let ours = self.accessors.borrow().get(property).map(|a| a.get.clone());
        let still_ours = match (binding.container.property(&binding.property), ours) {
            (Some(Property::Accessor { get, .. }), Some(ours)) => Rc::ptr_eq(&get, &ours),
            _ => false,
        };
        if still_ours {
            trace!(tag = self.tag(), property, path = %binding.dotted(), "unlinking binding");
            binding.container.define_value(binding.property.clone(), last);
        }
    }

    /// Replace the binding of `property` (or drop it when `next` is None),
    /// keeping the live links in step while connected.
    fn rebind(&self, property: &str, next: Option<BindingTarget>) {
        let previous = match &next {
            Some(binding) => self
                .bindings
                .borrow_mut()
                .insert(property.to_string(), binding.clone()),
            None => self.bindings.borrow_mut().remove(property),
        };
        if !self.is_linked() {
            return;
        }

        let unchanged = matches!((&previous, &next), (Some(p), Some(n)) if p.same_location(n));
        if unchanged {
            return;
        }
        if let Some(previous) = &previous {
            let last = self.component().map(|c| c.value_of(property)).unwrap_or_default();
            self.unlink(property, previous, last);
        }
        if let Some(next) = &next {
            self.link(property, next);
        }
    }

    /// Mirror the component's bound values out to their external locations.
    fn push_bindings(&self) {
        let Some(component) = self.component() else {
            return;
        };
        for (property, binding) in self.bindings() {
            let value = component.value_of(&property);
            trace!(tag = self.tag(), %property, path = %binding.dotted(), "pushing bound value");
            binding.write(value);
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    fn teardown(&self) {
        let Some(component) = self.component.borrow_mut().take() else {
            return;
        };
        if let Some(id) = self.subscription.take() {
            component.unsubscribe(id);
        }

        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        for (property, binding) in &bindings {
            self.unlink(property, binding, component.value_of(property));
        }

        *self.accessors.borrow_mut() = AccessorTable::default();
        component.destroy();
    }
}

impl CustomElement for ElementInstance {
    fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>) -> Result<()> {
        let Some((property, kind)) = self.definition.schema.property_for_attribute(name) else {
            return Ok(());
        };
        let root = &self.definition.namespace;

        let old = coerce_value(root, property, kind, old)?;
        let new = coerce_value(root, property, kind, new)?;
        trace!(
            tag = self.tag(),
            property,
            old = ?old.value,
            new = ?new.value,
            bound = new.binding.is_some(),
            "attribute changed"
        );

        self.rebind(property, new.binding);

        if let Some(component) = self.component() {
            if old.value != new.value {
                component.update(Props::from([(property.to_string(), new.value)]));
            }
        }
        Ok(())
    }

    fn connected(&self) -> Result<()> {
        let Some(host) = self.host.upgrade() else {
            return Ok(());
        };
        // Re-entry without a disconnect starts over as well
        self.teardown();
        debug!(tag = self.tag(), "connecting");

        // 1. Initial props from current attributes
        let root = &self.definition.namespace;
        let mut props = Props::new();
        for (name, kind) in &self.props {
            let coerced = coerce_value(root, name, *kind, host.get_attribute(name).as_deref())?;
            match coerced.binding {
                Some(binding) => self.bindings.borrow_mut().insert(name.clone(), binding),
                None => self.bindings.borrow_mut().remove(name),
            };
            props.insert(name.clone(), coerced.value);
        }

        // 2. Light DOM → slots, 3. host handed over to the component
        let slots = capture_slots(&host)?;
        host.clear_children()?;

        // 4. Mount
        let component = (self.definition.factory)(ComponentOptions {
            target: host.clone(),
            props,
            slots,
        });
        *self.component.borrow_mut() = Some(component.clone());

        // 5. getX / setX
        *self.accessors.borrow_mut() = AccessorTable::build(&self.props, &component);
        self.state.set(LifecycleState::Connected);

        // 6. Inbound: external location proxies to the component
        for (property, binding) in self.bindings() {
            self.link(&property, &binding);
        }

        // 7. Outbound: after each update cycle, mirror bound values out
        let weak = self.this.clone();
        let id = component.subscribe(Rc::new(move || {
            if let Some(instance) = weak.upgrade() {
                instance.push_bindings();
            }
        }));
        self.subscription.set(Some(id));

        debug!(
            tag = self.tag(),
            bindings = self.bindings.borrow().len(),
            "connected"
        );
        Ok(())
    }

    fn disconnected(&self) -> Result<()> {
        debug!(tag = self.tag(), "disconnecting");
        self.teardown();
        self.state.set(LifecycleState::Disconnected);
        Ok(())
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// The bridge instance behind an element, if it is a registered element.
pub fn instance_of(element: &Element) -> Option<Rc<ElementInstance>> {
    element.custom_element::<ElementInstance>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::register_with_namespace;
    use crate::dom::{reset_registry, Document, Node};
    use crate::namespace::Object;
    use crate::runtime::{flush, reset_scheduler, Template};

    fn connected_counter(tag: &str) -> (Element, Rc<ElementInstance>) {
        reset_registry();
        reset_scheduler();
        let template = Template::new(|scope| vec![Node::text(scope.prop("count").to_string())])
            .prop("count", 0);
        register_with_namespace(tag, template.factory(), [("count", Kind::Number)], Object::new())
            .unwrap();

        let document = Document::new();
        let el = document.create_element(tag).unwrap();
        let instance = instance_of(&el).unwrap();
        assert_eq!(instance.state(), LifecycleState::Unattached);

        document.body().append_child(el.clone()).unwrap();
        (el, instance)
    }

    #[test]
    fn test_accessors_need_a_connection() {
        reset_registry();
        let template = Template::new(|_| Vec::new()).prop("count", 0);
        register_with_namespace("x-idle", template.factory(), ["count"], Object::new()).unwrap();

        let el = Document::new().create_element("x-idle").unwrap();
        let instance = instance_of(&el).unwrap();
        assert_eq!(instance.get("count"), None);
        assert!(!instance.set("count", 1));
        assert_eq!(instance.call("getCount", &[]), None);
    }

    #[test]
    fn test_set_and_call() {
        let (el, instance) = connected_counter("x-count");
        assert_eq!(instance.state(), LifecycleState::Connected);
        assert_eq!(instance.tag(), "x-count");

        assert!(instance.set("count", 3));
        flush();
        assert_eq!(instance.get("count"), Some(Value::from(3)));
        assert_eq!(el.text_content(), "3");

        instance.call("setCount", &[Value::from(4)]);
        flush();
        assert_eq!(instance.call("getCount", &[]), Some(Value::from(4)));

        // Missing argument sets undefined
        instance.call("setCount", &[]);
        flush();
        assert_eq!(el.text_content(), "undefined");
    }

    #[test]
    fn test_unobserved_attribute_is_ignored() {
        let (el, instance) = connected_counter("x-quiet");
        el.set_attribute("title", "a.b").unwrap();
        flush();
        assert!(instance.bindings().is_empty());
        assert_eq!(el.text_content(), "0");
    }
}
