//! Component templates - declared props and a render function.

use std::collections::HashMap;
use std::rc::Rc;

use crate::component::{Component, ComponentFactory, SlotMap, DEFAULT_SLOT};
use crate::dom::Node;
use crate::types::Value;

use super::ReactiveComponent;

/// Produces the target's children from the current context.
pub type RenderFn = Rc<dyn Fn(&RenderScope) -> Vec<Node>>;

/// Read access to a component's state during render.
pub struct RenderScope<'a> {
    pub(crate) ctx: &'a [Value],
    pub(crate) index: &'a HashMap<String, usize>,
    pub(crate) slots: &'a SlotMap,
}

impl RenderScope<'_> {
    /// Current value of a declared prop, `Undefined` if undeclared.
    pub fn prop(&self, name: &str) -> Value {
        self.index
            .get(name)
            .and_then(|&i| self.ctx.get(i))
            .cloned()
            .unwrap_or_default()
    }

    /// Projected nodes for a slot (empty when nothing was projected).
    pub fn slot(&self, name: &str) -> Vec<Node> {
        self.slots.get(name).cloned().unwrap_or_default()
    }

    pub fn default_slot(&self) -> Vec<Node> {
        self.slot(DEFAULT_SLOT)
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }
}

/// Component definition: ordered props with defaults plus a render function.
#[derive(Clone)]
pub struct Template {
    pub(crate) props: Vec<(String, Value)>,
    pub(crate) render: RenderFn,
}

impl Template {
    pub fn new(render: impl Fn(&RenderScope) -> Vec<Node> + 'static) -> Self {
        Self {
            props: Vec::new(),
            render: Rc::new(render),
        }
    }

    /// Declare a prop with its default value. Context indices follow
    /// declaration order.
    pub fn prop(mut self, name: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        match self.props.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = default,
            None => self.props.push((name.to_string(), default)),
        }
        self
    }

    pub fn prop_names(&self) -> Vec<String> {
        self.props.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Factory that mounts a [`ReactiveComponent`] per call.
    pub fn factory(&self) -> ComponentFactory {
        let template = self.clone();
        Rc::new(move |options| ReactiveComponent::mount(&template, options) as Rc<dyn Component>)
    }
}
