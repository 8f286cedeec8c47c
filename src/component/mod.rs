//! Embedded component contract.
//!
//! The bridge does not render anything itself. It drives a component that
//! exposes this surface: construction against a target element with an
//! initial property bag, partial updates, destruction, an indexable context
//! of current property values, and an update notification.
//!
//! [`crate::runtime`] provides a reactive implementation; any other runtime
//! can be plugged in through [`ComponentFactory`].

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::dom::{Element, Node};
use crate::types::Value;

/// Property name to value.
pub type Props = HashMap<String, Value>;

/// Slot name to projected nodes. The unnamed slot is [`DEFAULT_SLOT`].
pub type SlotMap = BTreeMap<String, Vec<Node>>;

/// Name of the unnamed slot.
pub const DEFAULT_SLOT: &str = "default";

/// Runs after every settled update cycle of a component.
pub type UpdateObserver = Rc<dyn Fn()>;

/// Handle for [`Component::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Everything a component is constructed with.
pub struct ComponentOptions {
    /// Element the component renders into.
    pub target: Element,
    /// Initial property values. `Undefined` means "not set".
    pub props: Props,
    pub slots: SlotMap,
}

/// Constructs a component.
pub type ComponentFactory = Rc<dyn Fn(ComponentOptions) -> Rc<dyn Component>>;

/// A mounted component instance.
pub trait Component {
    /// Queue a partial property update. Applied on the next update cycle.
    fn update(&self, props: Props);

    /// Tear down. Further updates are ignored.
    fn destroy(&self);

    /// Context index of a declared property.
    fn prop_index(&self, name: &str) -> Option<usize>;

    /// Current context value at `index`.
    fn context(&self, index: usize) -> Option<Value>;

    /// Register an observer run after each update cycle settles.
    fn subscribe(&self, observer: UpdateObserver) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);

    /// Current value of a property by name.
    fn value_of(&self, name: &str) -> Value {
        self.prop_index(name)
            .and_then(|index| self.context(index))
            .unwrap_or_default()
    }
}
