//! ReactiveComponent - the runtime's component instance.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use spark_signals::{effect, effect_root, flush_sync, signal, Signal};
use tracing::{error, trace, warn};

use crate::component::{
    Component, ComponentOptions, Props, SlotMap, SubscriptionId, UpdateObserver,
};
use crate::dom::{Element, WeakElement};
use crate::types::Value;

use super::scheduler;
use super::template::{RenderFn, RenderScope, Template};

bitflags! {
    /// Lifecycle state of a component.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ComponentFlags: u8 {
        /// Has pending updates and sits in the scheduler queue.
        const DIRTY = 1 << 0;
        /// Destroyed; updates are ignored.
        const DESTROYED = 1 << 1;
    }
}

/// A mounted template.
///
/// The context holds one value per declared prop, in declaration order.
/// Updates land in `pending` and are applied by the scheduler's flush, which
/// bumps `generation` once so the render effect runs once per cycle.
pub struct ReactiveComponent {
    this: Weak<ReactiveComponent>,
    render_fn: RenderFn,
    index: HashMap<String, usize>,
    ctx: RefCell<Vec<Value>>,
    pending: RefCell<Vec<(usize, Value)>>,
    slots: SlotMap,
    /// Weak: the target owns this component through its element instance.
    target: RefCell<Option<WeakElement>>,
    generation: Signal<u64>,
    stop_render: RefCell<Option<Box<dyn FnOnce()>>>,
    observers: RefCell<Vec<(SubscriptionId, UpdateObserver)>>,
    next_subscription: Cell<u64>,
    flags: Cell<ComponentFlags>,
    renders: Cell<u64>,
}

impl ReactiveComponent {
    /// Create the component and render it into `options.target`.
    pub fn mount(template: &Template, options: ComponentOptions) -> Rc<Self> {
        let ComponentOptions { target, props, slots } = options;

        let index: HashMap<String, usize> = template
            .props
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        // Undefined initial values fall back to the declared default
        let mut ctx: Vec<Value> = template.props.iter().map(|(_, d)| d.clone()).collect();
        for (name, value) in props {
            match index.get(&name) {
                Some(&i) if !value.is_undefined() => ctx[i] = value,
                Some(_) => {}
                None => warn!(prop = %name, "component created with a prop it does not declare"),
            }
        }

        let component = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            render_fn: template.render.clone(),
            index,
            ctx: RefCell::new(ctx),
            pending: RefCell::new(Vec::new()),
            slots,
            target: RefCell::new(Some(target.downgrade())),
            generation: signal(0u64),
            stop_render: RefCell::new(None),
            observers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
            flags: Cell::new(ComponentFlags::empty()),
            renders: Cell::new(0),
        });

        // The ONE render effect: tracks generation only. Rooted so a parent
        // render effect re-running does not dispose it.
        let weak = Rc::downgrade(&component);
        let generation = component.generation.clone();
        let stop = effect_root(move || {
            let _render_effect = effect(move || {
                let _ = generation.get();
                if let Some(component) = weak.upgrade() {
                    component.render();
                }
            });
        });
        flush_sync();
        *component.stop_render.borrow_mut() = Some(Box::new(stop));

        component
    }

    pub fn flags(&self) -> ComponentFlags {
        self.flags.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags.get().contains(ComponentFlags::DESTROYED)
    }

    /// How many times the template has rendered.
    pub fn render_count(&self) -> u64 {
        self.renders.get()
    }

    fn set_flag(&self, flag: ComponentFlags, on: bool) {
        let mut flags = self.flags.get();
        flags.set(flag, on);
        self.flags.set(flags);
    }

    pub(crate) fn clear_dirty(&self) {
        self.set_flag(ComponentFlags::DIRTY, false);
    }

    fn render(&self) {
        if self.is_destroyed() {
            return;
        }
        let Some(target) = self.target.borrow().as_ref().and_then(WeakElement::upgrade) else {
            return;
        };

        let nodes = {
            let ctx = self.ctx.borrow();
            let scope = RenderScope {
                ctx: &ctx,
                index: &self.index,
                slots: &self.slots,
            };
            (self.render_fn)(&scope)
        };
        self.renders.set(self.renders.get() + 1);

        if let Err(err) = target.replace_children(nodes) {
            error!(%err, target = target.tag(), "component render failed");
        }
    }

    /// Apply pending updates, re-render once, then notify observers.
    pub(crate) fn flush_update(&self) {
        self.clear_dirty();
        if self.is_destroyed() {
            return;
        }

        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        if pending.is_empty() {
            return;
        }
        {
            let mut ctx = self.ctx.borrow_mut();
            for (i, value) in pending {
                ctx[i] = value;
            }
        }

        self.generation.set(self.generation.get() + 1);
        flush_sync();

        let observers: Vec<UpdateObserver> =
            self.observers.borrow().iter().map(|(_, o)| o.clone()).collect();
        for observer in observers {
            observer();
        }
    }
}

// NaN is equal to itself here so re-pushing a NaN does not loop
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a == b,
    }
}

impl Component for ReactiveComponent {
    fn update(&self, props: Props) {
        if self.is_destroyed() {
            trace!("update ignored on destroyed component");
            return;
        }

        let mut changed = false;
        {
            let ctx = self.ctx.borrow();
            let mut pending = self.pending.borrow_mut();
            for (name, value) in props {
                let Some(&i) = self.index.get(&name) else {
                    warn!(prop = %name, "update for a prop the component does not declare");
                    continue;
                };
                let queued = pending.iter().position(|(j, _)| *j == i);
                let effective = queued.map(|q| &pending[q].1).unwrap_or(&ctx[i]);
                if same_value(effective, &value) {
                    continue;
                }
                match queued {
                    // Back to the current value: nothing left to apply
                    Some(q) if same_value(&ctx[i], &value) => {
                        pending.remove(q);
                    }
                    Some(q) => pending[q].1 = value,
                    None => pending.push((i, value)),
                }
                changed = true;
            }
        }

        if changed && !self.flags.get().contains(ComponentFlags::DIRTY) {
            self.set_flag(ComponentFlags::DIRTY, true);
            scheduler::schedule(self.this.clone());
        }
    }

    fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.set_flag(ComponentFlags::DESTROYED, true);
        self.pending.borrow_mut().clear();
        self.observers.borrow_mut().clear();

        if let Some(stop) = self.stop_render.borrow_mut().take() {
            stop();
        }
        let target = self.target.borrow_mut().take().and_then(|t| t.upgrade());
        if let Some(target) = target {
            if let Err(err) = target.clear_children() {
                error!(%err, target = target.tag(), "detaching rendered nodes failed");
            }
        }
    }

    fn prop_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn context(&self, index: usize) -> Option<Value> {
        self.ctx.borrow().get(index).cloned()
    }

    fn subscribe(&self, observer: UpdateObserver) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.observers.borrow_mut().retain(|(i, _)| *i != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::DEFAULT_SLOT;
    use crate::dom::Node;
    use crate::runtime::{flush, has_pending, reset_scheduler};

    fn label_template() -> Template {
        Template::new(|scope| {
            let mut nodes = vec![Node::text(format!(
                "{}:{}",
                scope.prop("label"),
                scope.prop("count")
            ))];
            nodes.extend(scope.default_slot());
            nodes
        })
        .prop("label", "n")
        .prop("count", 0)
    }

    fn mount(props: Props) -> (Element, Rc<ReactiveComponent>) {
        let target = Element::new("div");
        let component = ReactiveComponent::mount(
            &label_template(),
            ComponentOptions {
                target: target.clone(),
                props,
                slots: SlotMap::new(),
            },
        );
        (target, component)
    }

    #[test]
    fn test_initial_render_uses_defaults_for_undefined() {
        reset_scheduler();
        let props = Props::from([
            ("label".to_string(), Value::Undefined),
            ("count".to_string(), Value::from(3)),
        ]);
        let (target, component) = mount(props);

        assert_eq!(target.text_content(), "n:3");
        assert_eq!(component.render_count(), 1);
        assert_eq!(component.value_of("label"), Value::from("n"));
    }

    #[test]
    fn test_updates_apply_on_flush() {
        reset_scheduler();
        let (target, component) = mount(Props::new());

        component.update(Props::from([("count".to_string(), Value::from(5))]));
        assert!(has_pending());
        assert_eq!(component.value_of("count"), Value::from(0), "not applied yet");
        assert!(component.flags().contains(ComponentFlags::DIRTY));

        flush();
        assert!(!has_pending());
        assert_eq!(component.value_of("count"), Value::from(5));
        assert_eq!(target.text_content(), "n:5");
        assert!(!component.flags().contains(ComponentFlags::DIRTY));
    }

    #[test]
    fn test_updates_coalesce_into_one_render() {
        reset_scheduler();
        let (target, component) = mount(Props::new());
        let before = component.render_count();

        component.update(Props::from([("count".to_string(), Value::from(1))]));
        component.update(Props::from([("label".to_string(), Value::from("total"))]));
        component.update(Props::from([("count".to_string(), Value::from(2))]));
        flush();

        assert_eq!(component.render_count(), before + 1);
        assert_eq!(target.text_content(), "total:2");
    }

    #[test]
    fn test_equal_update_is_noop() {
        reset_scheduler();
        let (_target, component) = mount(Props::new());

        component.update(Props::from([("count".to_string(), Value::from(0))]));
        assert!(!has_pending());

        // Set then revert within one cycle
        component.update(Props::from([("count".to_string(), Value::from(4))]));
        component.update(Props::from([("count".to_string(), Value::from(0))]));
        let before = component.render_count();
        flush();
        assert_eq!(component.render_count(), before, "nothing left to apply");
    }

    #[test]
    fn test_observers_run_after_update() {
        reset_scheduler();
        let (_target, component) = mount(Props::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let weak = Rc::downgrade(&component);
        let id = component.subscribe(Rc::new(move || {
            if let Some(c) = weak.upgrade() {
                seen_clone.borrow_mut().push(c.value_of("count"));
            }
        }));

        component.update(Props::from([("count".to_string(), Value::from(7))]));
        flush();
        assert_eq!(*seen.borrow(), vec![Value::from(7)]);

        component.unsubscribe(id);
        component.update(Props::from([("count".to_string(), Value::from(8))]));
        flush();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_destroy_detaches_and_ignores_updates() {
        reset_scheduler();
        let (target, component) = mount(Props::new());
        assert!(target.child_count() > 0);

        component.destroy();
        assert!(component.is_destroyed());
        assert_eq!(target.child_count(), 0);

        component.update(Props::from([("count".to_string(), Value::from(1))]));
        flush();
        assert_eq!(target.child_count(), 0);
        assert_eq!(component.value_of("count"), Value::from(0));
    }

    #[test]
    fn test_slots_render_into_target() {
        reset_scheduler();
        let target = Element::new("div");
        let slots = SlotMap::from([(DEFAULT_SLOT.to_string(), vec![Node::text("!")])]);
        ReactiveComponent::mount(
            &label_template(),
            ComponentOptions {
                target: target.clone(),
                props: Props::new(),
                slots,
            },
        );
        assert_eq!(target.text_content(), "n:0!");
    }
}
