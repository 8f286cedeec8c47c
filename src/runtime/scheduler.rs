//! Update scheduler - coalesces component updates into flush cycles.

use std::cell::{Cell, RefCell};
use std::rc::Weak;

use tracing::error;

use super::ReactiveComponent;

// Observers may dirty other components; bound the follow-up passes.
const MAX_FLUSH_PASSES: usize = 100;

thread_local! {
    /// Components with pending updates, in scheduling order.
    static DIRTY: RefCell<Vec<Weak<ReactiveComponent>>> = RefCell::new(Vec::new());

    static FLUSHING: Cell<bool> = const { Cell::new(false) };
}

pub(crate) fn schedule(component: Weak<ReactiveComponent>) {
    DIRTY.with(|dirty| dirty.borrow_mut().push(component));
}

/// Whether any component is waiting for a flush.
pub fn has_pending() -> bool {
    DIRTY.with(|dirty| !dirty.borrow().is_empty())
}

/// Run update cycles until no component is dirty.
///
/// Re-entrant calls (from a render or an observer) return immediately; the
/// outer flush picks up anything they scheduled.
pub fn flush() {
    if FLUSHING.with(|f| f.replace(true)) {
        return;
    }

    let mut passes = 0;
    loop {
        let batch = DIRTY.with(|dirty| std::mem::take(&mut *dirty.borrow_mut()));
        if batch.is_empty() {
            break;
        }

        passes += 1;
        if passes > MAX_FLUSH_PASSES {
            error!(
                passes = MAX_FLUSH_PASSES,
                "update cycle did not settle; dropping remaining updates"
            );
            for component in batch.iter().filter_map(Weak::upgrade) {
                component.clear_dirty();
            }
            break;
        }

        for component in batch.iter().filter_map(Weak::upgrade) {
            component.flush_update();
        }
    }

    FLUSHING.with(|f| f.set(false));
}

/// Drop every queued update (for testing).
pub fn reset_scheduler() {
    let queued = DIRTY.with(|dirty| std::mem::take(&mut *dirty.borrow_mut()));
    for component in queued.iter().filter_map(Weak::upgrade) {
        component.clear_dirty();
    }
    FLUSHING.with(|f| f.set(false));
}
