//! Single-threaded publish/subscribe with disposable subscriptions.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Registry<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

/// Fan-out of events to registered handlers.
///
/// Each [`subscribe`](EventHub::subscribe) returns a [`Subscription`]; dropping
/// it unregisters the handler. Handlers may subscribe or drop subscriptions
/// while an event is being delivered; such changes take effect from the next
/// [`emit`](EventHub::emit).
pub struct EventHub<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> EventHub<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, handler: impl FnMut(&E) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .handlers
            .push((id, Rc::new(RefCell::new(handler)) as Handler<E>));

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry
                        .borrow_mut()
                        .handlers
                        .retain(|(handler_id, _)| *handler_id != id);
                }
            })),
        }
    }

    pub fn emit(&self, event: &E) {
        let handlers: Vec<Handler<E>> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            // A handler that re-enters emit() for itself is skipped rather than
            // aliased.
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (*handler)(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

impl<E: 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered handler. Unregisters on drop.
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keeps the handler registered for the lifetime of the hub.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
