use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    notifying: bool,
    dropped: Vec<u64>,
}

/// Single-threaded change notification fan-out for editing surfaces.
///
/// Listeners are detached when their [`Subscription`] is dropped, including
/// from inside a notification.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Rc<RefCell<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, listener));
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Calls every listener once.
    pub fn notify(&self) {
        let mut listeners = {
            let mut registry = self.registry.borrow_mut();
            registry.notifying = true;
            std::mem::take(&mut registry.listeners)
        };

        for (_, listener) in listeners.iter_mut() {
            listener();
        }

        let mut registry = self.registry.borrow_mut();
        registry.notifying = false;
        let dropped = std::mem::take(&mut registry.dropped);
        listeners.retain(|(id, _)| !dropped.contains(id));
        // Keep anything subscribed while listeners were running.
        listeners.append(&mut registry.listeners);
        registry.listeners = listeners;
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Keeps a listener attached. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.borrow_mut();
        if registry.notifying {
            registry.dropped.push(self.id);
        }
        registry.listeners.retain(|(id, _)| *id != self.id);
    }
}
