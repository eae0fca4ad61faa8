//! Change listener registry.
//!
//! The hub stores listeners by event name and dispatches each published
//! event to the listeners registered for its kind, in registration order.
//! Cloning a hub yields another handle to the same registry.
//!
//! Listeners may register or unregister listeners while an event is being
//! dispatched; such changes take effect from the next `emit`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::event::{ChangeEvent, ChangeKind};

/// Handle returned by [`ChangeHub::on`], used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

type Handler = Rc<dyn Fn(&ChangeEvent)>;

#[derive(Default)]
struct Listeners {
    by_kind: FxHashMap<ChangeKind, Vec<(ListenerId, Handler)>>,
    next_id: u64,
}

/// Shared registry of change listeners.
#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Rc<RefCell<Listeners>>,
}

impl fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeHub")
            .field("listeners", &self.len())
            .finish()
    }
}

impl ChangeHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind.
    pub fn on(&self, kind: ChangeKind, handler: impl Fn(&ChangeEvent) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner
            .by_kind
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn off(&self, kind: ChangeKind, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.by_kind.get_mut(&kind) else {
            return false;
        };

        let before = list.len();
        list.retain(|(listener, _)| *listener != id);
        let removed = list.len() != before;

        if list.is_empty() {
            inner.by_kind.remove(&kind);
        }
        removed
    }

    /// Dispatch an event. Returns how many listeners were called.
    pub fn emit(&self, event: &ChangeEvent) -> usize {
        // Snapshot so handlers can re-enter the hub.
        let handlers: Vec<Handler> = self
            .inner
            .borrow()
            .by_kind
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, handler)| Rc::clone(handler)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of listeners for one kind.
    #[must_use]
    pub fn listener_count(&self, kind: ChangeKind) -> usize {
        self.inner.borrow().by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// Total number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().by_kind.values().map(Vec::len).sum()
    }

    /// Check if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UserRecord;
    use crate::events::ChangeOptions;
    use serde_json::json;
    use std::cell::Cell;

    fn user_event() -> ChangeEvent {
        ChangeEvent::UserUpdated {
            user: UserRecord::player("u1"),
            delta: json!({}),
            options: ChangeOptions::default(),
        }
    }

    #[test]
    fn test_on_and_emit() {
        let hub = ChangeHub::new();
        let calls = Rc::new(Cell::new(0));

        let seen = Rc::clone(&calls);
        hub.on(ChangeKind::UserUpdated, move |_| seen.set(seen.get() + 1));

        assert_eq!(hub.emit(&user_event()), 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(hub.listener_count(ChangeKind::UserUpdated), 1);
        assert_eq!(hub.listener_count(ChangeKind::ActorUpdated), 0);
    }

    #[test]
    fn test_off() {
        let hub = ChangeHub::new();
        let id = hub.on(ChangeKind::UserUpdated, |_| {});

        assert!(!hub.off(ChangeKind::ActorUpdated, id));
        assert!(hub.off(ChangeKind::UserUpdated, id));
        assert!(!hub.off(ChangeKind::UserUpdated, id));
        assert!(hub.is_empty());
        assert_eq!(hub.emit(&user_event()), 0);
    }

    #[test]
    fn test_handler_can_unregister_itself() {
        let hub = ChangeHub::new();
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let hub_handle = hub.clone();
        let own_id = Rc::clone(&slot);
        let id = hub.on(ChangeKind::UserUpdated, move |_| {
            if let Some(id) = own_id.get() {
                hub_handle.off(ChangeKind::UserUpdated, id);
            }
        });
        slot.set(Some(id));

        assert_eq!(hub.emit(&user_event()), 1);
        assert_eq!(hub.emit(&user_event()), 0);
    }

    #[test]
    fn test_registration_order() {
        let hub = ChangeHub::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for n in 0..3 {
            let order = Rc::clone(&order);
            hub.on(ChangeKind::UserUpdated, move |_| order.borrow_mut().push(n));
        }
        hub.emit(&user_event());
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
