//! Hub-driven defeat reconciliation.
//!
//! Change listeners cannot write to the host while it is publishing, so the
//! watch only queues the actors that need reconciling. The owner drains the
//! queue with [`DefeatWatch::run_pending`] once the host is free.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::{ActorId, Session};
use crate::events::{ChangeHub, ChangeKind, ListenerId};
use crate::host::{Documents, Persistence};

use super::reconciler::{DefeatReconciler, DefeatReport};

/// Listens for health changes and participant creation on a hub.
///
/// Listeners are removed when the watch is dropped.
pub struct DefeatWatch {
    hub: ChangeHub,
    reconciler: Rc<DefeatReconciler>,
    pending: Rc<RefCell<VecDeque<ActorId>>>,
    listeners: Vec<(ChangeKind, ListenerId)>,
}

impl DefeatWatch {
    /// Register the watch's listeners on a hub.
    pub fn register(hub: &ChangeHub, reconciler: DefeatReconciler) -> Self {
        let reconciler = Rc::new(reconciler);
        let pending = Rc::new(RefCell::new(VecDeque::new()));

        let listeners = [ChangeKind::ActorUpdated, ChangeKind::CombatantCreated]
            .into_iter()
            .map(|kind| {
                let reconciler = Rc::clone(&reconciler);
                let pending = Rc::clone(&pending);
                let id = hub.on(kind, move |event| {
                    if let Some(actor) = reconciler.trigger(event) {
                        let mut queue = pending.borrow_mut();
                        if !queue.contains(&actor) {
                            queue.push_back(actor);
                        }
                    }
                });
                (kind, id)
            })
            .collect();

        Self {
            hub: hub.clone(),
            reconciler,
            pending,
            listeners,
        }
    }

    /// Number of actors waiting for reconciliation.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Reconcile every queued actor, in arrival order.
    pub fn run_pending<H: Documents + Persistence + ?Sized>(
        &self,
        host: &mut H,
        session: &Session,
    ) -> Vec<DefeatReport> {
        let mut reports = Vec::new();
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(actor) = next else {
                break;
            };
            reports.push(self.reconciler.reconcile(host, session, &actor));
        }
        reports
    }
}

impl Drop for DefeatWatch {
    fn drop(&mut self) {
        for (kind, id) in self.listeners.drain(..) {
            self.hub.off(kind, id);
        }
    }
}
