// ABOUTME: Synchronous publish-subscribe hub shared by one dashboard
// ABOUTME: Events emitted while a dispatch is running are queued and delivered in order

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::panel_event::HubEvent;

pub type Listener = Arc<dyn Fn(&HubEvent) + Send + Sync>;

/// Returned by [`EventHub::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    name: &'static str,
    listener: Listener,
}

/// Event hub for one dashboard.
///
/// Delivery is synchronous: `emit` returns after every listener saw the
/// event, unless it was called from inside a listener. In that case the event
/// joins the queue and is delivered once the running listener returns, so
/// handlers observe events in emission order and may freely emit or call back
/// into anything that emits.
#[derive(Default)]
pub struct EventHub {
    listeners: RwLock<Vec<Registration>>,
    queue: Mutex<VecDeque<HubEvent>>,
    dispatching: AtomicBool,
    next_id: AtomicU64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to events named `name`.
    pub fn on<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(&HubEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push(Registration {
            id,
            name,
            listener: Arc::new(listener),
        });
        id
    }

    /// Unsubscribe. Returns false if the id was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|registration| registration.name == name)
            .count()
    }

    pub fn emit(&self, event: HubEvent) {
        self.queue.lock().push_back(event);

        loop {
            if self.dispatching.swap(true, Ordering::AcqRel) {
                // The running dispatch will pick the event up.
                return;
            }

            {
                let _dispatching = DispatchGuard(&self.dispatching);
                self.drain();
            }

            // Another thread may have queued between the last pop and the store.
            if self.queue.lock().is_empty() {
                return;
            }
        }
    }

    fn drain(&self) {
        loop {
            let next = self.queue.lock().pop_front();
            let Some(event) = next else {
                return;
            };

            let name = event.name();
            let listeners: Vec<Listener> = self
                .listeners
                .read()
                .iter()
                .filter(|registration| registration.name == name)
                .map(|registration| registration.listener.clone())
                .collect();

            tracing::trace!(event = name, listeners = listeners.len(), "Dispatching hub event");
            for listener in listeners {
                listener(&event);
            }
        }
    }
}

/// Clears the dispatching flag when a drain ends, including by a listener panic.
struct DispatchGuard<'a>(&'a AtomicBool);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
