// ABOUTME: Shared handle pairing a dashboard's layout with its event hub
// ABOUTME: Events queued by a mutation are delivered after the layout lock is released

use parking_lot::Mutex;
use std::sync::Arc;

use dockyard_events::{EventHub, HubEvent};

use crate::layout::Layout;

/// Cloneable handle to a layout and the hub its events go to.
///
/// Listeners run outside the layout lock, so they may call `update` again.
/// Calling `update` or `read` from inside the closure passed to either one
/// deadlocks.
#[derive(Clone)]
pub struct LayoutHandle {
    layout: Arc<Mutex<Layout>>,
    hub: Arc<EventHub>,
}

impl LayoutHandle {
    pub fn new(layout: Layout, hub: Arc<EventHub>) -> Self {
        Self {
            layout: Arc::new(Mutex::new(layout)),
            hub,
        }
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    /// Mutate the layout, then deliver whatever the mutation queued.
    pub fn update<R>(&self, f: impl FnOnce(&mut Layout) -> R) -> R {
        let (result, outgoing) = {
            let mut layout = self.layout.lock();
            let result = f(&mut layout);
            (result, layout.take_outgoing())
        };
        for item in outgoing {
            if let Some(event) = item.deliver_container() {
                self.hub.emit(event);
            }
        }
        result
    }

    pub fn read<R>(&self, f: impl FnOnce(&Layout) -> R) -> R {
        f(&self.layout.lock())
    }

    pub fn emit(&self, event: HubEvent) {
        self.hub.emit(event);
    }
}
