// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener interface for presentation components.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::event::{HostEvent, HostOperation};
use crate::module::Module;

/// Receiver of host notifications.
///
/// Every method has an empty default, so implementors only override what
/// they display.
pub trait HostListener: Send + Sync + 'static {
    /// A request of the given operation started.
    fn on_request_start(&self, _operation: HostOperation) {}

    /// A request of the given operation completed.
    fn on_request_complete(&self, _operation: HostOperation) {}

    /// A request of the given operation failed.
    fn on_request_error(&self, _operation: HostOperation, _reason: &str) {}

    /// A module joined the collection.
    fn on_module_added(&self, _module: &Arc<Module>) {}

    /// A module received confirmed changes.
    fn on_module_changed(&self, _module: &Arc<Module>) {}

    /// A module left the collection.
    fn on_module_deleted(&self, _module: &Arc<Module>) {}
}

/// Calls the listener method matching an event.
pub fn dispatch(listener: &dyn HostListener, event: &HostEvent) {
    match event {
        HostEvent::RequestStarted { operation } => listener.on_request_start(*operation),
        HostEvent::RequestCompleted { operation } => listener.on_request_complete(*operation),
        HostEvent::RequestFailed { operation, reason } => {
            listener.on_request_error(*operation, reason);
        }
        HostEvent::ModuleAdded { module } => listener.on_module_added(module),
        HostEvent::ModuleChanged { module } => listener.on_module_changed(module),
        HostEvent::ModuleDeleted { module } => listener.on_module_deleted(module),
    }
}

/// Spawns a task forwarding host events to a listener.
///
/// The task ends when the host and all its clones are dropped. Lagging
/// behind is logged and the task continues with the next event.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_listener<L: HostListener>(
    mut events: broadcast::Receiver<HostEvent>,
    listener: L,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => dispatch(&listener, &event),
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(missed = n, "Host listener lagged behind");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl HostListener for Recorder {
        fn on_request_start(&self, operation: HostOperation) {
            self.calls.lock().push(format!("start {operation}"));
        }

        fn on_request_error(&self, operation: HostOperation, reason: &str) {
            self.calls.lock().push(format!("error {operation}: {reason}"));
        }

        fn on_module_added(&self, module: &Arc<Module>) {
            self.calls.lock().push(format!("added {}", module.address()));
        }
    }

    #[test]
    fn dispatch_routes_to_matching_method() {
        let recorder = Recorder::default();
        let module = Arc::new(Module::new('A', 1).unwrap());

        dispatch(&recorder, &HostEvent::RequestStarted { operation: HostOperation::Refresh });
        dispatch(&recorder, &HostEvent::module_added(module.clone()));
        // Default no-op
        dispatch(&recorder, &HostEvent::module_deleted(module));
        dispatch(&recorder, &HostEvent::request_failed(HostOperation::Delete, "gone"));

        assert_eq!(
            *recorder.calls.lock(),
            vec!["start refresh", "added A1", "error delete: gone"]
        );
    }

    #[tokio::test]
    async fn spawned_listener_stops_when_bus_is_dropped() {
        let bus = EventBus::new();
        let recorder = Recorder::default();
        let calls = recorder.calls.clone();
        let handle = spawn_listener(bus.subscribe(), recorder);

        bus.publish(HostEvent::RequestStarted { operation: HostOperation::Delete });
        drop(bus);

        handle.await.unwrap();
        assert_eq!(*calls.lock(), vec!["start delete"]);
    }
}
