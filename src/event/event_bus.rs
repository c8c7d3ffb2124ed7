// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel carrying the host's events.

use tokio::sync::broadcast;

use super::HostEvent;

/// Events buffered per receiver before it lags.
const CAPACITY: usize = 256;

/// Fan-out of [`HostEvent`]s to every receiver of one host.
///
/// Slow receivers lose the oldest events and observe
/// `RecvError::Lagged`.
#[derive(Debug)]
pub(crate) struct EventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }

    /// Sends an event. Without receivers it is dropped.
    pub(crate) fn publish(&self, event: HostEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No host event receiver");
        }
    }
}
