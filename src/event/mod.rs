// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for host notifications.
//!
//! A [`ModuleHost`](crate::ModuleHost) publishes [`HostEvent`]s on a tokio
//! broadcast channel, so any number of presentation components can follow
//! the collection.
//!
//! # Examples
//!
//! ```
//! use incontrol_lib::ModuleHost;
//! use incontrol_lib::event::HostEvent;
//!
//! let host = ModuleHost::default();
//! let mut rx = host.subscribe();
//!
//! # let module = incontrol_lib::Module::new('A', 1).unwrap();
//! host.add_module(module);
//! assert!(matches!(rx.try_recv(), Ok(HostEvent::ModuleAdded { .. })));
//! ```

mod event_bus;
mod host_event;

pub(crate) use event_bus::EventBus;
pub use host_event::{HostEvent, HostOperation};
