// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for module notifications.
//!
//! Every [`Module`](crate::Module) owns a [`CallbackRegistry`]. Field
//! callbacks fire only for changes confirmed by the controller (through
//! `update()`), never for local edits. Request callbacks report the life
//! cycle of a save.
//!
//! ```
//! use incontrol_lib::Module;
//! use incontrol_lib::state::ModuleSnapshot;
//!
//! let module = Module::new('A', 1).unwrap();
//! module.on_name_changed(|module, name| {
//!     println!("{} is now called {name}", module.address());
//! });
//!
//! // Local edits stay silent
//! module.set_name("Lamp");
//!
//! // Confirmed changes notify
//! module.update(&ModuleSnapshot::default().with_name("Desk"));
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
