// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `InControl` Lib - A Rust library to synchronize X10 modules with an
//! `InControl` controller.
//!
//! The controller exposes its modules as JSON over HTTP. This library keeps
//! a local, observable copy of them and pushes user edits back.
//!
//! # Concepts
//!
//! - **[`Module`]**: one X10 device, identified by house letter (`A`-`P`)
//!   and unit number (1-16). Each field has a persisted value (confirmed by
//!   the controller) and a working value (edited locally).
//! - **[`ModuleHost`]**: owns the collection, fetches it, reconciles it and
//!   publishes [`HostEvent`](event::HostEvent)s.
//! - **[`ModuleOrdering`](ordering::ModuleOrdering)**: the twelve orderings
//!   the module list can be sorted by.
//!
//! # Quick Start
//!
//! ```no_run
//! use incontrol_lib::{HostConfig, ModuleHost};
//! use incontrol_lib::types::PowerState;
//!
//! #[tokio::main]
//! async fn main() -> incontrol_lib::Result<()> {
//!     let config = HostConfig::new("192.168.1.20").with_credentials("admin", "secret");
//!     let host = ModuleHost::new(config);
//!
//!     host.refresh().await?;
//!
//!     for module in host.get_modules() {
//!         // Local edits stay local until saved
//!         module.set_state(PowerState::On);
//!         module.save().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Change Notifications
//!
//! Module callbacks fire only for values confirmed by the controller:
//!
//! ```
//! use incontrol_lib::Module;
//! use incontrol_lib::state::ModuleSnapshot;
//! use incontrol_lib::types::PowerState;
//!
//! let module = Module::new('A', 1).unwrap();
//! module.on_state_changed(|module, state| {
//!     println!("{} is now {state}", module.address());
//! });
//!
//! module.set_state(PowerState::On); // silent
//! module.update(&ModuleSnapshot::new().with_state(PowerState::On)); // notifies
//! ```

pub mod error;
pub mod event;
pub mod host;
mod module;
pub mod ordering;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;

pub use error::{Error, IdentityError, ParseError, ProtocolError, Result, ValueError};
pub use host::{HostConfig, HostListener, ModuleHost, RefreshSummary};
pub use module::Module;
pub use ordering::{ModuleComparator, ModuleOrdering, SortKey};
pub use protocol::{HttpConfig, ModuleDocument, ModuleList};
pub use subscription::SubscriptionId;
pub use types::{Brightness, HouseCode, ModuleAddress, ModuleId, ModuleType, PowerState, UnitCode};
