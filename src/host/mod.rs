// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-side management of the module collection.
//!
//! The [`ModuleHost`] owns one [`Module`](crate::Module) per identity and
//! keeps the collection in step with the controller:
//!
//! 1. [`ModuleHost::refresh`] fetches the full module list.
//! 2. Modules no longer reported are removed.
//! 3. New modules are bound to the host transport and inserted.
//! 4. Known modules are merged with `update()`, keeping their instance and
//!    their subscriptions.
//!
//! Every step is published on the host event bus. Presentation components
//! can consume the broadcast channel directly or implement
//! [`HostListener`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use incontrol_lib::{HostConfig, HostListener, Module, ModuleHost};
//!
//! struct Printer;
//!
//! impl HostListener for Printer {
//!     fn on_module_added(&self, module: &Arc<Module>) {
//!         println!("added {module}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> incontrol_lib::Result<()> {
//!     let host = ModuleHost::new(HostConfig::new("192.168.1.20"));
//!     host.listen(Printer);
//!
//!     host.refresh().await?;
//!
//!     if let Some(module) = host.get_modules().first() {
//!         module.set_name("Kitchen");
//!         module.save().await?;
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod listener;
mod module_host;

pub use config::HostConfig;
pub use listener::{HostListener, dispatch, spawn_listener};
pub use module_host::{ModuleHost, RefreshSummary};
