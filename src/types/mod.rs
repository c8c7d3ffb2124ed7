// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for X10 modules.
//!
//! Each type ensures values are within their valid ranges at construction
//! time.
//!
//! # Types
//!
//! - [`HouseCode`] - House letter (`A`-`P`)
//! - [`UnitCode`] - Unit number (1-16)
//! - [`ModuleAddress`] - House plus unit
//! - [`ModuleId`] - Controller resource path identifying a module
//! - [`ModuleType`] - Appliance, dimmer or sensor
//! - [`PowerState`] - On/Off/Unknown
//! - [`Brightness`] - Dimmer level (0-100%)

mod address;
mod brightness;
mod module_id;
mod module_type;
mod power;

pub use address::{HouseCode, ModuleAddress, UnitCode};
pub use brightness::Brightness;
pub use module_id::ModuleId;
pub use module_type::ModuleType;
pub use power::PowerState;
