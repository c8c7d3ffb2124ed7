// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module field state.
//!
//! - [`ModuleSnapshot`] - Values of the four mutable module fields
//! - [`FieldChange`] - One confirmed change of one field
//! - [`DirtyFields`] - Fields with unsaved local edits

mod field_change;
mod snapshot;

pub use field_change::FieldChange;
pub use snapshot::{DirtyFields, ModuleSnapshot};
