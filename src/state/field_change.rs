// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field change representation.
//!
//! A [`FieldChange`] is one confirmed change of one mutable module field.
//! Changes are produced by diffing a [`ModuleSnapshot`](super::ModuleSnapshot)
//! against a newer one and are dispatched one by one to change callbacks.
//!
//! # Examples
//!
//! ```
//! use incontrol_lib::state::{FieldChange, ModuleSnapshot};
//! use incontrol_lib::types::PowerState;
//!
//! let mut snapshot = ModuleSnapshot::new();
//!
//! // Apply returns true if the snapshot actually changed
//! assert!(snapshot.apply(&FieldChange::State(PowerState::On)));
//! assert!(!snapshot.apply(&FieldChange::State(PowerState::On)));
//! ```

use crate::types::{Brightness, ModuleType, PowerState};

/// A change of a single module field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Module type changed.
    Type(ModuleType),

    /// Display name changed.
    Name(String),

    /// Power state changed.
    State(PowerState),

    /// Dimmer level changed.
    Brightness(Brightness),
}

impl FieldChange {
    /// Returns the form field name the controller uses for this field.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Name(_) => "name",
            Self::State(_) => "on",
            Self::Brightness(_) => "brightness",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_match_form_keys() {
        assert_eq!(FieldChange::Type(ModuleType::Dimmer).field_name(), "type");
        assert_eq!(FieldChange::Name("Lamp".to_string()).field_name(), "name");
        assert_eq!(FieldChange::State(PowerState::On).field_name(), "on");
        assert_eq!(
            FieldChange::Brightness(Brightness::MAX).field_name(),
            "brightness"
        );
    }
}
