// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module field snapshots and dirty field sets.

use crate::types::{Brightness, ModuleType, PowerState};

use super::FieldChange;

/// Values of the mutable fields of a module at one point in time.
///
/// Every module holds two snapshots: the *persisted* one mirrors what the
/// controller last confirmed, the *working* one carries unsaved local edits.
///
/// # Examples
///
/// ```
/// use incontrol_lib::state::ModuleSnapshot;
/// use incontrol_lib::types::{ModuleType, PowerState};
///
/// let snapshot = ModuleSnapshot::new()
///     .with_type(ModuleType::Appliance)
///     .with_name("Heater")
///     .with_state(PowerState::Off);
/// assert_eq!(snapshot.name, "Heater");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSnapshot {
    /// Module type.
    pub module_type: ModuleType,
    /// Display name.
    pub name: String,
    /// Power state.
    pub state: PowerState,
    /// Dimmer level.
    pub brightness: Brightness,
}

impl ModuleSnapshot {
    /// Creates an empty snapshot (all fields unknown).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module type.
    #[must_use]
    pub fn with_type(mut self, module_type: ModuleType) -> Self {
        self.module_type = module_type;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the power state.
    #[must_use]
    pub fn with_state(mut self, state: PowerState) -> Self {
        self.state = state;
        self
    }

    /// Sets the dimmer level.
    #[must_use]
    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = brightness;
        self
    }

    /// Returns the changes that turn `self` into `newer`, in field order
    /// type, name, state, brightness.
    #[must_use]
    pub fn changes_to(&self, newer: &Self) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        if self.module_type != newer.module_type {
            changes.push(FieldChange::Type(newer.module_type));
        }
        if self.name != newer.name {
            changes.push(FieldChange::Name(newer.name.clone()));
        }
        if self.state != newer.state {
            changes.push(FieldChange::State(newer.state));
        }
        if self.brightness != newer.brightness {
            changes.push(FieldChange::Brightness(newer.brightness));
        }
        changes
    }

    /// Applies a change and returns `true` if the snapshot changed.
    pub fn apply(&mut self, change: &FieldChange) -> bool {
        match change {
            FieldChange::Type(value) => replace_if_different(&mut self.module_type, *value),
            FieldChange::Name(value) => {
                if self.name == *value {
                    false
                } else {
                    self.name.clone_from(value);
                    true
                }
            }
            FieldChange::State(value) => replace_if_different(&mut self.state, *value),
            FieldChange::Brightness(value) => replace_if_different(&mut self.brightness, *value),
        }
    }
}

fn replace_if_different<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// The fields whose working value differs from the persisted value.
///
/// Only these fields are posted to the controller on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyFields {
    /// New module type, if changed.
    pub module_type: Option<ModuleType>,
    /// New display name, if changed.
    pub name: Option<String>,
    /// New power state, if changed.
    pub state: Option<PowerState>,
    /// New dimmer level, if changed.
    pub brightness: Option<Brightness>,
}

impl DirtyFields {
    /// Computes the dirty set between a persisted and a working snapshot.
    #[must_use]
    pub fn between(persisted: &ModuleSnapshot, working: &ModuleSnapshot) -> Self {
        let mut dirty = Self::default();
        for change in persisted.changes_to(working) {
            match change {
                FieldChange::Type(value) => dirty.module_type = Some(value),
                FieldChange::Name(value) => dirty.name = Some(value),
                // Unknown is never written to the controller
                FieldChange::State(value) if value.is_known() => dirty.state = Some(value),
                FieldChange::State(_) => {}
                FieldChange::Brightness(value) => dirty.brightness = Some(value),
            }
        }
        dirty
    }

    /// Returns `true` if no field is dirty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of dirty fields.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.module_type.is_some())
            + usize::from(self.name.is_some())
            + usize::from(self.state.is_some())
            + usize::from(self.brightness.is_some())
    }

    /// Returns the form-encoded pairs posted to the controller.
    ///
    /// `type` is the ordinal, `name` is sent as a quoted string literal,
    /// `on` is `0` or `1` and `brightness` is the plain integer.
    #[must_use]
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(self.len());
        if let Some(module_type) = self.module_type {
            pairs.push(("type", module_type.ordinal().to_string()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", format!("\"{name}\"")));
        }
        if let Some(on) = self.state.and_then(PowerState::wire_value) {
            pairs.push(("on", on.to_string()));
        }
        if let Some(brightness) = self.brightness {
            pairs.push(("brightness", brightness.value().to_string()));
        }
        pairs
    }
}
