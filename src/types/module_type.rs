// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module type (appliance, dimmer, sensor).

use std::fmt;

use crate::error::ValueError;

/// The kind of device behind a module address.
///
/// Variants are declared in wire ordinal order, so the derived `Ord` matches
/// the order used when sorting by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleType {
    /// Type has not been configured.
    #[default]
    Unknown,
    /// On/off appliance module.
    Appliance,
    /// Lamp module with dimmer support.
    Dimmer,
    /// Sensor module (read only).
    Sensor,
}

impl ModuleType {
    /// All module types in ordinal order.
    pub const ALL: [Self; 4] = [Self::Unknown, Self::Appliance, Self::Dimmer, Self::Sensor];

    /// Returns the wire ordinal (0-3).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Appliance => 1,
            Self::Dimmer => 2,
            Self::Sensor => 3,
        }
    }

    /// Creates a module type from its wire ordinal.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidModuleType` for ordinals above 3.
    pub fn from_ordinal(ordinal: u8) -> Result<Self, ValueError> {
        match ordinal {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Appliance),
            2 => Ok(Self::Dimmer),
            3 => Ok(Self::Sensor),
            other => Err(ValueError::InvalidModuleType(other)),
        }
    }

    /// Maps a controller-reported type to a module type.
    ///
    /// Anything outside 0-3 is treated as `Unknown`.
    #[must_use]
    pub fn from_reported(value: i64) -> Self {
        u8::try_from(value)
            .ok()
            .and_then(|ordinal| Self::from_ordinal(ordinal).ok())
            .unwrap_or_default()
    }

    /// Returns the display string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Appliance => "Appliance",
            Self::Dimmer => "Dimmer",
            Self::Sensor => "Sensor",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for ModuleType {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value)
    }
}
