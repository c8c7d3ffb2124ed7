// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state of a module.

use std::fmt;

/// Represents the on/off state of a module.
///
/// `Unknown` is what the controller reports when it has not seen the module
/// switch yet. It is never sent back to the controller.
///
/// # Examples
///
/// ```
/// use incontrol_lib::types::PowerState;
///
/// assert_eq!(PowerState::from(true), PowerState::On);
/// assert_eq!(PowerState::On.wire_value(), Some("1"));
/// assert_eq!(PowerState::Unknown.wire_value(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// State has not been reported.
    #[default]
    Unknown,
    /// Module is on.
    On,
    /// Module is off.
    Off,
}

impl PowerState {
    /// Returns the display string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }

    /// Returns the value posted in the `on` form field.
    ///
    /// Returns `None` for `Unknown`.
    #[must_use]
    pub const fn wire_value(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::On => Some("1"),
            Self::Off => Some("0"),
        }
    }

    /// Returns `true` if the state is known.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_as_str() {
        assert_eq!(PowerState::Unknown.as_str(), "UNKNOWN");
        assert_eq!(PowerState::On.as_str(), "ON");
        assert_eq!(PowerState::Off.as_str(), "OFF");
    }

    #[test]
    fn power_state_wire_value() {
        assert_eq!(PowerState::On.wire_value(), Some("1"));
        assert_eq!(PowerState::Off.wire_value(), Some("0"));
        assert_eq!(PowerState::Unknown.wire_value(), None);
    }

    #[test]
    fn power_state_from_bool() {
        assert_eq!(PowerState::from(true), PowerState::On);
        assert_eq!(PowerState::from(false), PowerState::Off);
    }

    #[test]
    fn power_state_default_is_unknown() {
        assert_eq!(PowerState::default(), PowerState::Unknown);
        assert!(!PowerState::default().is_known());
    }
}
