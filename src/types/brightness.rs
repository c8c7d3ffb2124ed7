// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for dimmer modules.
//!
//! This module provides a type-safe representation of dimmer levels,
//! ensuring values are always within the valid range of 0-100%.

use std::fmt;

use crate::error::ValueError;

/// Dimmer level as a percentage (0-100).
///
/// Only meaningful for [`ModuleType::Dimmer`](super::ModuleType::Dimmer)
/// modules, but every module carries one.
///
/// # Examples
///
/// ```
/// use incontrol_lib::types::Brightness;
///
/// let level = Brightness::new(75).unwrap();
/// assert_eq!(level.value(), 75);
///
/// assert_eq!(Brightness::MIN.value(), 0);
/// assert_eq!(Brightness::MAX.value(), 100);
///
/// // Invalid values return error
/// assert!(Brightness::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness value (0%).
    pub const MIN: Self = Self(0);

    /// Maximum brightness value (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a brightness value, clamping to the valid range.
    ///
    /// The controller reports brightness as a plain JSON integer, so values
    /// are accepted from any integer and clamped to 0-100.
    ///
    /// # Examples
    ///
    /// ```
    /// use incontrol_lib::types::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(150).value(), 100);
    /// assert_eq!(Brightness::clamped(-5).value(), 0);
    /// ```
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        // Lossless after clamping to 0..=100
        Self(u8::try_from(value.clamp(0, 100)).unwrap_or(100))
    }

    /// Returns the brightness percentage value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_valid_values() {
        for v in 0..=100 {
            assert_eq!(Brightness::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn brightness_invalid_value() {
        assert!(matches!(
            Brightness::new(101),
            Err(ValueError::OutOfRange { actual: 101, .. })
        ));
    }

    #[test]
    fn brightness_clamped() {
        assert_eq!(Brightness::clamped(50).value(), 50);
        assert_eq!(Brightness::clamped(255).value(), 100);
        assert_eq!(Brightness::clamped(-1).value(), 0);
        assert_eq!(Brightness::clamped(i64::MAX).value(), 100);
    }

    #[test]
    fn brightness_default_is_zero() {
        assert_eq!(Brightness::default(), Brightness::MIN);
    }

    #[test]
    fn brightness_display() {
        assert_eq!(Brightness::new(75).unwrap().to_string(), "75%");
    }
}
