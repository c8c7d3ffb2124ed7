// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! X10 module addressing.
//!
//! An X10 module is addressed by a house code (`A`-`P`) and a unit code
//! (1-16). The controller exposes each module under the resource path
//! `/{house}/{unit}/`.

use std::fmt;
use std::str::FromStr;

use crate::error::IdentityError;

/// X10 house code, a letter between `A` and `P`.
///
/// # Examples
///
/// ```
/// use incontrol_lib::types::HouseCode;
///
/// let house = HouseCode::new('c').unwrap();
/// assert_eq!(house.as_char(), 'C');
///
/// assert!(HouseCode::new('Q').is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HouseCode(char);

impl HouseCode {
    /// First valid house code.
    pub const MIN: Self = Self('A');

    /// Last valid house code.
    pub const MAX: Self = Self('P');

    /// Creates a house code. Lowercase letters are accepted.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidHouse` if the letter is outside `A`-`P`.
    pub fn new(code: char) -> Result<Self, IdentityError> {
        let upper = code.to_ascii_uppercase();
        if (Self::MIN.0..=Self::MAX.0).contains(&upper) {
            Ok(Self(upper))
        } else {
            Err(IdentityError::InvalidHouse(code.to_string()))
        }
    }

    /// Returns the house letter.
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }

    /// Iterates over every valid house code.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }
}

impl fmt::Display for HouseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<char> for HouseCode {
    type Error = IdentityError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for HouseCode {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Self::new(code),
            _ => Err(IdentityError::InvalidHouse(s.to_string())),
        }
    }
}

/// X10 unit code, a number between 1 and 16.
///
/// # Examples
///
/// ```
/// use incontrol_lib::types::UnitCode;
///
/// assert_eq!(UnitCode::new(16).unwrap().value(), 16);
/// assert!(UnitCode::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitCode(u8);

impl UnitCode {
    /// First valid unit code.
    pub const MIN: Self = Self(1);

    /// Last valid unit code.
    pub const MAX: Self = Self(16);

    /// Creates a unit code.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidUnit` if the value is outside 1-16.
    pub fn new(unit: u8) -> Result<Self, IdentityError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&unit) {
            Ok(Self(unit))
        } else {
            Err(IdentityError::InvalidUnit(i64::from(unit)))
        }
    }

    /// Creates a unit code from a controller-reported integer.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidUnit` if the value is outside 1-16.
    pub fn from_reported(unit: i64) -> Result<Self, IdentityError> {
        u8::try_from(unit)
            .map_err(|_| IdentityError::InvalidUnit(unit))
            .and_then(Self::new)
    }

    /// Returns the unit number.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Iterates over every valid unit code.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for UnitCode {
    type Error = IdentityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Full address of a module: house code plus unit code.
///
/// # Examples
///
/// ```
/// use incontrol_lib::types::ModuleAddress;
///
/// let address = ModuleAddress::new('A', 1).unwrap();
/// assert_eq!(address.path(), "/A/1/");
/// assert_eq!(address.to_string(), "A1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleAddress {
    house: HouseCode,
    unit: UnitCode,
}

impl ModuleAddress {
    /// Creates an address from a house letter and a unit number.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if either part is out of range.
    pub fn new(house: char, unit: u8) -> Result<Self, IdentityError> {
        Ok(Self {
            house: HouseCode::new(house)?,
            unit: UnitCode::new(unit)?,
        })
    }

    /// Creates an address from already validated parts.
    #[must_use]
    pub const fn from_parts(house: HouseCode, unit: UnitCode) -> Self {
        Self { house, unit }
    }

    /// Returns the house code.
    #[must_use]
    pub const fn house(self) -> HouseCode {
        self.house
    }

    /// Returns the unit code.
    #[must_use]
    pub const fn unit(self) -> UnitCode {
        self.unit
    }

    /// Returns the controller resource path, `/{house}/{unit}/`.
    #[must_use]
    pub fn path(self) -> String {
        format!("/{}/{}/", self.house, self.unit)
    }
}

impl fmt::Display for ModuleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.house, self.unit)
    }
}
