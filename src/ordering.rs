// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module ordering policies.
//!
//! A [`ModuleComparator`] compares modules by a list of [`SortKey`]s and
//! always finishes with house, unit and resource path, so two distinct
//! modules never compare equal. [`ModuleOrdering`] names the twelve
//! comparators a user can pick from.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::module::Module;
use crate::types::{HouseCode, ModuleId, ModuleType, UnitCode};

// ============================================================================
// Sort keys
// ============================================================================

/// One criterion of a module ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// House letter, ascending.
    House,
    /// Unit number, ascending.
    Unit,
    /// Module type ordinal, ascending.
    Type,
    /// Module type ordinal, descending.
    TypeDescending,
    /// Name, case-sensitive lexical.
    Name,
}

/// The values of a module that orderings look at, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingKey {
    house: HouseCode,
    unit: UnitCode,
    module_type: ModuleType,
    name: String,
    id: ModuleId,
}

impl OrderingKey {
    /// Captures the ordering key of a module from its working values.
    #[must_use]
    pub fn of(module: &Module) -> Self {
        let working = module.working();
        Self {
            house: module.house(),
            unit: module.unit(),
            module_type: working.module_type,
            name: working.name,
            id: module.id().clone(),
        }
    }

    fn compare_by(&self, other: &Self, key: SortKey) -> Ordering {
        match key {
            SortKey::House => self.house.cmp(&other.house),
            SortKey::Unit => self.unit.cmp(&other.unit),
            SortKey::Type => self.module_type.cmp(&other.module_type),
            SortKey::TypeDescending => other.module_type.cmp(&self.module_type),
            SortKey::Name => self.name.cmp(&other.name),
        }
    }
}

// ============================================================================
// ModuleComparator
// ============================================================================

/// A total order over modules.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use incontrol_lib::Module;
/// use incontrol_lib::ordering::{ModuleComparator, SortKey};
///
/// let by_name = ModuleComparator::new([SortKey::Name]);
/// let a = Module::new('B', 1).unwrap();
/// let b = Module::new('A', 1).unwrap();
///
/// // Equal names fall back to house
/// assert_eq!(by_name.compare(&a, &b), Ordering::Greater);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleComparator {
    keys: Vec<SortKey>,
}

impl ModuleComparator {
    /// Creates a comparator from its primary sort keys.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = SortKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Returns the primary sort keys, without the tie-break.
    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compares two captured ordering keys.
    #[must_use]
    pub fn compare_keys(&self, a: &OrderingKey, b: &OrderingKey) -> Ordering {
        self.keys
            .iter()
            .chain(&[SortKey::House, SortKey::Unit])
            .map(|key| a.compare_by(b, *key))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// Compares two modules.
    #[must_use]
    pub fn compare(&self, a: &Module, b: &Module) -> Ordering {
        self.compare_keys(&OrderingKey::of(a), &OrderingKey::of(b))
    }

    /// Sorts modules in place.
    ///
    /// Keys are captured before sorting, so concurrent edits cannot make
    /// the order inconsistent.
    pub fn sort(&self, modules: &mut Vec<Arc<Module>>) {
        let mut keyed: Vec<(OrderingKey, Arc<Module>)> = modules
            .drain(..)
            .map(|module| (OrderingKey::of(&module), module))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));
        modules.extend(keyed.into_iter().map(|(_, module)| module));
    }
}

// ============================================================================
// ModuleOrdering
// ============================================================================

/// The named orderings offered to users.
///
/// # Examples
///
/// ```
/// use incontrol_lib::ordering::ModuleOrdering;
///
/// let ordering: ModuleOrdering = "type-house-name".parse().unwrap();
/// assert_eq!(ordering, ModuleOrdering::TypeHouseName);
/// assert_eq!(ModuleOrdering::default(), ModuleOrdering::HouseUnit);
/// assert_eq!(ModuleOrdering::from_index(0), ModuleOrdering::Name);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleOrdering {
    /// Name.
    Name,
    /// House, then name.
    HouseName,
    /// House, then unit.
    #[default]
    HouseUnit,
    /// House, then type, then name.
    HouseTypeName,
    /// House, then type, then unit.
    HouseTypeUnit,
    /// House, then type descending, then name.
    HouseTypeDescName,
    /// House, then type descending, then unit.
    HouseTypeDescUnit,
    /// Type, then name.
    TypeName,
    /// Type, then house, then name.
    TypeHouseName,
    /// Type, then house, then unit.
    TypeHouseUnit,
    /// Type descending, then house, then name.
    TypeDescHouseName,
    /// Type descending, then house, then unit.
    TypeDescHouseUnit,
}

impl ModuleOrdering {
    /// All orderings, in preference index order.
    pub const ALL: [Self; 12] = [
        Self::Name,
        Self::HouseName,
        Self::HouseUnit,
        Self::HouseTypeName,
        Self::HouseTypeUnit,
        Self::HouseTypeDescName,
        Self::HouseTypeDescUnit,
        Self::TypeName,
        Self::TypeHouseName,
        Self::TypeHouseUnit,
        Self::TypeDescHouseName,
        Self::TypeDescHouseUnit,
    ];

    /// Returns the ordering stored at a preference index.
    ///
    /// Unknown indexes fall back to the default ordering.
    #[must_use]
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Returns the preference index of this ordering.
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|o| *o == self).unwrap_or_default()
    }

    /// Returns the kebab-case name of this ordering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::HouseName => "house-name",
            Self::HouseUnit => "house-unit",
            Self::HouseTypeName => "house-type-name",
            Self::HouseTypeUnit => "house-type-unit",
            Self::HouseTypeDescName => "house-type-desc-name",
            Self::HouseTypeDescUnit => "house-type-desc-unit",
            Self::TypeName => "type-name",
            Self::TypeHouseName => "type-house-name",
            Self::TypeHouseUnit => "type-house-unit",
            Self::TypeDescHouseName => "type-desc-house-name",
            Self::TypeDescHouseUnit => "type-desc-house-unit",
        }
    }

    /// Returns the primary sort keys of this ordering.
    #[must_use]
    pub fn sort_keys(self) -> &'static [SortKey] {
        use SortKey::{House, Name, Type, TypeDescending, Unit};
        match self {
            Self::Name => &[Name],
            Self::HouseName => &[House, Name],
            Self::HouseUnit => &[House, Unit],
            Self::HouseTypeName => &[House, Type, Name],
            Self::HouseTypeUnit => &[House, Type, Unit],
            Self::HouseTypeDescName => &[House, TypeDescending, Name],
            Self::HouseTypeDescUnit => &[House, TypeDescending, Unit],
            Self::TypeName => &[Type, Name],
            Self::TypeHouseName => &[Type, House, Name],
            Self::TypeHouseUnit => &[Type, House, Unit],
            Self::TypeDescHouseName => &[TypeDescending, House, Name],
            Self::TypeDescHouseUnit => &[TypeDescending, House, Unit],
        }
    }

    /// Builds the comparator for this ordering.
    #[must_use]
    pub fn comparator(self) -> ModuleComparator {
        ModuleComparator::new(self.sort_keys().iter().copied())
    }
}

impl fmt::Display for ModuleOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleOrdering {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| ValueError::InvalidOrdering(s.to_string()))
    }
}
