// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module identifier type.

use std::fmt;

use super::ModuleAddress;

/// Identity of a module, its controller resource path.
///
/// Two modules are the same module exactly when their resource paths are
/// equal. Modules created locally use the path derived from their address;
/// modules received from the controller use the `url` it reports.
///
/// # Examples
///
/// ```
/// use incontrol_lib::types::{ModuleAddress, ModuleId};
///
/// let address = ModuleAddress::new('A', 1).unwrap();
/// let id = ModuleId::from(address);
/// assert_eq!(id.as_str(), "/A/1/");
/// assert_eq!(id, ModuleId::from_path("/A/1/"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates an identifier from a controller resource path.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the resource path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ModuleAddress> for ModuleId {
    fn from(address: ModuleAddress) -> Self {
        Self(address.path())
    }
}
