// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON documents exchanged with the controller.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::state::ModuleSnapshot;
use crate::types::{Brightness, HouseCode, ModuleAddress, ModuleId, ModuleType, PowerState, UnitCode};

/// Response body of `GET {base}/`.
///
/// # Examples
///
/// ```
/// use incontrol_lib::protocol::ModuleList;
///
/// let list: ModuleList = serde_json::from_str(
///     r#"{"module":[{"house":"A","unit":1,"url":"/A/1/","type":2,"on":true}]}"#,
/// ).unwrap();
/// assert_eq!(list.module.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleList {
    /// The modules known to the controller.
    pub module: Vec<ModuleDocument>,
}

/// A single module as reported by the controller.
///
/// `house`, `unit` and `url` are always present. The remaining fields are
/// omitted when the controller has no value for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDocument {
    /// House letter.
    pub house: String,
    /// Unit number.
    pub unit: i64,
    /// Resource path of the module.
    pub url: String,
    /// Module type ordinal (0-3).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<i64>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Power state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    /// Dimmer level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i64>,
}

impl ModuleDocument {
    /// Creates a document with only the required fields.
    #[must_use]
    pub fn new(address: ModuleAddress) -> Self {
        Self {
            house: address.house().to_string(),
            unit: i64::from(address.unit().value()),
            url: address.path(),
            module_type: None,
            name: None,
            on: None,
            brightness: None,
        }
    }

    /// Sets the type ordinal.
    #[must_use]
    pub fn with_type(mut self, module_type: ModuleType) -> Self {
        self.module_type = Some(i64::from(module_type.ordinal()));
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the power state.
    #[must_use]
    pub fn with_on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    /// Sets the dimmer level.
    #[must_use]
    pub fn with_brightness(mut self, brightness: i64) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Returns the validated module address.
    ///
    /// Only the first character of `house` is significant.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the house or unit is out of range.
    pub fn address(&self) -> Result<ModuleAddress, IdentityError> {
        let house = self
            .house
            .chars()
            .next()
            .ok_or_else(|| IdentityError::InvalidHouse(self.house.clone()))
            .and_then(HouseCode::new)?;
        let unit = UnitCode::from_reported(self.unit)?;
        Ok(ModuleAddress::from_parts(house, unit))
    }

    /// Returns the module identity (the reported resource path).
    #[must_use]
    pub fn id(&self) -> ModuleId {
        ModuleId::from_path(self.url.clone())
    }

    /// Converts the document into a field snapshot, applying defaults for
    /// absent fields.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the address is invalid, since the default
    /// name is derived from it.
    pub fn snapshot(&self) -> Result<ModuleSnapshot, IdentityError> {
        let address = self.address()?;
        Ok(ModuleSnapshot {
            module_type: self
                .module_type
                .map(ModuleType::from_reported)
                .unwrap_or_default(),
            name: self.name.clone().unwrap_or_else(|| address.to_string()),
            state: self.on.map(PowerState::from).unwrap_or_default(),
            brightness: self.brightness.map(Brightness::clamped).unwrap_or_default(),
        })
    }
}
