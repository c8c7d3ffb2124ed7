// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ordering::ModuleOrdering;
use crate::protocol::HttpConfig;

const DEFAULT_TIMEOUT_MS: u64 = 6000;

/// Settings of a [`ModuleHost`](crate::ModuleHost).
///
/// The serde representation uses the keys of the application settings
/// screen. Numbers may be given as JSON numbers or as numeric strings;
/// unparsable values fall back to their defaults. The ordering accepts a
/// kebab-case name or a preference index.
///
/// # Examples
///
/// ```
/// use incontrol_lib::HostConfig;
/// use incontrol_lib::ordering::ModuleOrdering;
///
/// let config: HostConfig = serde_json::from_str(r#"{
///     "domainOrIP": "controller.local",
///     "portNumber": "8080",
///     "connectionTimeout": 2500,
///     "orderModulesBy": "7"
/// }"#).unwrap();
///
/// assert_eq!(config.port, 8080);
/// assert_eq!(config.connection_timeout_ms, 2500);
/// assert_eq!(config.response_timeout_ms, 6000);
/// assert_eq!(config.ordering, ModuleOrdering::TypeName);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Domain name or IP address of the controller.
    #[serde(rename = "domainOrIP")]
    pub domain_or_ip: String,
    /// HTTP port.
    #[serde(rename = "portNumber", deserialize_with = "port")]
    pub port: u16,
    /// Basic auth user name. Empty disables authentication.
    #[serde(rename = "userName")]
    pub username: String,
    /// Basic auth password. Empty disables authentication.
    pub password: String,
    /// Connection timeout in milliseconds.
    #[serde(rename = "connectionTimeout", deserialize_with = "timeout_ms")]
    pub connection_timeout_ms: u64,
    /// Response timeout in milliseconds.
    #[serde(rename = "responseTimeout", deserialize_with = "timeout_ms")]
    pub response_timeout_ms: u64,
    /// Ordering of the module list.
    #[serde(
        rename = "orderModulesBy",
        alias = "deviceOrder",
        deserialize_with = "ordering"
    )]
    pub ordering: ModuleOrdering,
}

impl HostConfig {
    /// Creates a configuration for a controller with default settings.
    #[must_use]
    pub fn new(domain_or_ip: impl Into<String>) -> Self {
        Self {
            domain_or_ip: domain_or_ip.into(),
            ..Self::default()
        }
    }

    /// Sets the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the basic auth credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets both timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, response: Duration) -> Self {
        self.connection_timeout_ms = duration_ms(connect);
        self.response_timeout_ms = duration_ms(response);
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn with_ordering(mut self, ordering: ModuleOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// Returns the response timeout.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Returns the transport part of this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(&self.domain_or_ip)
            .with_port(self.port)
            .with_credentials(self.username.clone(), self.password.clone())
            .with_connect_timeout(self.connect_timeout())
            .with_response_timeout(self.response_timeout())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            domain_or_ip: String::new(),
            port: HttpConfig::DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            connection_timeout_ms: DEFAULT_TIMEOUT_MS,
            response_timeout_ms: DEFAULT_TIMEOUT_MS,
            ordering: ModuleOrdering::default(),
        }
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Lenient deserialization
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_number<'de, D, T>(deserializer: D, fallback: T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr + fmt::Display + Copy,
{
    let value = match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Value(value) => Some(value),
        Lenient::Text(text) => text.trim().parse().ok(),
        Lenient::Other(_) => None,
    };
    Ok(value.unwrap_or_else(|| {
        tracing::warn!(fallback = %fallback, "Ignoring invalid numeric setting");
        fallback
    }))
}

fn port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    lenient_number(deserializer, HttpConfig::DEFAULT_PORT)
}

fn timeout_ms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    lenient_number(deserializer, DEFAULT_TIMEOUT_MS)
}

fn ordering<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModuleOrdering, D::Error> {
    Ok(match Lenient::<i64>::deserialize(deserializer)? {
        Lenient::Value(index) => ModuleOrdering::from_index(index),
        Lenient::Text(text) => text.parse().unwrap_or_else(|_| {
            text.trim()
                .parse()
                .map_or_else(|_| ModuleOrdering::default(), ModuleOrdering::from_index)
        }),
        Lenient::Other(_) => ModuleOrdering::default(),
    })
}
