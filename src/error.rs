// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `InControl` library.
//!
//! This module provides the error hierarchy used across the library: module
//! identity validation, value validation, configuration, transport
//! communication and JSON parsing.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A module identity (house or unit code) is invalid.
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityError),

    /// A module field value is invalid.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The module is not bound to a host and cannot talk to the controller.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Error occurred while talking to the controller.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a controller response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Returns `true` if this error came from the network layer.
    ///
    /// Configuration and identity errors are programming errors and should
    /// not be shown to the user as a failed request.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::Parse(_))
    }
}

/// Errors raised when a module address is constructed from invalid parts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The house code is not a letter between `A` and `P`.
    #[error("house code {0:?} is not between A and P")]
    InvalidHouse(String),

    /// The unit code is not between 1 and 16.
    #[error("unit code {0} is not between 1 and 16")]
    InvalidUnit(i64),
}

/// Errors related to field value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An unknown module type ordinal was provided.
    #[error("invalid module type ordinal: {0}")]
    InvalidModuleType(u8),

    /// An unknown ordering name was provided.
    #[error("invalid ordering: {0}")]
    InvalidOrdering(String),
}

/// Errors related to HTTP communication with the controller.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the controller failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The controller answered with a non-success status.
    #[error("HTTP {code} - {reason}")]
    Status {
        /// The HTTP status code.
        code: u16,
        /// The canonical reason phrase.
        reason: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing controller responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
