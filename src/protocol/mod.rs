// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote transport for the InControl controller.
//!
//! The controller exposes its modules over plain HTTP:
//!
//! | Operation | Request | Body |
//! |-----------|---------|------|
//! | fetch all | `GET {base}/` | - |
//! | save | `POST {base}{url}` | form-encoded dirty fields |
//! | delete | `DELETE {base}{url}` | - |
//!
//! Responses are JSON documents ([`ModuleList`] and [`ModuleDocument`]).
//! An empty body is treated as "nothing changed".

mod document;
mod http;

pub use document::{ModuleDocument, ModuleList};
pub use http::{HttpConfig, HttpTransport, domain_from_uri};
