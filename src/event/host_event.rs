// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host event types.

use std::fmt;
use std::sync::Arc;

use crate::module::Module;

/// The network operation a request event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOperation {
    /// Fetch and reconcile of the whole collection.
    Refresh,
    /// Removal of one module on the controller.
    Delete,
}

impl fmt::Display for HostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh => f.write_str("refresh"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// Events emitted by a [`ModuleHost`](crate::ModuleHost).
///
/// Module events carry the owned module instance, so receivers can read its
/// current fields or register callbacks on it.
///
/// # Examples
///
/// ```
/// use incontrol_lib::event::{HostEvent, HostOperation};
///
/// let started = HostEvent::RequestStarted { operation: HostOperation::Refresh };
/// assert!(started.is_request());
/// assert!(started.module().is_none());
/// ```
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// A network request started.
    RequestStarted {
        /// The operation that issued the request.
        operation: HostOperation,
    },

    /// A network request completed successfully.
    RequestCompleted {
        /// The operation that issued the request.
        operation: HostOperation,
    },

    /// A network request failed.
    RequestFailed {
        /// The operation that issued the request.
        operation: HostOperation,
        /// Human readable failure reason.
        reason: String,
    },

    /// A module joined the collection.
    ModuleAdded {
        /// The owned module.
        module: Arc<Module>,
    },

    /// A module already in the collection received confirmed changes.
    ModuleChanged {
        /// The owned module.
        module: Arc<Module>,
    },

    /// A module left the collection.
    ModuleDeleted {
        /// The removed module.
        module: Arc<Module>,
    },
}

impl HostEvent {
    /// Creates a module added event.
    #[must_use]
    pub fn module_added(module: Arc<Module>) -> Self {
        Self::ModuleAdded { module }
    }

    /// Creates a module changed event.
    #[must_use]
    pub fn module_changed(module: Arc<Module>) -> Self {
        Self::ModuleChanged { module }
    }

    /// Creates a module deleted event.
    #[must_use]
    pub fn module_deleted(module: Arc<Module>) -> Self {
        Self::ModuleDeleted { module }
    }

    /// Creates a request failed event.
    #[must_use]
    pub fn request_failed(operation: HostOperation, reason: impl Into<String>) -> Self {
        Self::RequestFailed {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns the module this event refers to, if any.
    #[must_use]
    pub fn module(&self) -> Option<&Arc<Module>> {
        match self {
            Self::ModuleAdded { module }
            | Self::ModuleChanged { module }
            | Self::ModuleDeleted { module } => Some(module),
            Self::RequestStarted { .. }
            | Self::RequestCompleted { .. }
            | Self::RequestFailed { .. } => None,
        }
    }

    /// Returns the operation of a request event.
    #[must_use]
    pub fn operation(&self) -> Option<HostOperation> {
        match self {
            Self::RequestStarted { operation }
            | Self::RequestCompleted { operation }
            | Self::RequestFailed { operation, .. } => Some(*operation),
            Self::ModuleAdded { .. } | Self::ModuleChanged { .. } | Self::ModuleDeleted { .. } => {
                None
            }
        }
    }

    /// Returns `true` if this is a request life cycle event.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.operation().is_some()
    }

    /// Returns `true` if this is a collection change event.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.module().is_some()
    }
}
