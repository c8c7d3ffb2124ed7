// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for module notifications.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing and dispatching module callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::module::Module;
use crate::state::FieldChange;
use crate::types::{Brightness, ModuleType, PowerState};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to unsubscribe later. IDs
/// are unique within a module's lifetime.
///
/// # Examples
///
/// ```
/// use incontrol_lib::Module;
///
/// let module = Module::new('A', 1).unwrap();
/// let sub_id = module.on_name_changed(|_module, name| println!("renamed to {name}"));
///
/// assert!(module.unsubscribe(sub_id));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type TypeCallback = Arc<dyn Fn(&Module, ModuleType) + Send + Sync>;
type NameCallback = Arc<dyn Fn(&Module, &str) + Send + Sync>;
type StateCallback = Arc<dyn Fn(&Module, PowerState) + Send + Sync>;
type BrightnessCallback = Arc<dyn Fn(&Module, Brightness) + Send + Sync>;
type FieldCallback = Arc<dyn Fn(&Module, &FieldChange) + Send + Sync>;
type RequestCallback = Arc<dyn Fn(&Module) + Send + Sync>;
type RequestErrorCallback = Arc<dyn Fn(&Module, &str) + Send + Sync>;

type Slots<C> = RwLock<HashMap<SubscriptionId, C>>;

/// Registry for module callbacks.
///
/// Callbacks are cloned out of the registry before they run, so a callback
/// may subscribe or unsubscribe on the same module without deadlocking.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    type_callbacks: Slots<TypeCallback>,
    name_callbacks: Slots<NameCallback>,
    state_callbacks: Slots<StateCallback>,
    brightness_callbacks: Slots<BrightnessCallback>,
    field_callbacks: Slots<FieldCallback>,
    request_start_callbacks: Slots<RequestCallback>,
    request_complete_callbacks: Slots<RequestCallback>,
    request_error_callbacks: Slots<RequestErrorCallback>,
}

fn register<C>(slots: &Slots<C>, id: SubscriptionId, callback: C) -> SubscriptionId {
    slots.write().insert(id, callback);
    id
}

fn snapshot<C: Clone>(slots: &Slots<C>) -> Vec<C> {
    slots.read().values().cloned().collect()
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            type_callbacks: RwLock::new(HashMap::new()),
            name_callbacks: RwLock::new(HashMap::new()),
            state_callbacks: RwLock::new(HashMap::new()),
            brightness_callbacks: RwLock::new(HashMap::new()),
            field_callbacks: RwLock::new(HashMap::new()),
            request_start_callbacks: RwLock::new(HashMap::new()),
            request_complete_callbacks: RwLock::new(HashMap::new()),
            request_error_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for confirmed type changes.
    pub fn on_type_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, ModuleType) + Send + Sync + 'static,
    {
        register(&self.type_callbacks, self.next_id(), Arc::new(callback))
    }

    /// Registers a callback for confirmed name changes.
    pub fn on_name_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, &str) + Send + Sync + 'static,
    {
        register(&self.name_callbacks, self.next_id(), Arc::new(callback))
    }

    /// Registers a callback for confirmed power state changes.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, PowerState) + Send + Sync + 'static,
    {
        register(&self.state_callbacks, self.next_id(), Arc::new(callback))
    }

    /// Registers a callback for confirmed brightness changes.
    pub fn on_brightness_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, Brightness) + Send + Sync + 'static,
    {
        register(
            &self.brightness_callbacks,
            self.next_id(),
            Arc::new(callback),
        )
    }

    /// Registers a callback receiving every confirmed field change.
    pub fn on_field_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, &FieldChange) + Send + Sync + 'static,
    {
        register(&self.field_callbacks, self.next_id(), Arc::new(callback))
    }

    /// Registers a callback for the start of a save request.
    pub fn on_request_start<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module) + Send + Sync + 'static,
    {
        register(
            &self.request_start_callbacks,
            self.next_id(),
            Arc::new(callback),
        )
    }

    /// Registers a callback for the successful end of a save request.
    pub fn on_request_complete<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module) + Send + Sync + 'static,
    {
        register(
            &self.request_complete_callbacks,
            self.next_id(),
            Arc::new(callback),
        )
    }

    /// Registers a callback for a failed save request.
    ///
    /// The callback receives the failure reason.
    pub fn on_request_error<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, &str) + Send + Sync + 'static,
    {
        register(
            &self.request_error_callbacks,
            self.next_id(),
            Arc::new(callback),
        )
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.type_callbacks.write().remove(&id).is_some()
            || self.name_callbacks.write().remove(&id).is_some()
            || self.state_callbacks.write().remove(&id).is_some()
            || self.brightness_callbacks.write().remove(&id).is_some()
            || self.field_callbacks.write().remove(&id).is_some()
            || self.request_start_callbacks.write().remove(&id).is_some()
            || self.request_complete_callbacks.write().remove(&id).is_some()
            || self.request_error_callbacks.write().remove(&id).is_some()
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches one field change to the generic and field-specific
    /// callbacks.
    pub fn dispatch(&self, module: &Module, change: &FieldChange) {
        for callback in snapshot(&self.field_callbacks) {
            callback(module, change);
        }

        match change {
            FieldChange::Type(module_type) => {
                for callback in snapshot(&self.type_callbacks) {
                    callback(module, *module_type);
                }
            }
            FieldChange::Name(name) => {
                for callback in snapshot(&self.name_callbacks) {
                    callback(module, name);
                }
            }
            FieldChange::State(state) => {
                for callback in snapshot(&self.state_callbacks) {
                    callback(module, *state);
                }
            }
            FieldChange::Brightness(brightness) => {
                for callback in snapshot(&self.brightness_callbacks) {
                    callback(module, *brightness);
                }
            }
        }
    }

    /// Dispatches the start of a save request.
    pub fn dispatch_request_start(&self, module: &Module) {
        for callback in snapshot(&self.request_start_callbacks) {
            callback(module);
        }
    }

    /// Dispatches the successful end of a save request.
    pub fn dispatch_request_complete(&self, module: &Module) {
        for callback in snapshot(&self.request_complete_callbacks) {
            callback(module);
        }
    }

    /// Dispatches a failed save request.
    pub fn dispatch_request_error(&self, module: &Module, reason: &str) {
        for callback in snapshot(&self.request_error_callbacks) {
            callback(module, reason);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.type_callbacks.read().len()
            + self.name_callbacks.read().len()
            + self.state_callbacks.read().len()
            + self.brightness_callbacks.read().len()
            + self.field_callbacks.read().len()
            + self.request_start_callbacks.read().len()
            + self.request_complete_callbacks.read().len()
            + self.request_error_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
