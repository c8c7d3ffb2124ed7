// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The module entity.
//!
//! A [`Module`] tracks every mutable field twice: the *persisted* value last
//! confirmed by the controller and the *working* value edited locally.
//! Setters only touch the working copy. [`Module::save`] posts the fields
//! that differ, [`Module::revert`] throws local edits away, and
//! [`Module::update`] merges confirmed values and notifies subscribers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::protocol::{HttpTransport, ModuleDocument};
use crate::state::{DirtyFields, FieldChange, ModuleSnapshot};
use crate::subscription::{CallbackRegistry, SubscriptionId};
use crate::types::{
    Brightness, HouseCode, ModuleAddress, ModuleId, ModuleType, PowerState, UnitCode,
};

#[derive(Debug, Clone, Default)]
struct Fields {
    persisted: ModuleSnapshot,
    working: ModuleSnapshot,
}

/// One addressable X10 module.
///
/// Modules are shared as `Arc<Module>`; all methods take `&self`. Two modules
/// are equal exactly when their resource paths are equal, whatever their
/// field values.
///
/// # Examples
///
/// ```
/// use incontrol_lib::Module;
/// use incontrol_lib::types::{ModuleType, PowerState};
///
/// let module = Module::new('b', 4).unwrap();
/// assert_eq!(module.id().as_str(), "/B/4/");
///
/// module.set_type(ModuleType::Appliance);
/// module.set_state(PowerState::On);
/// assert_eq!(module.dirty_fields().len(), 2);
///
/// module.revert();
/// assert!(!module.is_dirty());
/// ```
pub struct Module {
    id: ModuleId,
    address: ModuleAddress,
    fields: RwLock<Fields>,
    update_gate: Mutex<()>,
    transport: RwLock<Option<Arc<HttpTransport>>>,
    callbacks: CallbackRegistry,
}

impl Module {
    // ========== Construction ==========

    /// Creates a fresh, unbound module.
    ///
    /// The house letter is case-insensitive. All fields start unknown and
    /// the name is empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidIdentity` if the house is not `A`-`P` or the
    /// unit is not 1-16.
    pub fn new(house: char, unit: u8) -> Result<Self> {
        Ok(Self::from_address(ModuleAddress::new(house, unit)?))
    }

    /// Creates a fresh, unbound module from a validated address.
    #[must_use]
    pub fn from_address(address: ModuleAddress) -> Self {
        Self::build(ModuleId::from(address), address, ModuleSnapshot::default())
    }

    /// Creates an unbound module from a controller document.
    ///
    /// Both snapshots start from the document values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidIdentity` if the reported house or unit is out
    /// of range.
    pub fn from_document(document: &ModuleDocument) -> Result<Self> {
        let address = document.address()?;
        let snapshot = document.snapshot()?;
        Ok(Self::build(document.id(), address, snapshot))
    }

    fn build(id: ModuleId, address: ModuleAddress, snapshot: ModuleSnapshot) -> Self {
        Self {
            id,
            address,
            fields: RwLock::new(Fields {
                persisted: snapshot.clone(),
                working: snapshot,
            }),
            update_gate: Mutex::new(()),
            transport: RwLock::new(None),
            callbacks: CallbackRegistry::new(),
        }
    }

    /// Binds the module to the transport of its owning host.
    pub(crate) fn bind(&self, transport: Arc<HttpTransport>) {
        *self.transport.write() = Some(transport);
    }

    // ========== Identity ==========

    /// Returns the module identity (its resource path).
    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Returns the module address.
    #[must_use]
    pub fn address(&self) -> ModuleAddress {
        self.address
    }

    /// Returns the house code.
    #[must_use]
    pub fn house(&self) -> HouseCode {
        self.address.house()
    }

    /// Returns the unit code.
    #[must_use]
    pub fn unit(&self) -> UnitCode {
        self.address.unit()
    }

    /// Returns `true` once the module is owned by a host.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.transport.read().is_some()
    }

    // ========== Working values ==========

    /// Returns the working module type.
    #[must_use]
    pub fn module_type(&self) -> ModuleType {
        self.fields.read().working.module_type
    }

    /// Returns the working name.
    #[must_use]
    pub fn name(&self) -> String {
        self.fields.read().working.name.clone()
    }

    /// Returns the working power state.
    #[must_use]
    pub fn state(&self) -> PowerState {
        self.fields.read().working.state
    }

    /// Returns the working brightness.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.fields.read().working.brightness
    }

    /// Returns a copy of the working snapshot.
    #[must_use]
    pub fn working(&self) -> ModuleSnapshot {
        self.fields.read().working.clone()
    }

    /// Returns a copy of the persisted snapshot.
    #[must_use]
    pub fn persisted(&self) -> ModuleSnapshot {
        self.fields.read().persisted.clone()
    }

    /// Returns the fields with unsaved local edits.
    #[must_use]
    pub fn dirty_fields(&self) -> DirtyFields {
        let fields = self.fields.read();
        DirtyFields::between(&fields.persisted, &fields.working)
    }

    /// Returns `true` if a save would send anything.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty_fields().is_empty()
    }

    // ========== Local edits ==========

    /// Sets the working module type.
    pub fn set_type(&self, module_type: ModuleType) {
        self.fields.write().working.module_type = module_type;
    }

    /// Sets the working module type from its wire ordinal.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the ordinal is not 0-3.
    pub fn set_type_ordinal(&self, ordinal: u8) -> Result<()> {
        self.set_type(ModuleType::from_ordinal(ordinal)?);
        Ok(())
    }

    /// Sets the working name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.fields.write().working.name = name.into();
    }

    /// Sets the working power state.
    ///
    /// `PowerState::Unknown` is ignored.
    pub fn set_state(&self, state: PowerState) {
        if state.is_known() {
            self.fields.write().working.state = state;
        }
    }

    /// Sets the working brightness.
    pub fn set_brightness(&self, brightness: Brightness) {
        self.fields.write().working.brightness = brightness;
    }

    /// Discards local edits. No request is sent and no callback fires.
    pub fn revert(&self) {
        let mut fields = self.fields.write();
        fields.working = fields.persisted.clone();
    }

    // ========== Confirmed changes ==========

    /// Merges confirmed values into both snapshots.
    ///
    /// Every field that differs from the persisted value is written to both
    /// copies and reported to its callbacks, one callback per changed field.
    /// Returns `true` if anything changed.
    ///
    /// Merges on one module are serialized. Callbacks run after the field
    /// lock is released and may read the module, but must not call `update`
    /// on it.
    pub fn update(&self, snapshot: &ModuleSnapshot) -> bool {
        let _gate = self.update_gate.lock();

        let changes = {
            let mut fields = self.fields.write();
            let changes = fields.persisted.changes_to(snapshot);
            for change in &changes {
                fields.persisted.apply(change);
                fields.working.apply(change);
            }
            changes
        };

        if changes.is_empty() {
            return false;
        }

        tracing::debug!(
            module = %self.id,
            fields = ?changes.iter().map(FieldChange::field_name).collect::<Vec<_>>(),
            "Module updated"
        );

        for change in &changes {
            self.callbacks.dispatch(self, change);
        }
        true
    }

    /// Merges a controller document, see [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidIdentity` if the document address is invalid.
    pub fn update_from_document(&self, document: &ModuleDocument) -> Result<bool> {
        Ok(self.update(&document.snapshot()?))
    }

    fn adopt_persisted(&self) {
        self.revert();
    }

    // ========== Save ==========

    /// Posts the dirty fields to the controller.
    ///
    /// Returns `Ok(false)` without any request if nothing is dirty. On
    /// success the returned document is merged with [`update`](Self::update)
    /// and the working copy adopts the persisted one. Request callbacks
    /// report start, completion and failure.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the module is not owned by a host,
    /// and transport or parse errors if the request fails. Local state is
    /// unchanged on failure.
    pub async fn save(&self) -> Result<bool> {
        let transport = self.bound_transport()?;
        let dirty = self.dirty_fields();
        if dirty.is_empty() {
            return Ok(false);
        }
        self.post(&transport, &dirty).await
    }

    /// Runs [`save`](Self::save) on a background task.
    ///
    /// The binding and dirty checks run immediately. Returns `Ok(None)` if
    /// nothing is dirty, otherwise the handle of the task, which yields
    /// whether the merge changed anything. Failures are reported through
    /// [`on_request_error`](Self::on_request_error) callbacks.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the module is not owned by a host
    /// or if no tokio runtime is running.
    pub fn spawn_save(self: &Arc<Self>) -> Result<Option<JoinHandle<bool>>> {
        let transport = self.bound_transport()?;
        let dirty = self.dirty_fields();
        if dirty.is_empty() {
            return Ok(None);
        }

        let handle = Handle::try_current()
            .map_err(|e| Error::Configuration(format!("no tokio runtime: {e}")))?;
        let module = Arc::clone(self);
        Ok(Some(handle.spawn(async move {
            module.post(&transport, &dirty).await.unwrap_or(false)
        })))
    }

    /// Returns the transport of the owning host.
    pub(crate) fn transport(&self) -> Option<Arc<HttpTransport>> {
        self.transport.read().clone()
    }

    fn bound_transport(&self) -> Result<Arc<HttpTransport>> {
        self.transport().ok_or_else(|| {
            Error::Configuration(format!(
                "module {} is not owned by a host and cannot be saved",
                self.id
            ))
        })
    }

    async fn post(&self, transport: &HttpTransport, dirty: &DirtyFields) -> Result<bool> {
        tracing::debug!(module = %self.id, fields = dirty.len(), "Saving module");
        self.callbacks.dispatch_request_start(self);

        let result = match transport.post_partial(self.id.as_str(), dirty).await {
            Ok(Some(document)) => self.update_from_document(&document).map(|changed| {
                self.adopt_persisted();
                changed
            }),
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => self.callbacks.dispatch_request_complete(self),
            Err(e) => {
                tracing::warn!(module = %self.id, error = %e, "Save failed");
                self.callbacks.dispatch_request_error(self, &e.to_string());
            }
        }
        result
    }

    // ========== Subscriptions ==========

    /// Subscribes to confirmed type changes.
    pub fn on_type_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, ModuleType) + Send + Sync + 'static,
    {
        self.callbacks.on_type_changed(callback)
    }

    /// Subscribes to confirmed name changes.
    pub fn on_name_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, &str) + Send + Sync + 'static,
    {
        self.callbacks.on_name_changed(callback)
    }

    /// Subscribes to confirmed power state changes.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, PowerState) + Send + Sync + 'static,
    {
        self.callbacks.on_state_changed(callback)
    }

    /// Subscribes to confirmed brightness changes.
    pub fn on_brightness_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, Brightness) + Send + Sync + 'static,
    {
        self.callbacks.on_brightness_changed(callback)
    }

    /// Subscribes to every confirmed field change.
    pub fn on_field_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, &FieldChange) + Send + Sync + 'static,
    {
        self.callbacks.on_field_changed(callback)
    }

    /// Subscribes to the start of save requests.
    pub fn on_request_start<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module) + Send + Sync + 'static,
    {
        self.callbacks.on_request_start(callback)
    }

    /// Subscribes to successfully completed save requests.
    pub fn on_request_complete<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module) + Send + Sync + 'static,
    {
        self.callbacks.on_request_complete(callback)
    }

    /// Subscribes to failed save requests.
    pub fn on_request_error<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Module, &str) + Send + Sync + 'static,
    {
        self.callbacks.on_request_error(callback)
    }

    /// Removes a subscription. Returns `true` if it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Module {}

impl Hash for Module {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.read();
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("persisted", &fields.persisted)
            .field("working", &fields.working)
            .field("bound", &self.is_bound())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.fields.read().working.name)
    }
}
