// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The module host: owner of the module collection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::event::{EventBus, HostEvent, HostOperation};
use crate::module::Module;
use crate::ordering::ModuleOrdering;
use crate::protocol::HttpTransport;
use crate::state::ModuleSnapshot;
use crate::types::ModuleId;

use super::config::{HostConfig, duration_ms};
use super::listener::{HostListener, spawn_listener};

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Modules that joined the collection.
    pub added: usize,
    /// Modules that received confirmed changes.
    pub changed: usize,
    /// Modules that left the collection.
    pub deleted: usize,
}

impl RefreshSummary {
    /// Returns `true` if the collection did not change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.changed == 0 && self.deleted == 0
    }
}

/// A fetched module, before it is merged into the collection.
enum Reconciled {
    Added(Arc<Module>),
    Existing(Arc<Module>, ModuleSnapshot),
}

/// Owner of the module collection of one controller.
///
/// The host keeps one instance per module identity, fetches the controller
/// list on [`refresh`](Self::refresh) and reconciles it against the
/// collection. Collection changes and request life cycle are published as
/// [`HostEvent`]s.
///
/// Cloning is cheap; clones share the same collection.
///
/// # Examples
///
/// ```no_run
/// use incontrol_lib::{HostConfig, ModuleHost};
/// use incontrol_lib::event::HostEvent;
///
/// #[tokio::main]
/// async fn main() -> incontrol_lib::Result<()> {
///     let host = ModuleHost::new(HostConfig::new("192.168.1.20"));
///     let mut events = host.subscribe();
///
///     let summary = host.refresh().await?;
///     println!("{} modules added", summary.added);
///
///     for module in host.get_modules() {
///         println!("{module}");
///     }
///
///     while let Ok(event) = events.try_recv() {
///         if let HostEvent::ModuleAdded { module } = event {
///             println!("added {}", module.id());
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ModuleHost {
    inner: Arc<HostInner>,
}

struct HostInner {
    modules: RwLock<HashMap<ModuleId, Arc<Module>>>,
    transport: Arc<HttpTransport>,
    ordering: RwLock<ModuleOrdering>,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
    refresh_gate: Mutex<()>,
    implicit_refresh_pending: AtomicBool,
    event_bus: EventBus,
}

impl ModuleHost {
    /// Creates an empty host for the given configuration.
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        Self {
            inner: Arc::new(HostInner {
                modules: RwLock::new(HashMap::new()),
                transport: Arc::new(HttpTransport::new(config.http_config())),
                ordering: RwLock::new(config.ordering),
                last_refresh: RwLock::new(None),
                refresh_gate: Mutex::new(()),
                implicit_refresh_pending: AtomicBool::new(false),
                event_bus: EventBus::new(),
            }),
        }
    }

    // ========== Events ==========

    /// Subscribes to host events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.inner.event_bus.subscribe()
    }

    /// Forwards host events to a listener on a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn listen<L: HostListener>(&self, listener: L) -> JoinHandle<()> {
        spawn_listener(self.subscribe(), listener)
    }

    fn publish(&self, event: HostEvent) {
        self.inner.event_bus.publish(event);
    }

    // ========== Collection ==========

    /// Returns the modules sorted by the active ordering.
    ///
    /// If the collection is empty, one background refresh is started and the
    /// empty list is returned; the fetched modules arrive as
    /// [`HostEvent::ModuleAdded`] events.
    #[must_use]
    pub fn get_modules(&self) -> Vec<Arc<Module>> {
        let mut modules: Vec<Arc<Module>> = self.inner.modules.read().values().cloned().collect();
        if modules.is_empty() {
            self.spawn_implicit_refresh();
            return modules;
        }
        self.ordering().comparator().sort(&mut modules);
        modules
    }

    /// Returns the owned module with the given identity.
    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<Arc<Module>> {
        self.inner.modules.read().get(id).cloned()
    }

    /// Returns the number of owned modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.modules.read().len()
    }

    /// Returns `true` if the host owns no module.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.modules.read().is_empty()
    }

    /// Returns the time of the last successful refresh.
    #[must_use]
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.read()
    }

    /// Adds a module to the collection.
    ///
    /// An unseen module is bound to the host transport and inserted. For a
    /// known identity the owned instance is updated with the candidate's
    /// working values instead. Returns the owned instance.
    pub fn add_module(&self, candidate: impl Into<Arc<Module>>) -> Arc<Module> {
        let candidate = candidate.into();

        let existing = {
            let mut modules = self.inner.modules.write();
            if let Some(owned) = modules.get(candidate.id()) {
                Some(Arc::clone(owned))
            } else {
                candidate.bind(Arc::clone(&self.inner.transport));
                modules.insert(candidate.id().clone(), Arc::clone(&candidate));
                None
            }
        };

        match existing {
            Some(owned) => {
                if owned.update(&candidate.working()) {
                    self.publish(HostEvent::module_changed(Arc::clone(&owned)));
                }
                owned
            }
            None => {
                tracing::debug!(module = %candidate.id(), "Module added");
                self.publish(HostEvent::module_added(Arc::clone(&candidate)));
                candidate
            }
        }
    }

    /// Deletes a module.
    ///
    /// An owned module is removed and reported immediately. The remote
    /// delete then runs on a background task whose handle yields whether
    /// the controller removed the resource. Its outcome never restores the
    /// module locally.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if no tokio runtime is running. The
    /// collection is left untouched in that case.
    pub fn delete_module(&self, module: &Module) -> Result<JoinHandle<bool>> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Configuration(format!("no tokio runtime: {e}")))?;

        let removed = self.inner.modules.write().remove(module.id());
        if let Some(owned) = removed {
            tracing::debug!(module = %owned.id(), "Module deleted locally");
            self.publish(HostEvent::module_deleted(owned));
        }

        let host = self.clone();
        let path = module.id().as_str().to_string();
        Ok(runtime.spawn(async move { host.delete_remote(&path).await }))
    }

    async fn delete_remote(&self, path: &str) -> bool {
        self.publish(HostEvent::RequestStarted {
            operation: HostOperation::Delete,
        });

        match self.inner.transport.delete_resource(path).await {
            Ok(found) => {
                if !found {
                    tracing::debug!(path, "Controller did not know the deleted module");
                }
                self.publish(HostEvent::RequestCompleted {
                    operation: HostOperation::Delete,
                });
                found
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "Remote delete failed");
                self.publish(HostEvent::request_failed(
                    HostOperation::Delete,
                    e.to_string(),
                ));
                false
            }
        }
    }

    // ========== Refresh ==========

    /// Fetches the controller list and reconciles the collection.
    ///
    /// Concurrent refreshes are queued and run one after the other.
    ///
    /// # Errors
    ///
    /// Returns transport, parse or identity errors. The collection is left
    /// untouched and a [`HostEvent::RequestFailed`] is published.
    pub async fn refresh(&self) -> Result<RefreshSummary> {
        let _gate = self.inner.refresh_gate.lock().await;

        self.publish(HostEvent::RequestStarted {
            operation: HostOperation::Refresh,
        });

        match self.fetch_and_reconcile().await {
            Ok(summary) => {
                *self.inner.last_refresh.write() = Some(Utc::now());
                tracing::debug!(
                    added = summary.added,
                    changed = summary.changed,
                    deleted = summary.deleted,
                    "Refresh completed"
                );
                self.publish(HostEvent::RequestCompleted {
                    operation: HostOperation::Refresh,
                });
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed");
                self.publish(HostEvent::request_failed(
                    HostOperation::Refresh,
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Runs [`refresh`](Self::refresh) on a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_refresh(&self) -> JoinHandle<Result<RefreshSummary>> {
        let host = self.clone();
        tokio::spawn(async move { host.refresh().await })
    }

    fn spawn_implicit_refresh(&self) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("No tokio runtime, skipping implicit refresh");
            return;
        };
        if self
            .inner
            .implicit_refresh_pending
            .swap(true, Ordering::AcqRel)
        {
            return;
        }

        let host = self.clone();
        runtime.spawn(async move {
            // Failures are already published as events
            let _ = host.refresh().await;
            host.inner
                .implicit_refresh_pending
                .store(false, Ordering::Release);
        });
    }

    async fn fetch_and_reconcile(&self) -> Result<RefreshSummary> {
        let Some(list) = self.inner.transport.fetch_all().await? else {
            tracing::debug!("Empty module list response, nothing to reconcile");
            return Ok(RefreshSummary::default());
        };

        let mut fetched = list
            .module
            .iter()
            .map(|document| Module::from_document(document).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        self.ordering().comparator().sort(&mut fetched);

        Ok(self.reconcile(fetched))
    }

    /// Merges a sorted fetched list into the collection.
    ///
    /// The map is mutated under its lock; events and `update` callbacks run
    /// after it is released.
    fn reconcile(&self, fetched: Vec<Arc<Module>>) -> RefreshSummary {
        let (deleted, reconciled) = {
            let mut modules = self.inner.modules.write();

            let fetched_ids: HashSet<&ModuleId> = fetched.iter().map(|m| m.id()).collect();
            let stale: Vec<ModuleId> = modules
                .keys()
                .filter(|id| !fetched_ids.contains(id))
                .cloned()
                .collect();
            let mut deleted: Vec<Arc<Module>> =
                stale.iter().filter_map(|id| modules.remove(id)).collect();
            self.ordering().comparator().sort(&mut deleted);

            let mut reconciled = Vec::with_capacity(fetched.len());
            for module in &fetched {
                if let Some(owned) = modules.get(module.id()) {
                    reconciled.push(Reconciled::Existing(Arc::clone(owned), module.persisted()));
                } else {
                    module.bind(Arc::clone(&self.inner.transport));
                    modules.insert(module.id().clone(), Arc::clone(module));
                    reconciled.push(Reconciled::Added(Arc::clone(module)));
                }
            }
            (deleted, reconciled)
        };

        let mut summary = RefreshSummary {
            deleted: deleted.len(),
            ..RefreshSummary::default()
        };

        for module in deleted {
            tracing::debug!(module = %module.id(), "Module no longer reported");
            self.publish(HostEvent::module_deleted(module));
        }

        for entry in reconciled {
            match entry {
                Reconciled::Added(module) => {
                    summary.added += 1;
                    self.publish(HostEvent::module_added(module));
                }
                Reconciled::Existing(owned, snapshot) => {
                    if owned.update(&snapshot) {
                        summary.changed += 1;
                        self.publish(HostEvent::module_changed(owned));
                    }
                }
            }
        }

        summary
    }

    // ========== Configuration ==========

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> HostConfig {
        let http = self.inner.transport.config();
        HostConfig {
            domain_or_ip: http.host().to_string(),
            port: http.port(),
            username: http.username().to_string(),
            password: http.password().to_string(),
            connection_timeout_ms: duration_ms(http.connect_timeout()),
            response_timeout_ms: duration_ms(http.response_timeout()),
            ordering: self.ordering(),
        }
    }

    /// Replaces the whole configuration.
    pub fn apply_config(&self, config: &HostConfig) {
        self.inner.transport.set_config(config.http_config());
        self.set_ordering(config.ordering);
    }

    /// Sets the controller domain or IP. Scheme, path and port are stripped.
    pub fn set_domain_or_ip(&self, domain_or_ip: &str) {
        self.inner
            .transport
            .update_config(|config| config.set_host(domain_or_ip));
    }

    /// Sets the controller port.
    pub fn set_port(&self, port: u16) {
        self.inner
            .transport
            .update_config(|config| config.set_port(port));
    }

    /// Sets the basic auth user name.
    pub fn set_username(&self, username: &str) {
        self.inner
            .transport
            .update_config(|config| config.set_username(username));
    }

    /// Sets the basic auth password.
    pub fn set_password(&self, password: &str) {
        self.inner
            .transport
            .update_config(|config| config.set_password(password));
    }

    /// Sets the connection timeout.
    pub fn set_connect_timeout(&self, timeout: Duration) {
        self.inner
            .transport
            .update_config(|config| config.set_connect_timeout(timeout));
    }

    /// Sets the response timeout.
    pub fn set_response_timeout(&self, timeout: Duration) {
        self.inner
            .transport
            .update_config(|config| config.set_response_timeout(timeout));
    }

    /// Returns the active ordering.
    #[must_use]
    pub fn ordering(&self) -> ModuleOrdering {
        *self.inner.ordering.read()
    }

    /// Sets the active ordering.
    pub fn set_ordering(&self, ordering: ModuleOrdering) {
        *self.inner.ordering.write() = ordering;
    }
}

impl Default for ModuleHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl std::fmt::Debug for ModuleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHost")
            .field("base_url", &self.inner.transport.config().base_url())
            .field("modules", &self.len())
            .field("ordering", &self.ordering())
            .field("last_refresh", &self.last_refresh())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ModuleDocument, ModuleList};
    use crate::types::{ModuleAddress, PowerState};

    fn document(house: char, unit: u8, name: &str) -> ModuleDocument {
        ModuleDocument::new(ModuleAddress::new(house, unit).unwrap()).with_name(name)
    }

    fn fetched(list: &ModuleList) -> Vec<Arc<Module>> {
        list.module
            .iter()
            .map(|d| Arc::new(Module::from_document(d).unwrap()))
            .collect()
    }

    fn drain(rx: &mut broadcast::Receiver<HostEvent>) -> Vec<String> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(match event {
                HostEvent::ModuleAdded { module } => format!("added {}", module.address()),
                HostEvent::ModuleChanged { module } => format!("changed {}", module.address()),
                HostEvent::ModuleDeleted { module } => format!("deleted {}", module.address()),
                other => format!("{other:?}"),
            });
        }
        events
    }

    #[test]
    fn reconcile_adds_changes_and_deletes() {
        let host = ModuleHost::default();
        let initial = ModuleList {
            module: vec![document('A', 1, "Lamp"), document('B', 2, "Fan"), document('C', 3, "Tv")],
        };
        host.reconcile(fetched(&initial));
        let mut rx = host.subscribe();

        let next = ModuleList {
            module: vec![
                document('A', 1, "Desk lamp"),
                document('C', 3, "Tv"),
                document('D', 4, "Porch"),
            ],
        };
        let summary = host.reconcile(fetched(&next));

        assert_eq!(
            summary,
            RefreshSummary {
                added: 1,
                changed: 1,
                deleted: 1
            }
        );
        assert_eq!(drain(&mut rx), ["deleted B2", "changed A1", "added D4"]);
        let names: Vec<String> = host.get_modules().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["Desk lamp", "Tv", "Porch"]);
    }

    #[test]
    fn reconcile_keeps_owned_instances() {
        let host = ModuleHost::default();
        let list = ModuleList {
            module: vec![document('A', 1, "Lamp")],
        };
        host.reconcile(fetched(&list));
        let owned = host.module(&ModuleId::from_path("/A/1/")).unwrap();
        assert!(owned.is_bound());

        let summary = host.reconcile(fetched(&list));
        assert!(summary.is_empty());
        assert!(Arc::ptr_eq(
            &owned,
            &host.module(&ModuleId::from_path("/A/1/")).unwrap()
        ));
    }

    #[test]
    fn add_module_binds_or_updates() {
        let host = ModuleHost::default();
        let mut rx = host.subscribe();

        let first = host.add_module(Module::new('E', 5).unwrap());
        assert!(first.is_bound());

        let candidate = Module::new('e', 5).unwrap();
        candidate.set_name("Garage");
        candidate.set_state(PowerState::Off);
        let owned = host.add_module(candidate);

        assert!(Arc::ptr_eq(&first, &owned));
        assert_eq!(owned.name(), "Garage");
        assert_eq!(owned.persisted().state, PowerState::Off);
        assert_eq!(host.len(), 1);
        assert_eq!(drain(&mut rx), ["added E5", "changed E5"]);

        // Same values again: no event
        let again = Module::new('E', 5).unwrap();
        again.set_name("Garage");
        again.set_state(PowerState::Off);
        host.add_module(again);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn get_modules_without_runtime_returns_empty() {
        let host = ModuleHost::default();
        assert!(host.get_modules().is_empty());
        assert!(host.is_empty());
    }

    #[test]
    fn delete_without_runtime_keeps_module() {
        let host = ModuleHost::default();
        let module = host.add_module(Module::new('A', 1).unwrap());
        let mut rx = host.subscribe();

        let result = host.delete_module(&module);

        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(host.module(module.id()).is_some());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn config_setters_round_trip() {
        let host = ModuleHost::default();
        host.set_domain_or_ip("http://controller.local/");
        host.set_port(8080);
        host.set_username("admin");
        host.set_password("secret");
        host.set_connect_timeout(Duration::from_millis(1500));
        host.set_response_timeout(Duration::from_millis(2500));
        host.set_ordering(ModuleOrdering::TypeName);

        let config = host.config();
        assert_eq!(config.domain_or_ip, "controller.local");
        assert_eq!(config.port, 8080);
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.connection_timeout_ms, 1500);
        assert_eq!(config.response_timeout_ms, 2500);
        assert_eq!(config.ordering, ModuleOrdering::TypeName);

        host.apply_config(&HostConfig::new("10.0.0.1"));
        assert_eq!(host.config(), HostConfig::new("10.0.0.1"));
    }

    #[test]
    fn modules_share_host_transport() {
        let host = ModuleHost::new(HostConfig::new("old.local"));
        let module = host.add_module(Module::new('A', 1).unwrap());
        host.set_domain_or_ip("new.local");

        let transport = module.transport().unwrap();
        assert_eq!(transport.config().host(), "new.local");
    }
}
