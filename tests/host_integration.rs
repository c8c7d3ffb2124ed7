// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the module host using wiremock.

use std::sync::Arc;
use std::time::Duration;

use incontrol_lib::event::{HostEvent, HostOperation};
use incontrol_lib::ordering::ModuleOrdering;
use incontrol_lib::{Error, HostConfig, HostListener, IdentityError, Module, ModuleHost, ModuleId};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn host_for(server: &MockServer) -> ModuleHost {
    ModuleHost::new(
        HostConfig::new(server.address().ip().to_string()).with_port(server.address().port()),
    )
}

fn module_json(house: &str, unit: u8, name: &str) -> Value {
    json!({
        "house": house,
        "unit": unit,
        "url": format!("/{house}/{unit}/"),
        "type": 1,
        "name": name,
        "on": false
    })
}

async fn mount_list(server: &MockServer, modules: Vec<Value>, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "module": modules })));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

async fn next_event(rx: &mut broadcast::Receiver<HostEvent>) -> HostEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no event within 5s")
        .expect("event bus closed")
}

fn describe(event: &HostEvent) -> String {
    match event {
        HostEvent::RequestStarted { operation } => format!("start {operation}"),
        HostEvent::RequestCompleted { operation } => format!("complete {operation}"),
        HostEvent::RequestFailed { operation, .. } => format!("fail {operation}"),
        HostEvent::ModuleAdded { module } => format!("added {}", module.address()),
        HostEvent::ModuleChanged { module } => format!("changed {}", module.address()),
        HostEvent::ModuleDeleted { module } => format!("deleted {}", module.address()),
    }
}

fn drain(rx: &mut broadcast::Receiver<HostEvent>) -> Vec<String> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(describe(&event));
    }
    events
}

// ============================================================================
// Refresh Tests
// ============================================================================

mod refresh {
    use super::*;

    #[tokio::test]
    async fn reconcile_against_controller_list() {
        let mock_server = MockServer::start().await;
        mount_list(
            &mock_server,
            vec![
                module_json("C", 3, "Tv"),
                module_json("A", 1, "Lamp"),
                module_json("B", 2, "Fan"),
            ],
            Some(1),
        )
        .await;
        mount_list(
            &mock_server,
            vec![
                module_json("D", 4, "Porch"),
                module_json("A", 1, "Desk lamp"),
                module_json("C", 3, "Tv"),
            ],
            None,
        )
        .await;

        let host = host_for(&mock_server);
        let mut rx = host.subscribe();

        let first = host.refresh().await.unwrap();
        assert_eq!(first.added, 3);
        assert_eq!(
            drain(&mut rx),
            [
                "start refresh",
                "added A1",
                "added B2",
                "added C3",
                "complete refresh"
            ]
        );

        let a1 = host.module(&ModuleId::from_path("/A/1/")).unwrap();
        let second = host.refresh().await.unwrap();

        assert_eq!((second.added, second.changed, second.deleted), (1, 1, 1));
        assert_eq!(
            drain(&mut rx),
            [
                "start refresh",
                "deleted B2",
                "changed A1",
                "added D4",
                "complete refresh"
            ]
        );

        let modules = host.get_modules();
        let addresses: Vec<String> = modules.iter().map(|m| m.address().to_string()).collect();
        assert_eq!(addresses, ["A1", "C3", "D4"]);
        // The owned instance survives and carries the new name
        assert!(Arc::ptr_eq(&a1, &modules[0]));
        assert_eq!(a1.name(), "Desk lamp");
        assert!(host.last_refresh().is_some());
    }

    #[tokio::test]
    async fn refresh_is_idempotent() {
        let mock_server = MockServer::start().await;
        mount_list(
            &mock_server,
            vec![module_json("A", 1, "Lamp"), module_json("B", 2, "Fan")],
            None,
        )
        .await;

        let host = host_for(&mock_server);
        host.refresh().await.unwrap();

        let calls = Arc::new(Mutex::new(0_u32));
        for module in host.get_modules() {
            let calls = calls.clone();
            module.on_field_changed(move |_, _| *calls.lock() += 1);
        }

        let mut rx = host.subscribe();
        let summary = host.refresh().await.unwrap();

        assert!(summary.is_empty());
        assert_eq!(drain(&mut rx), ["start refresh", "complete refresh"]);
        assert_eq!(*calls.lock(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_collection_untouched() {
        let mock_server = MockServer::start().await;
        mount_list(&mock_server, vec![module_json("A", 1, "Lamp")], Some(1)).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let host = host_for(&mock_server);
        host.refresh().await.unwrap();
        let before = host.last_refresh();

        let mut rx = host.subscribe();
        assert!(host.refresh().await.is_err());

        assert_eq!(drain(&mut rx), ["start refresh", "fail refresh"]);
        assert_eq!(host.len(), 1);
        assert_eq!(host.last_refresh(), before);
    }

    #[tokio::test]
    async fn invalid_entry_fails_whole_refresh() {
        let mock_server = MockServer::start().await;
        mount_list(
            &mock_server,
            vec![
                module_json("A", 1, "Lamp"),
                json!({"house": "A", "unit": 20, "url": "/A/20/"}),
            ],
            None,
        )
        .await;

        let host = host_for(&mock_server);
        let result = host.refresh().await;

        assert!(matches!(
            result,
            Err(Error::InvalidIdentity(IdentityError::InvalidUnit(20)))
        ));
        assert!(host.is_empty());
    }

    #[tokio::test]
    async fn empty_body_changes_nothing() {
        let mock_server = MockServer::start().await;
        mount_list(&mock_server, vec![module_json("A", 1, "Lamp")], Some(1)).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let host = host_for(&mock_server);
        host.refresh().await.unwrap();

        let mut rx = host.subscribe();
        let summary = host.refresh().await.unwrap();

        assert!(summary.is_empty());
        assert_eq!(host.len(), 1);
        assert_eq!(drain(&mut rx), ["start refresh", "complete refresh"]);
    }

    #[tokio::test]
    async fn reconciled_modules_follow_active_ordering() {
        let mock_server = MockServer::start().await;
        mount_list(
            &mock_server,
            vec![
                module_json("A", 2, "Zeta"),
                module_json("B", 1, "Alpha"),
                module_json("A", 1, "Mu"),
            ],
            None,
        )
        .await;

        let host = host_for(&mock_server);
        host.set_ordering(ModuleOrdering::Name);
        let mut rx = host.subscribe();
        host.refresh().await.unwrap();

        assert_eq!(
            drain(&mut rx),
            [
                "start refresh",
                "added B1",
                "added A1",
                "added A2",
                "complete refresh"
            ]
        );

        host.set_ordering(ModuleOrdering::HouseUnit);
        let addresses: Vec<String> = host
            .get_modules()
            .iter()
            .map(|m| m.address().to_string())
            .collect();
        assert_eq!(addresses, ["A1", "A2", "B1"]);
    }

    #[tokio::test]
    async fn get_modules_on_empty_host_refreshes_once() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"module": [module_json("A", 1, "Lamp")]}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let host = host_for(&mock_server);
        let mut rx = host.subscribe();

        assert!(host.get_modules().is_empty());
        assert!(host.get_modules().is_empty());

        loop {
            if let HostEvent::RequestCompleted { .. } = next_event(&mut rx).await {
                break;
            }
        }

        assert_eq!(host.get_modules().len(), 1);
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn spawned_refreshes_are_serialized() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"module": [module_json("A", 1, "Lamp")]}))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let host = host_for(&mock_server);
        let mut rx = host.subscribe();

        let first = host.spawn_refresh();
        let second = host.spawn_refresh();
        let summaries = [first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];

        assert_eq!(summaries.iter().map(|s| s.added).sum::<usize>(), 1);
        let events = drain(&mut rx);
        let starts: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| *e == "start refresh")
            .map(|(i, _)| i)
            .collect();
        let completes: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| *e == "complete refresh")
            .map(|(i, _)| i)
            .collect();
        // The second refresh only starts after the first completed
        assert!(completes[0] < starts[1]);
    }
}

// ============================================================================
// Delete Tests
// ============================================================================

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_is_optimistic() {
        let mock_server = MockServer::start().await;
        mount_list(&mock_server, vec![module_json("A", 1, "Lamp")], None).await;
        Mock::given(method("DELETE"))
            .and(path("/A/1/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let host = host_for(&mock_server);
        host.refresh().await.unwrap();
        let module = host.module(&ModuleId::from_path("/A/1/")).unwrap();
        let mut rx = host.subscribe();

        let handle = host.delete_module(&module).unwrap();

        // Visible before the remote call resolves
        assert!(host.module(module.id()).is_none());
        assert_eq!(describe(&next_event(&mut rx).await), "deleted A1");
        assert!(!handle.is_finished());

        assert!(handle.await.unwrap());
        assert_eq!(drain(&mut rx), ["start delete", "complete delete"]);
    }

    #[tokio::test]
    async fn failed_remote_delete_does_not_restore() {
        let mock_server = MockServer::start().await;
        mount_list(&mock_server, vec![module_json("B", 2, "Fan")], None).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let host = host_for(&mock_server);
        host.refresh().await.unwrap();
        let module = host.module(&ModuleId::from_path("/B/2/")).unwrap();
        let mut rx = host.subscribe();

        assert!(!host.delete_module(&module).unwrap().await.unwrap());

        assert!(host.is_empty());
        assert_eq!(drain(&mut rx), ["deleted B2", "start delete", "fail delete"]);
    }

    #[tokio::test]
    async fn deleting_unowned_module_still_calls_controller() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/P/16/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let host = host_for(&mock_server);
        let mut rx = host.subscribe();

        let stranger = Module::new('P', 16).unwrap();
        assert!(!host.delete_module(&stranger).unwrap().await.unwrap());
        assert_eq!(drain(&mut rx), ["start delete", "complete delete"]);
    }
}

// ============================================================================
// Listener Tests
// ============================================================================

mod listener {
    use super::*;

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl HostListener for Recorder {
        fn on_request_complete(&self, operation: HostOperation) {
            self.calls.lock().push(format!("complete {operation}"));
        }

        fn on_module_added(&self, module: &Arc<Module>) {
            self.calls.lock().push(format!("added {}", module.address()));
        }
    }

    #[tokio::test]
    async fn listener_receives_refresh_events() {
        let mock_server = MockServer::start().await;
        mount_list(&mock_server, vec![module_json("A", 1, "Lamp")], None).await;

        let host = host_for(&mock_server);
        let recorder = Recorder::default();
        let listener = host.listen(recorder.clone());

        host.refresh().await.unwrap();
        drop(host);
        listener.await.unwrap();

        assert_eq!(*recorder.calls.lock(), vec!["added A1", "complete refresh"]);
    }
}
