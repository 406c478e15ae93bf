#![allow(clippy::unwrap_used)]
// Integration tests for DeviceStore using wiremock.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use camfleet_api::{ApiClient, TokenStore};
use camfleet_core::{DeviceStore, DeviceUpdate, NewDevice};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviceStore) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set("test-token");
    let api = ApiClient::with_client(reqwest::Client::new(), base_url, tokens);
    (server, DeviceStore::new(api))
}

fn device_json(id: i64, region: &str, ip: &str) -> serde_json::Value {
    json!({
        "id": id,
        "region": region,
        "store": "store-1",
        "ip": ip,
        "port": 554,
        "user": "viewer",
        "pwd": "secret",
        "chs": 4,
        "name": format!("cam-{id}"),
        "status": "online",
        "protocol": "rtsp",
        "created_at": "2024-06-15T10:30:00"
    })
}

fn new_device() -> NewDevice {
    NewDevice {
        region: "north".into(),
        store: "store-1".into(),
        ip: "10.0.0.8".into(),
        port: Some(554),
        user: "viewer".into(),
        pwd: "secret".into(),
        chs: 4,
        name: None,
        protocol: None,
    }
}

// ── Fetch tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_devices_replaces_cache_in_server_order() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            device_json(2, "north", "10.0.0.2"),
            device_json(1, "south", "10.0.0.1"),
        ])))
        .mount(&server)
        .await;

    let count = store.refresh_devices().await.unwrap();
    assert_eq!(count, 2);

    let snapshot = store.devices_snapshot();
    assert_eq!(snapshot[0].id, 2);
    assert_eq!(snapshot[1].id, 1);
    assert!(snapshot[0].is_online());

    assert_eq!(store.device_by_id(1).unwrap().region, "south");
    assert_eq!(store.device_by_id(99), None);
    assert_eq!(store.devices_in_region("north").len(), 1);
}

#[tokio::test]
async fn test_refresh_regions() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["north", "south"])))
        .mount(&server)
        .await;

    assert_eq!(store.refresh_regions().await.unwrap(), 2);
    let regions = store.regions_snapshot();
    assert_eq!(regions[0].name(), "north");
}

#[tokio::test]
async fn test_tolerates_minimal_device_records() {
    let (server, store) = setup().await;

    // status/protocol/created_at may be absent on fresh rows.
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "region": "north",
            "store": "store-1",
            "ip": "10.0.0.1",
            "port": null,
            "user": "viewer",
            "pwd": "secret",
            "chs": 1,
            "name": "cam-1"
        }])))
        .mount(&server)
        .await;

    store.refresh_devices().await.unwrap();
    let device = store.device_by_id(1).unwrap();
    assert_eq!(device.protocol, "rtsp");
    assert_eq!(device.status, None);
    assert!(!device.is_online());
}

#[tokio::test]
async fn test_stats() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total": 5, "online": 3, "offline": 2})),
        )
        .mount(&server)
        .await;

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.online, 3);
}

#[tokio::test]
async fn test_check_status() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/7/check-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_id": 7,
            "name": "cam-7",
            "ip": "10.0.0.7",
            "status": "online",
            "is_online": true,
            "checked_at": "2024-06-15T10:30:00"
        })))
        .mount(&server)
        .await;

    let check = store.check_status(7).await.unwrap();
    assert!(check.is_online);
    assert_eq!(check.status, "online");
}

#[tokio::test]
async fn test_check_all_sweeps_the_fleet_and_refreshes_the_cache() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/check-all-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "checked_devices": 2,
            "online_devices": 1,
            "offline_devices": 1,
            "results": [
                {
                    "device_id": 1,
                    "name": "cam-1",
                    "ip": "10.0.0.1",
                    "status": "online",
                    "is_online": true,
                    "checked_at": "2024-06-15T10:30:00"
                },
                {
                    "device_id": 2,
                    "name": "cam-2",
                    "ip": "10.0.0.2",
                    "status": "offline",
                    "is_online": false,
                    "checked_at": "2024-06-15T10:30:00"
                }
            ],
            "checked_at": "2024-06-15T10:30:00",
            "online_rate": 50.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The sweep updated statuses server-side; the cache follows.
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([device_json(1, "north", "10.0.0.1")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = store.check_all().await.unwrap();
    assert_eq!(report.checked_devices, 2);
    assert_eq!(report.online_devices, 1);
    assert_eq!(report.results.len(), 2);
    assert!(!report.results[1].is_online);
    assert_eq!(store.devices_snapshot().len(), 1);
}

// ── Mutation tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_import_refetches_the_collection() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/import"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "device_id": 3})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([device_json(3, "north", "10.0.0.8")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = store.import_device(&new_device()).await;
    assert!(outcome.success);
    assert_eq!(store.devices_snapshot().len(), 1);
}

#[tokio::test]
async fn test_import_failure_surfaces_server_detail() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/import"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "IP address already exists"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = store.import_device(&new_device()).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("IP address already exists"));
}

#[tokio::test]
async fn test_update_refetches_and_maps_detail() {
    let (server, store) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/devices/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([device_json(5, "east", "10.0.0.5")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let update = DeviceUpdate {
        region: Some("east".into()),
        ..DeviceUpdate::default()
    };
    let outcome = store.update_device(5, &update).await;

    assert!(outcome.success);
    assert_eq!(store.device_by_id(5).unwrap().region, "east");
}

#[tokio::test]
async fn test_delete_failure_uses_default_message_without_detail() {
    let (server, store) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/devices/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = store.delete_device(9).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("Delete failed"));
}

#[tokio::test]
async fn test_failed_refetch_after_mutation_keeps_success_outcome() {
    let (server, store) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/devices/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // The delete committed server-side; a stale cache is not a failure.
    let outcome = store.delete_device(9).await;
    assert!(outcome.success);
}
