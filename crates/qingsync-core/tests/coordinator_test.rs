// End-to-end coordinator tests against a mocked cloud: poll refresh,
// poll failure, and push ingestion converging on one store.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use qingsync_core::{
    Coordinator, DeviceMac, PushError, PushOutcome, SyncConfig, SyncEvent, is_available,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn coordinator_against(server: &MockServer) -> Coordinator {
    let mut config = SyncConfig::new("test-key", SecretString::from("test-secret"));
    config.timeout = Duration::from_secs(5);
    config.api_url = Some(server.uri().parse().expect("mock uri parses"));
    config.auth_url = Some(server.uri().parse().expect("mock uri parses"));
    Coordinator::new(config).expect("coordinator should build")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "expires_in": 7200
        })))
        .mount(server)
        .await;
}

async fn mount_devices(server: &MockServer, devices: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/apis/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": devices.as_array().map_or(0, Vec::len),
            "devices": devices
        })))
        .mount(server)
        .await;
}

fn sensor_record(mac: &str, data: serde_json::Value) -> serde_json::Value {
    json!({
        "info": {
            "mac": mac,
            "name": format!("Sensor {mac}"),
            "version": "1.2.6",
            "status": {"offline": false},
            "setting": {"report_interval": 60, "collect_interval": 60},
            "product": {"en_name": "Air Monitor"}
        },
        "data": data
    })
}

// ── Poll path ───────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_populates_store_with_poll_values() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_devices(
        &server,
        json!([
            sensor_record("AABBCCDDEE01", json!({
                "timestamp": {"value": 1_700_000_000},
                "temperature": {"value": 21.5, "status": 0},
                "humidity": {"value": 45.2, "status": 0}
            })),
            sensor_record("AABBCCDDEE02", json!({
                "timestamp": {"value": 1_700_000_000},
                "co2": {"value": 1240, "status": 0}
            })),
        ]),
    )
    .await;

    let coordinator = coordinator_against(&server);
    let mut events = coordinator.events();

    coordinator.refresh().await.expect("refresh should succeed");

    let store = coordinator.store();
    assert_eq!(store.device_count(), 2);
    assert!(store.last_poll_ok());

    // Every attribute from the poll is retrievable by identity lookup.
    let one = store
        .find_device_by_mac(&DeviceMac::new("AABBCCDDEE01"))
        .expect("device present");
    assert_eq!(one.property("temperature").expect("reported").value, Some(json!(21.5)));
    assert_eq!(one.property("humidity").expect("reported").value, Some(json!(45.2)));
    let two = store
        .find_device_by_mac(&DeviceMac::new("AABBCCDDEE02"))
        .expect("device present");
    assert_eq!(two.property("co2").expect("reported").value, Some(json!(1240)));

    match events.try_recv().expect("event emitted") {
        SyncEvent::Refreshed { device_count } => assert_eq!(device_count, 2),
        other => panic!("expected Refreshed, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_poll_retains_snapshot_and_blankets_availability() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_devices(
        &server,
        json!([
            sensor_record("AABBCCDDEE01", json!({
                "timestamp": {"value": chrono::Utc::now().timestamp()},
                "temperature": {"value": 21.5, "status": 0}
            })),
            sensor_record("AABBCCDDEE02", json!({
                "timestamp": {"value": chrono::Utc::now().timestamp()},
                "battery": {"value": 90, "status": 0}
            })),
        ]),
    )
    .await;

    let coordinator = coordinator_against(&server);
    coordinator.refresh().await.expect("seed refresh succeeds");

    // Swap the device endpoint for a server error and poll again.
    server.reset().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/apis/devices"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "upstream unavailable"
        })))
        .mount(&server)
        .await;

    let mut events = coordinator.events();
    coordinator
        .refresh()
        .await
        .expect_err("failed poll must report an error");

    let store = coordinator.store();
    // Previous snapshot intact, in order.
    let snap = store.snapshot();
    assert_eq!(snap.devices.len(), 2);
    assert_eq!(snap.devices[0].mac.as_str(), "AABBCCDDEE01");
    assert_eq!(snap.devices[1].mac.as_str(), "AABBCCDDEE02");

    // Structured failure surfaced to subscribers, not a crash.
    match events.try_recv().expect("failure event emitted") {
        SyncEvent::RefreshFailed { reason } => {
            assert!(reason.contains("upstream unavailable"), "reason: {reason}");
        }
        other => panic!("expected RefreshFailed, got {other:?}"),
    }

    // Fresh readings are still blanket-unavailable while the pull path
    // is broken.
    let device = store
        .find_device_by_mac(&DeviceMac::new("AABBCCDDEE01"))
        .expect("device retained");
    assert!(!store.last_poll_ok());
    assert!(!is_available(
        &device,
        "temperature",
        chrono::Utc::now(),
        store.last_poll_ok()
    ));
}

#[tokio::test]
async fn auth_failure_surfaces_without_touching_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let coordinator = coordinator_against(&server);
    coordinator
        .refresh()
        .await
        .expect_err("auth failure must fail the cycle");

    assert_eq!(coordinator.store().device_count(), 0);
    assert!(!coordinator.store().last_poll_ok());
}

// ── Push path ───────────────────────────────────────────────────────

#[tokio::test]
async fn push_applies_first_frame_to_known_device() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    // Device known from the poll, with no prior temperature reading.
    mount_devices(
        &server,
        json!([sensor_record("AABBCCDDEEFF", json!({
            "timestamp": {"value": 1_700_000_000}
        }))]),
    )
    .await;

    let coordinator = coordinator_against(&server);
    coordinator.refresh().await.expect("refresh should succeed");
    let mut events = coordinator.events();

    let message = json!({
        "payload": {
            "info": {"mac": "AABBCCDDEEFF"},
            "data": [{"temperature": {"value": 21.5, "status": 0}}]
        }
    });
    let outcome = coordinator.ingest_push(&message).expect("valid message");

    assert_eq!(
        outcome,
        PushOutcome::Applied {
            mac: DeviceMac::new("AABBCCDDEEFF"),
            attributes: vec!["temperature".to_owned()],
        }
    );

    let device = coordinator
        .store()
        .find_device_by_mac(&DeviceMac::new("AABBCCDDEEFF"))
        .expect("device present");
    assert_eq!(device.property("temperature").expect("patched").value, Some(json!(21.5)));
    // Pull-owned fields untouched by push.
    assert_eq!(device.property("timestamp").expect("kept").value, Some(json!(1_700_000_000)));

    match events.try_recv().expect("event emitted") {
        SyncEvent::DeviceUpdated { mac, attributes } => {
            assert_eq!(mac, DeviceMac::new("AABBCCDDEEFF"));
            assert_eq!(attributes, vec!["temperature".to_owned()]);
        }
        other => panic!("expected DeviceUpdated, got {other:?}"),
    }
}

#[tokio::test]
async fn push_for_unknown_device_is_a_silent_drop() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_devices(&server, json!([sensor_record("AABBCCDDEE01", json!({}))])).await;

    let coordinator = coordinator_against(&server);
    coordinator.refresh().await.expect("refresh should succeed");

    let before = coordinator.store().snapshot();
    let outcome = coordinator
        .ingest_push(&json!({
            "payload": {
                "info": {"mac": "FFFFFFFFFFFF"},
                "data": [{"temperature": {"value": 1.0, "status": 0}}]
            }
        }))
        .expect("unknown mac is not an error");

    assert_eq!(
        outcome,
        PushOutcome::UnknownDevice {
            mac: DeviceMac::new("FFFFFFFFFFFF")
        }
    );
    // Deep-equal before/after: same snapshot Arc was kept.
    let after = coordinator.store().snapshot();
    assert!(std::sync::Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn malformed_push_is_rejected_and_isolated() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_devices(&server, json!([sensor_record("AABBCCDDEE01", json!({}))])).await;

    let coordinator = coordinator_against(&server);
    coordinator.refresh().await.expect("refresh should succeed");
    let before = coordinator.store().snapshot();

    // Missing mac
    let err = coordinator
        .ingest_push(&json!({"payload": {"data": [{"temperature": {"value": 1.0}}]}}))
        .expect_err("missing mac must be rejected");
    assert!(matches!(err, PushError::MissingDeviceId));

    // Missing data frames
    let err = coordinator
        .ingest_push(&json!({"payload": {"info": {"mac": "AABBCCDDEE01"}, "data": []}}))
        .expect_err("empty data must be rejected");
    assert!(matches!(err, PushError::NoDataFrames));

    // Not even the right envelope
    let err = coordinator
        .ingest_push(&json!({"something": "else"}))
        .expect_err("wrong envelope must be rejected");
    assert!(matches!(err, PushError::Malformed(_)));

    let after = coordinator.store().snapshot();
    assert!(std::sync::Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn push_is_idempotent_and_multi_frame_takes_first() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_devices(&server, json!([sensor_record("AABBCCDDEE01", json!({}))])).await;

    let coordinator = coordinator_against(&server);
    coordinator.refresh().await.expect("refresh should succeed");

    let message = json!({
        "payload": {
            "info": {"mac": "aa:bb:cc:dd:ee:01"},
            "data": [
                {"temperature": {"value": 21.5, "status": 0}},
                {"temperature": {"value": 19.0, "status": 0}}
            ]
        }
    });

    coordinator.ingest_push(&message).expect("first apply");
    let once = coordinator
        .store()
        .find_device_by_mac(&DeviceMac::new("AABBCCDDEE01"))
        .expect("device present");
    coordinator.ingest_push(&message).expect("second apply");
    let twice = coordinator
        .store()
        .find_device_by_mac(&DeviceMac::new("AABBCCDDEE01"))
        .expect("device present");

    // First frame won, and applying twice changed nothing.
    assert_eq!(once.property("temperature").expect("set").value, Some(json!(21.5)));
    assert_eq!(*once, *twice);
}
