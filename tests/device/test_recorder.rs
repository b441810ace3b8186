//! Device session recorder against the API stand-in

use crate::common::{memory_store, spawn_server};
use rojifi_session::api::{ApiClient, ApiConfig};
use rojifi_session::crypto::{decrypt, generate, local_key};
use rojifi_session::device::{
    DeviceAttributes, DeviceType, GeoLocation, ScreenInfo, SessionRecorder, DEVICE_SESSION_KEY,
};
use rojifi_session::session::{SessionRecord, SessionStorage};

fn attributes() -> DeviceAttributes {
    DeviceAttributes {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1".to_string(),
        language: "en-NG".to_string(),
        platform: "iPhone".to_string(),
        hardware_concurrency: 6,
        device_memory: None,
        timezone: "Africa/Lagos".to_string(),
        screen: Some(ScreenInfo {
            width: 390,
            height: 844,
            color_depth: 24,
            pixel_ratio: 3.0,
        }),
    }
}

fn recorder(base_url: &str, server_public_key: Option<String>) -> SessionRecorder {
    let (store, _) = memory_store();
    let config = ApiConfig {
        base_url: base_url.to_string(),
        server_public_key,
        ..Default::default()
    };
    let client = ApiClient::new(config, store).unwrap();
    SessionRecorder::new(client, attributes())
}

#[test]
fn test_init_is_idempotent() {
    let recorder = recorder("http://127.0.0.1:1", None);

    assert!(recorder.init().unwrap());
    let first = recorder.current().unwrap().expect("device session stored");

    assert!(!recorder.init().unwrap(), "Second init must not overwrite");
    let second = recorder.current().unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_device_session_describes_device() {
    let (store, storage) = memory_store();
    let client = ApiClient::new(ApiConfig::default(), store.clone()).unwrap();
    let recorder = SessionRecorder::new(client, attributes()).with_location(GeoLocation {
        latitude: 6.5244,
        longitude: 3.3792,
        city: Some("Lagos".to_string()),
        country: Some("NG".to_string()),
    });

    assert!(recorder.current().unwrap().is_none());
    recorder.init().unwrap();

    let session = recorder.current().unwrap().unwrap();
    assert_eq!(session.device_id, store.device_id());
    assert_eq!(session.device.os, "iOS");
    assert_eq!(session.device.device_type, DeviceType::Mobile);
    assert_eq!(session.device.fingerprint.len(), 64);
    assert_eq!(
        session.device.location.as_ref().and_then(|l| l.city.as_deref()),
        Some("Lagos")
    );

    // Stored encrypted under the client's local key
    let blob = storage.get(DEVICE_SESSION_KEY).unwrap().unwrap();
    let key = local_key(&store.keys().private_key).unwrap();
    assert!(decrypt(&blob, &key).unwrap().contains("\"deviceId\""));
}

#[tokio::test]
async fn test_save_requires_server_key() {
    let server = spawn_server().await;
    let recorder = recorder(&server.base_url, None);
    recorder.init().unwrap();

    assert!(!recorder.save().await);
    assert!(server.state.saved_sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_save_sends_payload_server_can_open() {
    let server = spawn_server().await;
    let server_key = server.state.server_keys.public_key.clone();
    let recorder = recorder(&server.base_url, Some(server_key));

    // Nothing to save before init
    assert!(!recorder.save().await);

    recorder.init().unwrap();
    let local = recorder.current().unwrap().unwrap();
    assert!(recorder.save().await);

    let saved = server.state.saved_sessions.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["id"], local.id.to_string());
    assert_eq!(saved[0]["deviceId"], local.device_id);
}

#[tokio::test]
async fn test_list_and_revoke_sessions() {
    let server = spawn_server().await;
    let recorder = recorder(&server.base_url, None);

    let sessions = recorder.sessions().await.expect("sessions listed");
    assert_eq!(sessions.len(), 2);
    assert!(sessions[0].current);
    assert_eq!(sessions[1].ip_address.as_deref(), Some("102.89.1.1"));

    assert!(recorder.revoke("s-2").await);
    assert!(!recorder.revoke("s-1").await);
}

#[tokio::test]
async fn test_unreachable_server_fails_softly() {
    let recorder = recorder("http://127.0.0.1:1", Some("02".repeat(33)));
    recorder.init().unwrap();

    assert!(recorder.sessions().await.is_none());
    assert!(!recorder.revoke("s-2").await);
}

#[tokio::test]
async fn test_revoke_keeps_id_in_one_path_segment() {
    let server = spawn_server().await;
    let recorder = recorder(&server.base_url, None);

    // Would reach /session/s-2 if the id were spliced into the path unescaped
    assert!(!recorder.revoke("s-2?force=1").await);
    assert!(!recorder.revoke("s-2#x").await);
    assert!(recorder.revoke("s-2").await);
}

#[test]
fn test_init_replaces_blob_from_previous_key_pair() {
    let (store, _) = memory_store();
    let client = ApiClient::new(ApiConfig::default(), store.clone()).unwrap();
    let recorder = SessionRecorder::new(client, attributes());
    assert!(recorder.init().unwrap());

    // A login carrying its own key pair replaces the identity
    store.login(SessionRecord {
        keys: generate(),
        ..Default::default()
    });
    assert!(recorder.current().is_err());

    assert!(recorder.init().unwrap(), "Unreadable blob must be recreated");
    let session = recorder.current().unwrap().expect("device session stored");
    assert_eq!(session.device_id, store.device_id());
    assert!(!recorder.init().unwrap());
}
