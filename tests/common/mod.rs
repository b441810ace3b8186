// Shared helpers: an in-process stand-in for the remote API.
#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rojifi_session::config::SessionConfig;
use rojifi_session::crypto::{decrypt, encrypt, generate, secret, HandshakeKeyPair};
use rojifi_session::session::{MemoryStorage, SessionStore};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub struct MockState {
    /// Static server key used for client-to-server payloads
    pub server_keys: HandshakeKeyPair,
    /// Decrypted device sessions received on POST /session
    pub saved_sessions: Mutex<Vec<Value>>,
}

pub struct MockServer {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        secret: "integration-test-secret".to_string(),
        ttl_days: 365,
    }
}

pub fn memory_store() -> (SessionStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone(), session_config());
    (store, storage)
}

/// Encrypt `value` for the client whose public key arrived in the headers,
/// using a fresh server handshake per response
fn encrypted(headers: &HeaderMap, value: Value) -> Response {
    let client_public = headers
        .get("x-rojifi-handshake")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let handshake = generate();
    let key = secret(&handshake.private_key, client_public).unwrap();

    Json(json!({
        "status": "success",
        "data": encrypt(&value.to_string(), &key).unwrap(),
        "handshake": handshake.public_key,
    }))
    .into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == "Bearer tok1")
}

async fn transactions(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let client_public = headers
        .get("x-rojifi-handshake")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let handshake = generate();
    let key = secret(&handshake.private_key, client_public).unwrap();
    let data = json!([
        { "id": "tx-1", "amount": 1500.0, "currency": "USD", "status": "completed", "createdAt": "2025-01-02" },
        { "id": "tx-2", "amount": 320.25, "currency": "NGN", "status": "pending", "createdAt": "2025-01-03", "reference": "INV-88" }
    ]);

    Json(json!({
        "status": "success",
        "data": encrypt(&data.to_string(), &key).unwrap(),
        "handshake": handshake.public_key,
        "pagination": { "page": 1, "limit": 20, "total": 2, "totalPages": 1 }
    }))
    .into_response()
}

async fn director_error() -> Response {
    failure(StatusCode::BAD_REQUEST, "Director not found")
}

async fn missing_handshake() -> Response {
    Json(json!({ "status": "success", "data": "c29tZXRoaW5n" })).into_response()
}

async fn upload(headers: HeaderMap, body: Bytes) -> Response {
    let text = String::from_utf8_lossy(&body);
    if !text.contains("filename=\"passport.png\"") {
        return failure(StatusCode::BAD_REQUEST, "No file uploaded");
    }
    encrypted(&headers, json!({ "url": "https://cdn.rojifi.test/uploads/passport.png" }))
}

async fn receipt_link(headers: HeaderMap) -> Response {
    encrypted(&headers, json!({ "url": "https://cdn.rojifi.test/receipts/tx-1.pdf" }))
}

async fn receipt_file() -> Response {
    (
        [(header::CONTENT_TYPE, "application/pdf")],
        b"%PDF-1.4 receipt".to_vec(),
    )
        .into_response()
}

async fn save_session(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let client_public = headers
        .get("x-rojifi-handshake")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let Some(payload) = body.get("payload").and_then(Value::as_str) else {
        return failure(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let key = match secret(&state.server_keys.private_key, &client_public) {
        Ok(key) => key,
        Err(_) => return failure(StatusCode::BAD_REQUEST, "Bad handshake"),
    };
    let session: Value = match decrypt(payload, &key) {
        Ok(plaintext) => serde_json::from_str(&plaintext).unwrap(),
        Err(_) => return failure(StatusCode::BAD_REQUEST, "Undecryptable payload"),
    };

    state.saved_sessions.lock().unwrap().push(session);
    encrypted(&headers, json!({ "saved": true }))
}

async fn list_sessions(headers: HeaderMap) -> Response {
    encrypted(
        &headers,
        json!([
            { "id": "s-1", "deviceId": "dev-a", "browser": "Chrome", "os": "Windows", "current": true, "lastActive": "2025-01-05T10:00:00Z" },
            { "id": "s-2", "deviceId": "dev-b", "browser": "Safari", "os": "iOS", "ipAddress": "102.89.1.1" }
        ]),
    )
}

async fn revoke_session(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if id == "s-2" {
        encrypted(&headers, json!({ "revoked": id }))
    } else {
        failure(StatusCode::NOT_FOUND, "Session not found")
    }
}

pub async fn spawn_server() -> MockServer {
    let state = Arc::new(MockState {
        server_keys: generate(),
        saved_sessions: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/transaction", get(transactions))
        .route("/auth/directors", get(director_error))
        .route("/broken", get(missing_handshake))
        .route("/upload", post(upload))
        .route("/receipt/link", get(receipt_link))
        .route("/receipt/file", get(receipt_file))
        .route("/session", get(list_sessions).post(save_session))
        .route("/session/:id", axum::routing::delete(revoke_session))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{}", addr),
        state,
    }
}
