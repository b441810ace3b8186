//! ApiClient against an in-process API stand-in

use crate::common::{memory_store, spawn_server};
use rojifi_session::api::{ApiClient, ApiConfig, ApiError, Receipt};
use rojifi_session::session::{SessionField, SessionRecord, SessionStore, Transaction};

fn client(base_url: &str, store: SessionStore) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        ..Default::default()
    };
    ApiClient::new(config, store).unwrap()
}

fn logged_in_store() -> SessionStore {
    let (store, _) = memory_store();
    store.login(SessionRecord {
        authorization: "tok1".to_string(),
        ..Default::default()
    });
    store
}

#[tokio::test]
async fn test_get_decrypts_typed_payload() {
    let server = spawn_server().await;
    let api = client(&server.base_url, logged_in_store());

    let transactions: Vec<Transaction> = api.get("/transaction").await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].id, "tx-1");
    assert_eq!(transactions[1].amount, 320.25);
    assert_eq!(
        transactions[1].extra.get("reference"),
        Some(&serde_json::json!("INV-88"))
    );
}

#[tokio::test]
async fn test_get_page_returns_pagination() {
    let server = spawn_server().await;
    let api = client(&server.base_url, logged_in_store());

    let (transactions, pagination): (Vec<Transaction>, _) =
        api.get_page("/transaction").await.unwrap();
    assert_eq!(transactions.len(), 2);

    let pagination = pagination.expect("pagination present");
    assert_eq!(pagination.total, 2);
    assert_eq!(pagination.total_pages, 1);
}

#[tokio::test]
async fn test_fetched_data_flows_into_store() {
    let server = spawn_server().await;
    let store = logged_in_store();
    let api = client(&server.base_url, store.clone());

    let transactions: Vec<Transaction> = api.get("transaction").await.unwrap();
    assert!(store.update_session([SessionField::Transactions(transactions)]));

    assert_eq!(store.get_user_data().transactions.len(), 2);
}

#[tokio::test]
async fn test_missing_token_is_rejected_by_server() {
    let server = spawn_server().await;
    let (store, _) = memory_store();
    let api = client(&server.base_url, store);

    let result: Result<Vec<Transaction>, _> = api.get("/transaction").await;
    match result {
        Err(ApiError::Api { message }) => assert_eq!(message, "Unauthorized"),
        other => panic!("Expected ApiError::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_status_surfaces_server_message() {
    let server = spawn_server().await;
    let api = client(&server.base_url, logged_in_store());

    let result: Result<serde_json::Value, _> = api.get("/auth/directors").await;
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Director not found");
}

#[tokio::test]
async fn test_success_without_handshake_is_unprocessable() {
    let server = spawn_server().await;
    let api = client(&server.base_url, logged_in_store());

    let result: Result<serde_json::Value, _> = api.get("/broken").await;
    assert!(matches!(result, Err(ApiError::MissingHandshake)));
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = spawn_server().await;
    let api = client(&server.base_url, logged_in_store());

    let result: Result<serde_json::Value, _> = api.get("/no-such-route").await;
    match result {
        Err(ApiError::Api { message }) => assert!(message.contains("404")),
        other => panic!("Expected ApiError::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_failure() {
    let api = client("http://127.0.0.1:1", logged_in_store());

    let result: Result<serde_json::Value, _> = api.get("/transaction").await;
    assert!(matches!(result, Err(ApiError::Transport(_))));
}

#[tokio::test]
async fn test_upload_returns_url() {
    let server = spawn_server().await;
    let api = client(&server.base_url, logged_in_store());

    let url = api
        .upload("/upload", "passport.png", vec![0x89, 0x50, 0x4e, 0x47])
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.rojifi.test/uploads/passport.png");
}

#[tokio::test]
async fn test_receipt_link_and_file() {
    let server = spawn_server().await;
    let api = client(&server.base_url, logged_in_store());

    let link = api.receipt("/receipt/link").await.unwrap();
    assert_eq!(
        link,
        Receipt::Url("https://cdn.rojifi.test/receipts/tx-1.pdf".to_string())
    );

    match api.receipt("/receipt/file").await.unwrap() {
        Receipt::File {
            bytes,
            content_type,
        } => {
            assert_eq!(bytes, b"%PDF-1.4 receipt".to_vec());
            assert_eq!(content_type.as_deref(), Some("application/pdf"));
        }
        other => panic!("Expected Receipt::File, got {:?}", other),
    }
}

#[test]
fn test_download_url_encodes_query() {
    let api = client("https://api.rojifi.test/", logged_in_store());

    let url = api
        .download_url("https://cdn.rojifi.test/a b.pdf?sig=1&x=2", "receipt tx-1.pdf")
        .unwrap();
    assert_eq!(
        url,
        "https://api.rojifi.test/download?url=https%3A%2F%2Fcdn.rojifi.test%2Fa+b.pdf%3Fsig%3D1%26x%3D2&filename=receipt+tx-1.pdf"
    );
}
