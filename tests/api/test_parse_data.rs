//! parse_data: the single decrypt-then-parse chokepoint

use rojifi_session::api::{parse_data, ApiError};
use rojifi_session::crypto::{encrypt, generate, secret};
use rojifi_session::session::Sender;
use serde_json::Value;

#[test]
fn test_parse_into_typed_value() {
    let client = generate();
    let handshake = generate();
    let key = secret(&handshake.private_key, &client.public_key).unwrap();
    let data = encrypt(
        r#"{"id":"snd-1","businessName":"Acme Imports Ltd","country":"NG","status":"approved","rcNumber":"RC123"}"#,
        &key,
    )
    .unwrap();

    let sender: Sender = parse_data(&data, &handshake.public_key, &client).unwrap();
    assert_eq!(sender.business_name, "Acme Imports Ltd");
    assert_eq!(sender.extra.get("rcNumber"), Some(&Value::from("RC123")));
}

#[test]
fn test_each_stage_failure_propagates() {
    let client = generate();
    let handshake = generate();
    let key = secret(&handshake.private_key, &client.public_key).unwrap();

    // Bad handshake
    let data = encrypt("{}", &key).unwrap();
    let result: Result<Value, _> = parse_data(&data, "not-hex", &client);
    assert!(matches!(result, Err(ApiError::Decrypt(_))));

    // Ciphertext for another client
    let other = generate();
    let other_key = secret(&handshake.private_key, &other.public_key).unwrap();
    let data = encrypt("{}", &other_key).unwrap();
    let result: Result<Value, _> = parse_data(&data, &handshake.public_key, &client);
    assert!(matches!(result, Err(ApiError::Decrypt(_))));

    // Decrypts but is not the expected shape
    let data = encrypt(r#"{"businessName": 42}"#, &key).unwrap();
    let result: Result<Sender, _> = parse_data(&data, &handshake.public_key, &client);
    assert!(matches!(result, Err(ApiError::Parse(_))));
}
