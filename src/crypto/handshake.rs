// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Handshake Key Agreement
//!
//! Every client holds one secp256k1 key pair for its whole lifetime. The
//! public half is sent with each request (`x-rojifi-handshake`) and doubles
//! as the device id. Each server response carries its own handshake value,
//! a fresh server public key; ECDH between that value and the client's
//! private key, expanded with HKDF-SHA256, yields the 32-byte secret that
//! decrypts the response body.

use super::CryptoError;
use hkdf::Hkdf;
use k256::{elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// HKDF info string for per-response secrets
const HANDSHAKE_INFO: &[u8] = b"rojifi-handshake";

/// HKDF salt and info for the at-rest key of the local device session
const LOCAL_SALT: &[u8] = b"rojifi-local";
const LOCAL_INFO: &[u8] = b"rojifi-device-session";

/// Client key pair, hex encoded
///
/// `public_key` is the 33-byte compressed SEC1 point, `private_key` the
/// 32-byte scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeKeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl HandshakeKeyPair {
    /// True when no key material has been assigned yet
    pub fn is_empty(&self) -> bool {
        self.public_key.is_empty() || self.private_key.is_empty()
    }
}

/// Generate a fresh client key pair
pub fn generate() -> HandshakeKeyPair {
    let secret = SecretKey::random(&mut OsRng);
    let public = secret.public_key();

    HandshakeKeyPair {
        public_key: hex::encode(public.to_encoded_point(true).as_bytes()),
        private_key: hex::encode(secret.to_bytes()),
    }
}

/// Derive the decryption secret for one response
///
/// Deterministic for a given `(private_key, handshake)` pair; a different
/// handshake gives an unrelated secret.
///
/// # Arguments
///
/// * `private_key` - Client private key (hex, 32 bytes, optional `0x` prefix)
/// * `handshake` - Server handshake value (hex SEC1 public key, 33 or 65 bytes)
///
/// # Example
///
/// ```ignore
/// let key = secret(&keys.private_key, &response.handshake)?;
/// let plaintext = decrypt(&response.data, &key)?;
/// ```
pub fn secret(private_key: &str, handshake: &str) -> Result<[u8; 32], CryptoError> {
    let client_secret = parse_private_key(private_key)?;

    let server_bytes = decode_hex(handshake, "server_handshake")?;
    if server_bytes.len() != 33 && server_bytes.len() != 65 {
        return Err(CryptoError::InvalidKey {
            key_type: "server_handshake".to_string(),
            reason: format!(
                "expected 33 or 65 bytes, got {}",
                server_bytes.len()
            ),
        });
    }

    let server_public =
        PublicKey::from_sec1_bytes(&server_bytes).map_err(|e| CryptoError::InvalidKey {
            key_type: "server_handshake".to_string(),
            reason: format!("invalid curve point: {}", e),
        })?;

    let shared = k256::ecdh::diffie_hellman(
        client_secret.to_nonzero_scalar(),
        server_public.as_affine(),
    );

    let hkdf = Hkdf::<Sha256>::new(None, shared.raw_secret_bytes());
    let mut derived = [0u8; 32];
    hkdf.expand(HANDSHAKE_INFO, &mut derived)
        .map_err(|e| CryptoError::KeyDerivationFailed {
            operation: "handshake_secret".to_string(),
            reason: e.to_string(),
        })?;

    Ok(derived)
}

/// Derive the key used to encrypt the device session kept in local storage
pub fn local_key(private_key: &str) -> Result<[u8; 32], CryptoError> {
    let client_secret = parse_private_key(private_key)?;

    let hkdf = Hkdf::<Sha256>::new(Some(LOCAL_SALT), &client_secret.to_bytes());
    let mut derived = [0u8; 32];
    hkdf.expand(LOCAL_INFO, &mut derived)
        .map_err(|e| CryptoError::KeyDerivationFailed {
            operation: "local_key".to_string(),
            reason: e.to_string(),
        })?;

    Ok(derived)
}

fn parse_private_key(private_key: &str) -> Result<SecretKey, CryptoError> {
    let bytes = decode_hex(private_key, "client_private_key")?;
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidKey {
            key_type: "client_private_key".to_string(),
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        });
    }

    SecretKey::from_slice(&bytes).map_err(|e| CryptoError::InvalidKey {
        key_type: "client_private_key".to_string(),
        reason: e.to_string(),
    })
}

fn decode_hex(value: &str, key_type: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(trimmed).map_err(|e| CryptoError::InvalidKey {
        key_type: key_type.to_string(),
        reason: format!("hex decode error: {}", e),
    })
}
