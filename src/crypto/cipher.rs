// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-GCM Payload Encryption
//!
//! Server payloads and the local device session use AES-256-GCM with the
//! Web Crypto layout, base64 encoded for transport:
//!
//! ```text
//! base64( nonce (12 bytes) | ciphertext+tag )
//! ```
//!
//! No Additional Authenticated Data is used.

use super::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// AES-GCM nonce size in bytes
pub const NONCE_SIZE: usize = 12;

/// Decrypt a base64 payload with a derived secret
///
/// Returns the whole plaintext or an error; a payload that fails any step
/// yields nothing.
///
/// # Errors
///
/// Returns error if:
/// - The payload is not valid base64 or is shorter than the nonce
/// - Authentication tag verification fails (wrong secret or tampered data)
/// - Decrypted bytes are not valid UTF-8
pub fn decrypt(ciphertext: &str, secret: &[u8; 32]) -> Result<String, CryptoError> {
    let encrypted = STANDARD.decode(ciphertext.trim())?;
    let plaintext = decrypt_bytes(&encrypted, secret)?;

    String::from_utf8(plaintext).map_err(|e| CryptoError::InvalidPayload {
        field: "plaintext".to_string(),
        reason: format!("decrypted data is not valid UTF-8: {}", e),
    })
}

/// Decrypt raw `nonce | ciphertext+tag` bytes
pub fn decrypt_bytes(encrypted: &[u8], secret: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    if encrypted.len() < NONCE_SIZE {
        return Err(CryptoError::InvalidPayload {
            field: "ciphertext".to_string(),
            reason: format!(
                "expected at least {} bytes for nonce, got {}",
                NONCE_SIZE,
                encrypted.len()
            ),
        });
    }

    let (nonce, body) = encrypted.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new_from_slice(secret).map_err(|e| CryptoError::InvalidKey {
        key_type: "secret".to_string(),
        reason: e.to_string(),
    })?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: body,
                aad: b"",
            },
        )
        .map_err(|e| CryptoError::DecryptionFailed {
            operation: "aes_gcm".to_string(),
            reason: format!("authentication error - wrong secret or corrupted data: {}", e),
        })
}

/// Encrypt a plaintext into the base64 transport layout with a random nonce
pub fn encrypt(plaintext: &str, secret: &[u8; 32]) -> Result<String, CryptoError> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new_from_slice(secret).map_err(|e| CryptoError::InvalidKey {
        key_type: "secret".to_string(),
        reason: e.to_string(),
    })?;
    let body = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext.as_bytes(),
                aad: b"",
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed {
            operation: "aes_gcm".to_string(),
            reason: e.to_string(),
        })?;

    let mut encrypted = Vec::with_capacity(NONCE_SIZE + body.len());
    encrypted.extend_from_slice(&nonce);
    encrypted.extend_from_slice(&body);

    Ok(STANDARD.encode(encrypted))
}
