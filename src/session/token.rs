// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persisted session token
//!
//! The record is signed as an HS256 JWT `{ isLoggedIn, userData, exp }` and
//! the signed token is then sealed with AES-256-GCM, so the stored string
//! reveals neither the client key pair nor the bearer token:
//!
//! ```text
//! base64( nonce | AES-GCM( header.claims.signature ) )
//! ```
//!
//! Both layers are keyed from the configured session secret. Expiry is
//! checked with zero leeway.

use super::{SessionError, SessionRecord};
use crate::crypto;
use chrono::{DateTime, Utc};
use hkdf::Hkdf;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const SEAL_SALT: &[u8] = b"rojifi-session";
const SEAL_INFO: &[u8] = b"rojifi-session-token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub is_logged_in: bool,
    pub user_data: SessionRecord,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Sign and seal `record`
pub fn issue(
    record: &SessionRecord,
    is_logged_in: bool,
    secret: &str,
    expires_at: DateTime<Utc>,
) -> Result<String, SessionError> {
    let claims = SessionClaims {
        is_logged_in,
        user_data: record.clone(),
        exp: expires_at.timestamp(),
    };

    let signed = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(crypto::encrypt(&signed, &seal_key(secret)?)?)
}

/// Open and validate a stored token
///
/// Fails on a wrong secret, a tampered or malformed value, or an `exp` in
/// the past.
pub fn verify(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let signed = crypto::decrypt(token, &seal_key(secret)?)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<SessionClaims>(
        &signed,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

fn seal_key(secret: &str) -> Result<[u8; 32], SessionError> {
    let hkdf = Hkdf::<Sha256>::new(Some(SEAL_SALT), secret.as_bytes());
    let mut key = [0u8; 32];
    hkdf.expand(SEAL_INFO, &mut key)
        .map_err(|e| crypto::CryptoError::KeyDerivationFailed {
            operation: "session_seal_key".to_string(),
            reason: e.to_string(),
        })?;
    Ok(key)
}
