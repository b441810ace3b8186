// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::crypto::CryptoError;
use thiserror::Error;

/// Errors raised inside the session layer
///
/// Store operations log these rather than return them; they surface
/// directly only from the token, storage and field-decoding helpers.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Session token encryption error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User is not logged in")]
    NotLoggedIn,

    #[error("Unknown session key: {0}")]
    UnknownKey(String),

    #[error("Session key '{0}' cannot be updated directly")]
    ReadOnlyKey(String),

    #[error("Invalid value for session key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
