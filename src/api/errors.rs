// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::crypto::CryptoError;
use thiserror::Error;

/// Message used when a successful-looking response cannot be trusted
pub const UNPROCESSABLE_RESPONSE: &str = "unable to process response";

/// Errors from remote API calls
///
/// Every variant is terminal for the call that produced it; nothing here is
/// retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{message}")]
    Api { message: String },

    /// Success status without a handshake value
    #[error("{}", UNPROCESSABLE_RESPONSE)]
    MissingHandshake,

    /// Success status without a data payload
    #[error("Response carried no data")]
    MissingData,

    #[error("Failed to decrypt response: {0}")]
    Decrypt(#[from] CryptoError),

    #[error("Failed to parse response: {0}")]
    Parse(serde_json::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
