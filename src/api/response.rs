// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response envelope returned by every API endpoint

use super::defaults::parse_data;
use super::errors::{ApiError, ApiResult};
use crate::crypto::HandshakeKeyPair;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// `{ status, data, handshake, message, error, pagination }`
///
/// `data` is ciphertext whenever `status` is `"success"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub status: String,
    pub data: Option<String>,
    pub handshake: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub pagination: Option<Pagination>,
}

/// Trusted encrypted payload with the handshake needed to open it
#[derive(Debug, Clone)]
pub struct EncryptedPayload {
    pub data: String,
    pub handshake: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Text to show for a failed response
    pub fn error_message(&self) -> String {
        non_empty(&self.message)
            .or_else(|| non_empty(&self.error))
            .unwrap_or("Request failed")
            .to_string()
    }

    /// Check the envelope and hand back its payload
    ///
    /// Only a success status that also carries a handshake is trusted.
    pub fn into_payload(self) -> ApiResult<EncryptedPayload> {
        if !self.is_success() {
            return Err(ApiError::Api {
                message: self.error_message(),
            });
        }

        let handshake = match self.handshake {
            Some(h) if !h.is_empty() => h,
            _ => {
                warn!("Success response without handshake value");
                return Err(ApiError::MissingHandshake);
            }
        };

        let data = self.data.ok_or(ApiError::MissingData)?;
        Ok(EncryptedPayload { data, handshake })
    }

    /// Verify, decrypt and parse in one step
    pub fn decode<T: DeserializeOwned>(self, keys: &HandshakeKeyPair) -> ApiResult<T> {
        let payload = self.into_payload()?;
        parse_data(&payload.data, &payload.handshake, keys)
    }
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.is_empty())
}
