// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Base URL, default headers and the shared response-parsing entry point

use crate::crypto::{self, HandshakeKeyPair};
use crate::session::SessionRecord;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

use super::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.rojifi.com";

/// Client public key header
pub const HANDSHAKE_HEADER: &str = "x-rojifi-handshake";
/// Device id header
pub const DEVICE_ID_HEADER: &str = "x-rojifi-deviceid";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Server static public key (hex); enables encrypted device-session uploads
    #[serde(default)]
    pub server_public_key: Option<String>,
    /// Request timeout; none by default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            server_public_key: None,
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Join `path` onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Append percent-encoded path segments to the base URL
    ///
    /// Each segment stays one segment: `/`, `?` and `#` inside it are escaped.
    pub fn endpoint_segments(&self, segments: &[&str]) -> Result<String, ApiError> {
        let mut endpoint = Url::parse(&self.base_url)?;
        endpoint
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(endpoint.into())
    }
}

/// Headers sent with every authenticated call
///
/// `Authorization` is omitted while no token is held.
pub fn default_headers(record: &SessionRecord) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(HANDSHAKE_HEADER, header_value(&record.keys.public_key)?);
    headers.insert(DEVICE_ID_HEADER, header_value(&record.device_id)?);

    if !record.authorization.is_empty() {
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", record.authorization))?,
        );
    }

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader(e.to_string()))
}

/// Derive the response secret, decrypt `data` and parse it as JSON
///
/// Every view goes through this one function; it either returns the whole
/// typed value or an error, never partially decrypted data.
pub fn parse_data<T: DeserializeOwned>(
    data: &str,
    handshake: &str,
    keys: &HandshakeKeyPair,
) -> Result<T, ApiError> {
    let secret = crypto::secret(&keys.private_key, handshake)?;
    let plaintext = crypto::decrypt(data, &secret)?;
    let parsed = serde_json::from_str(&plaintext).map_err(ApiError::Parse)?;
    Ok(parsed)
}
