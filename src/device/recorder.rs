// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local device session recorder
//!
//! Keeps one encrypted device-session blob in local storage and mirrors it
//! to the remote session API so sessions can be listed and revoked there.
//! Remote calls fail softly: they log and report `false`/`None`, and are
//! never retried.

use super::fingerprint::{DeviceAttributes, DeviceInfo, GeoLocation};
use super::DeviceError;
use crate::api::ApiClient;
use crate::crypto;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Storage key of the encrypted device session
pub const DEVICE_SESSION_KEY: &str = "device-session";

const SESSION_PATH: &str = "session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSession {
    pub id: Uuid,
    pub device_id: String,
    pub device: DeviceInfo,
    pub created_at: DateTime<Utc>,
}

/// Session as listed by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSession {
    pub id: String,
    pub device_id: String,
    pub browser: String,
    pub os: String,
    pub ip_address: Option<String>,
    pub last_active: Option<String>,
    pub current: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct SessionRecorder {
    client: ApiClient,
    attributes: DeviceAttributes,
    location: Option<GeoLocation>,
}

impl SessionRecorder {
    pub fn new(client: ApiClient, attributes: DeviceAttributes) -> Self {
        Self {
            client,
            attributes,
            location: None,
        }
    }

    pub fn with_location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Device description for the current attributes
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::from_attributes(&self.attributes, self.location.clone())
    }

    /// Create the local device session unless a readable one already exists
    ///
    /// A stored blob that no longer opens under the current key pair (for
    /// example after a login that brought its own keys) is replaced.
    /// Returns `true` when a new session was written.
    pub fn init(&self) -> Result<bool, DeviceError> {
        match self.current() {
            Ok(Some(_)) => {
                debug!("Device session already initialised");
                return Ok(false);
            }
            Ok(None) => {}
            Err(DeviceError::Crypto(e)) => {
                warn!("Stored device session unreadable, recreating: {}", e);
            }
            Err(DeviceError::Serialization(e)) => {
                warn!("Stored device session malformed, recreating: {}", e);
            }
            Err(e) => return Err(e),
        }

        let storage = self.client.session().storage();

        let session = DeviceSession {
            id: Uuid::new_v4(),
            device_id: self.client.session().device_id(),
            device: self.device_info(),
            created_at: Utc::now(),
        };

        let key = crypto::local_key(&self.client.session().keys().private_key)?;
        let blob = crypto::encrypt(&serde_json::to_string(&session)?, &key)?;
        storage.set(DEVICE_SESSION_KEY, &blob)?;

        info!(
            "Device session {} created (fingerprint {})",
            session.id, session.device.fingerprint
        );
        Ok(true)
    }

    /// Decrypt the stored device session, if any
    pub fn current(&self) -> Result<Option<DeviceSession>, DeviceError> {
        let storage = self.client.session().storage();
        let Some(blob) = storage.get(DEVICE_SESSION_KEY)? else {
            return Ok(None);
        };

        let key = crypto::local_key(&self.client.session().keys().private_key)?;
        let plaintext = crypto::decrypt(&blob, &key)?;
        Ok(Some(serde_json::from_str(&plaintext)?))
    }

    /// Send the device session to the server
    ///
    /// The payload is encrypted for the server's configured public key;
    /// without one the session stays local.
    pub async fn save(&self) -> bool {
        let Some(server_key) = self.client.config().server_public_key.clone() else {
            warn!("No server public key configured; device session kept local");
            return false;
        };

        let session = match self.current() {
            Ok(Some(session)) => session,
            Ok(None) => {
                warn!("No device session to save; call init first");
                return false;
            }
            Err(e) => {
                error!("Failed to read device session: {}", e);
                return false;
            }
        };

        let private_key = self.client.session().keys().private_key;
        let payload = match encrypt_for_server(&session, &private_key, &server_key) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encrypt device session: {}", e);
                return false;
            }
        };

        match self
            .client
            .post::<_, Value>(SESSION_PATH, &json!({ "payload": payload }))
            .await
        {
            Ok(_) => {
                info!("Device session {} saved", session.id);
                true
            }
            Err(e) => {
                error!("Failed to save device session: {}", e);
                false
            }
        }
    }

    /// Sessions the server knows for this account
    pub async fn sessions(&self) -> Option<Vec<RemoteSession>> {
        match self.client.get::<Vec<RemoteSession>>(SESSION_PATH).await {
            Ok(sessions) => {
                debug!("Fetched {} remote sessions", sessions.len());
                Some(sessions)
            }
            Err(e) => {
                error!("Failed to fetch sessions: {}", e);
                None
            }
        }
    }

    pub async fn revoke(&self, id: &str) -> bool {
        match self
            .client
            .delete_segments::<Value>(&[SESSION_PATH, id])
            .await
        {
            Ok(_) => {
                info!("Session {} revoked", id);
                true
            }
            Err(e) => {
                error!("Failed to revoke session {}: {}", id, e);
                false
            }
        }
    }
}

fn encrypt_for_server(
    session: &DeviceSession,
    private_key: &str,
    server_key: &str,
) -> Result<String, DeviceError> {
    let secret = crypto::secret(private_key, server_key)?;
    Ok(crypto::encrypt(&serde_json::to_string(session)?, &secret)?)
}
