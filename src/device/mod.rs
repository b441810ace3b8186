// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Device identification and device-session tracking
//!
//! - **User agent**: browser / OS / device class from a user-agent string
//! - **Fingerprint**: SHA-256 over a canonical projection of device attributes
//! - **Recorder**: encrypted local device session plus the remote session API

pub mod fingerprint;
pub mod recorder;
pub mod user_agent;

use crate::crypto::CryptoError;
use crate::session::SessionError;
use thiserror::Error;

pub use fingerprint::{fingerprint, DeviceAttributes, DeviceInfo, GeoLocation, ScreenInfo};
pub use recorder::{DeviceSession, RemoteSession, SessionRecorder, DEVICE_SESSION_KEY};
pub use user_agent::{DeviceType, UserAgentInfo};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device session storage error: {0}")]
    Storage(#[from] SessionError),

    #[error("Device session crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Device session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
