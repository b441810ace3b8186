// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod device;
pub mod session;

pub use api::{ApiClient, ApiConfig, ApiError, ApiResponse};
pub use config::{ClientConfig, SessionConfig};
pub use crypto::{CryptoError, HandshakeKeyPair};
pub use device::{DeviceAttributes, DeviceInfo, SessionRecorder};
pub use session::{SessionField, SessionRecord, SessionStore};
