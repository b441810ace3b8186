// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Device fingerprint and descriptive device info

use super::user_agent::{self, DeviceType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sysinfo::System;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: u8,
    pub pixel_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Stable attributes of the client environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributes {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub hardware_concurrency: u32,
    /// Approximate memory in GiB
    pub device_memory: Option<f64>,
    pub timezone: String,
    pub screen: Option<ScreenInfo>,
}

impl DeviceAttributes {
    /// Attributes of the host this process runs on
    pub fn detect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let os_name = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
        let os_version = System::os_version().unwrap_or_default();
        let platform = format!("{} {}", os_name, std::env::consts::ARCH);

        let total_memory = sys.total_memory();
        let device_memory = (total_memory > 0)
            .then(|| (total_memory as f64 / (1024.0 * 1024.0 * 1024.0)).round());

        Self {
            user_agent: format!(
                "rojifi-cli/{} ({} {}; {})",
                env!("CARGO_PKG_VERSION"),
                os_name,
                os_version,
                std::env::consts::ARCH
            ),
            language: detect_language(),
            platform,
            hardware_concurrency: std::thread::available_parallelism()
                .map(|n| n.get() as u32)
                .unwrap_or(1),
            device_memory,
            timezone: std::env::var("TZ").unwrap_or_else(|_| "UTC".to_string()),
            screen: None,
        }
    }
}

/// `LANG=en_US.UTF-8` becomes `en-US`
fn detect_language() -> String {
    std::env::var("LANG")
        .ok()
        .and_then(|lang| lang.split('.').next().map(|l| l.replace('_', "-")))
        .filter(|l| !l.is_empty() && l != "C" && l != "POSIX")
        .unwrap_or_else(|| "en-US".to_string())
}

/// Fixed-order projection hashed into the fingerprint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintSource<'a> {
    user_agent: &'a str,
    language: &'a str,
    platform: &'a str,
    hardware_concurrency: u32,
    device_memory: Option<f64>,
    timezone: &'a str,
    screen: Option<&'a ScreenInfo>,
}

/// SHA-256 hex digest of the canonical attribute projection
pub fn fingerprint(attrs: &DeviceAttributes) -> String {
    let source = FingerprintSource {
        user_agent: &attrs.user_agent,
        language: &attrs.language,
        platform: &attrs.platform,
        hardware_concurrency: attrs.hardware_concurrency,
        device_memory: attrs.device_memory,
        timezone: &attrs.timezone,
        screen: attrs.screen.as_ref(),
    };

    // Serializing plain strings and numbers cannot fail
    let canonical = serde_json::to_vec(&source).unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}

/// Device description sent with session records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub fingerprint: String,
    pub browser: String,
    pub browser_version: String,
    pub os: String,
    pub os_version: String,
    pub device_type: DeviceType,
    pub platform: String,
    pub language: String,
    pub timezone: String,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

impl DeviceInfo {
    pub fn from_attributes(attrs: &DeviceAttributes, location: Option<GeoLocation>) -> Self {
        let ua = user_agent::parse(&attrs.user_agent);
        Self {
            fingerprint: fingerprint(attrs),
            browser: ua.browser,
            browser_version: ua.browser_version,
            os: ua.os,
            os_version: ua.os_version,
            device_type: ua.device_type,
            platform: attrs.platform.clone(),
            language: attrs.language.clone(),
            timezone: attrs.timezone.clone(),
            user_agent: attrs.user_agent.clone(),
            screen: attrs.screen.clone(),
            location,
        }
    }
}
