// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User-agent pattern matching
//!
//! Extracts browser, OS and device class from a user-agent string. Patterns
//! are tried in order; the first match wins, so more specific browsers
//! (Edge, Opera, Samsung) come before the engines they embed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgentInfo {
    pub browser: String,
    pub browser_version: String,
    pub os: String,
    pub os_version: String,
    pub device_type: DeviceType,
}

struct Patterns {
    browsers: Vec<(&'static str, Regex)>,
    product: Regex,
    windows: Regex,
    ios: Regex,
    macos: Regex,
    android: Regex,
    tablet: Regex,
    mobile: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("user-agent pattern must compile");
        Patterns {
            browsers: vec![
                ("Edge", re(r"Edg(?:e|A|iOS)?/([\d.]+)")),
                ("Opera", re(r"(?:OPR|Opera)/([\d.]+)")),
                ("Samsung Internet", re(r"SamsungBrowser/([\d.]+)")),
                ("Chrome", re(r"(?:Chrome|CriOS)/([\d.]+)")),
                ("Firefox", re(r"(?:Firefox|FxiOS)/([\d.]+)")),
                ("Safari", re(r"Version/([\d.]+).*Safari/")),
                ("Internet Explorer", re(r"(?:MSIE |Trident/.*rv:)([\d.]+)")),
            ],
            product: re(r"^([A-Za-z][\w.-]*)/([\w.-]+)"),
            windows: re(r"Windows NT ([\d.]+)"),
            ios: re(r"(?:iPhone|iPad|iPod).*? OS ([\d_]+)"),
            macos: re(r"Mac OS X ([\d_.]+)"),
            android: re(r"Android ([\d.]+)"),
            tablet: re(r"(?i)iPad|Tablet|PlayBook|Silk"),
            mobile: re(r"(?i)Mobi|iPhone|iPod|Windows Phone"),
        }
    })
}

/// Parse a user-agent string
pub fn parse(user_agent: &str) -> UserAgentInfo {
    let p = patterns();
    let (browser, browser_version) = detect_browser(p, user_agent);
    let (os, os_version) = detect_os(p, user_agent);

    UserAgentInfo {
        browser,
        browser_version,
        os,
        os_version,
        device_type: detect_device_type(p, user_agent),
    }
}

fn detect_browser(p: &Patterns, ua: &str) -> (String, String) {
    for (name, pattern) in &p.browsers {
        if let Some(caps) = pattern.captures(ua) {
            return (name.to_string(), caps[1].to_string());
        }
    }

    // Non-browser clients: "tool/1.2.3 (...)"
    if !ua.starts_with("Mozilla/") {
        if let Some(caps) = p.product.captures(ua) {
            return (caps[1].to_string(), caps[2].to_string());
        }
    }

    (UNKNOWN.to_string(), String::new())
}

fn detect_os(p: &Patterns, ua: &str) -> (String, String) {
    if let Some(caps) = p.windows.captures(ua) {
        let version = match &caps[1] {
            "10.0" => "10",
            "6.3" => "8.1",
            "6.2" => "8",
            "6.1" => "7",
            other => other,
        };
        return ("Windows".to_string(), version.to_string());
    }
    if let Some(caps) = p.ios.captures(ua) {
        return ("iOS".to_string(), caps[1].replace('_', "."));
    }
    if let Some(caps) = p.android.captures(ua) {
        return ("Android".to_string(), caps[1].to_string());
    }
    if let Some(caps) = p.macos.captures(ua) {
        return ("macOS".to_string(), caps[1].replace('_', "."));
    }
    if ua.contains("CrOS") {
        return ("Chrome OS".to_string(), String::new());
    }
    if ua.contains("Linux") {
        return ("Linux".to_string(), String::new());
    }
    (UNKNOWN.to_string(), String::new())
}

fn detect_device_type(p: &Patterns, ua: &str) -> DeviceType {
    if p.tablet.is_match(ua) || (ua.contains("Android") && !ua.contains("Mobile")) {
        DeviceType::Tablet
    } else if p.mobile.is_match(ua) {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    }
}
