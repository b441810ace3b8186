// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session record and typed field updates

use super::SessionError;
use crate::crypto::HandshakeKeyPair;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys dropped from persisted sessions on load
pub const LEGACY_KEYS: &[&str] = &["signupProgress"];

/// Signed-in user snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Business profile of the sending company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sender {
    pub id: String,
    pub business_name: String,
    pub country: String,
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wallet {
    pub id: String,
    pub currency: String,
    pub balance: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payment being composed in the dashboard, not yet submitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub beneficiary_name: String,
    pub purpose: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Auth state and cached domain data for the current client session
///
/// Fields without a typed home land in `extras`, which is flattened into the
/// record on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub is_logged_in: bool,
    pub user: Option<User>,
    pub sender: Option<Sender>,
    pub active_wallet: String,
    pub wallets: Vec<Wallet>,
    pub transactions: Vec<Transaction>,
    pub payment: Option<PaymentDraft>,
    pub authorization: String,
    pub keys: HandshakeKeyPair,
    pub device_id: String,
    pub signup_tracker: Option<Value>,
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

impl SessionRecord {
    /// Empty logged-out record bound to a client identity
    pub fn with_identity(keys: HandshakeKeyPair) -> Self {
        Self {
            device_id: keys.public_key.clone(),
            keys,
            ..Default::default()
        }
    }

    /// Remove retired keys carried over from older persisted sessions
    pub fn strip_legacy_keys(&mut self) {
        for key in LEGACY_KEYS {
            self.extras.remove(*key);
        }
    }

    /// Whether `field` names a key already present on the record
    pub fn has_key(&self, field: &SessionField) -> bool {
        match field {
            SessionField::Extra(key, _) => self.extras.contains_key(key),
            _ => true,
        }
    }

    /// Overwrite one field
    pub fn apply(&mut self, field: SessionField) {
        match field {
            SessionField::User(value) => self.user = value,
            SessionField::Sender(value) => self.sender = value,
            SessionField::ActiveWallet(value) => self.active_wallet = value,
            SessionField::Wallets(value) => self.wallets = value,
            SessionField::Transactions(value) => self.transactions = value,
            SessionField::Payment(value) => self.payment = value,
            SessionField::Authorization(value) => self.authorization = value,
            SessionField::Keys(value) => self.keys = value,
            SessionField::DeviceId(value) => self.device_id = value,
            SessionField::SignupTracker(value) => self.signup_tracker = value,
            SessionField::Extra(key, value) => {
                self.extras.insert(key, value);
            }
        }
    }
}

/// A single typed update to a [`SessionRecord`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionField {
    User(Option<User>),
    Sender(Option<Sender>),
    ActiveWallet(String),
    Wallets(Vec<Wallet>),
    Transactions(Vec<Transaction>),
    Payment(Option<PaymentDraft>),
    Authorization(String),
    Keys(HandshakeKeyPair),
    DeviceId(String),
    SignupTracker(Option<Value>),
    /// Untyped key kept in the record's side-map
    Extra(String, Value),
}

impl SessionField {
    /// Wire name of the key this update targets
    pub fn key(&self) -> &str {
        match self {
            SessionField::User(_) => "user",
            SessionField::Sender(_) => "sender",
            SessionField::ActiveWallet(_) => "activeWallet",
            SessionField::Wallets(_) => "wallets",
            SessionField::Transactions(_) => "transactions",
            SessionField::Payment(_) => "payment",
            SessionField::Authorization(_) => "authorization",
            SessionField::Keys(_) => "keys",
            SessionField::DeviceId(_) => "deviceId",
            SessionField::SignupTracker(_) => "signupTracker",
            SessionField::Extra(key, _) => key,
        }
    }

    /// Build an update from a wire key name and a JSON value
    ///
    /// Known keys are decoded into their typed variant; anything else becomes
    /// [`SessionField::Extra`]. `isLoggedIn` only changes through login and
    /// logout.
    pub fn from_key(key: &str, value: Value) -> Result<Self, SessionError> {
        let field = match key {
            "isLoggedIn" => return Err(SessionError::ReadOnlyKey(key.to_string())),
            "user" => SessionField::User(decode(key, value)?),
            "sender" => SessionField::Sender(decode(key, value)?),
            "activeWallet" => SessionField::ActiveWallet(decode(key, value)?),
            "wallets" => SessionField::Wallets(decode(key, value)?),
            "transactions" => SessionField::Transactions(decode(key, value)?),
            "payment" => SessionField::Payment(decode(key, value)?),
            "authorization" => SessionField::Authorization(decode(key, value)?),
            "keys" => SessionField::Keys(decode(key, value)?),
            "deviceId" => SessionField::DeviceId(decode(key, value)?),
            "signupTracker" => SessionField::SignupTracker(decode(key, value)?),
            _ => SessionField::Extra(key.to_string(), value),
        };
        Ok(field)
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, SessionError> {
    serde_json::from_value(value).map_err(|e| SessionError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
