// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Store
//!
//! Single source of truth for authentication and cached dashboard data.
//! A store is constructed once and handed to whatever needs it; clones share
//! the same state.
//!
//! Lifetime: `Hydrating` (construction reads storage) then `LoggedOut` or
//! `LoggedIn`. `login` and `logout` move between the two; an expired token
//! found on a later construction lands in `LoggedOut`.
//!
//! Violations (updates while logged out, unknown keys) are logged and
//! ignored. The update methods return whether anything was applied, which
//! callers are free to ignore.

use super::storage::SessionStorage;
use super::{token, SessionField, SessionRecord};
use crate::config::SessionConfig;
use crate::crypto::{self, HandshakeKeyPair};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

/// Storage key holding the signed session token
pub const SESSION_KEY: &str = "session";

struct SessionState {
    /// Live login flag; the record's copy is synced from this
    logged_in: bool,
    record: SessionRecord,
    /// Client key pair reused for every record this store produces
    identity: HandshakeKeyPair,
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
}

impl SessionStore {
    /// Build a store and hydrate it from `storage`
    ///
    /// A missing, expired or malformed token leaves the store logged out.
    /// A fresh key pair is generated only when nothing could be hydrated,
    /// and is persisted straight away so the next construction reuses it.
    pub fn new(storage: Arc<dyn SessionStorage>, config: SessionConfig) -> Self {
        let hydrated = Self::hydrate(storage.as_ref(), &config);

        let (state, needs_persist) = match hydrated {
            Some(claims) => {
                let mut record = claims.user_data;
                let mut needs_persist = false;
                if record.keys.is_empty() {
                    record.keys = crypto::generate();
                    needs_persist = true;
                }
                if record.device_id.is_empty() {
                    record.device_id = record.keys.public_key.clone();
                }
                let identity = record.keys.clone();
                (
                    SessionState {
                        logged_in: claims.is_logged_in,
                        record,
                        identity,
                    },
                    needs_persist,
                )
            }
            None => {
                let identity = crypto::generate();
                (
                    SessionState {
                        logged_in: false,
                        record: SessionRecord::with_identity(identity.clone()),
                        identity,
                    },
                    true,
                )
            }
        };

        let store = Self {
            state: Arc::new(RwLock::new(state)),
            storage,
            config,
        };

        if needs_persist {
            let mut state = store.write_state();
            store.persist(&mut state);
        }

        store
    }

    fn hydrate(
        storage: &dyn SessionStorage,
        config: &SessionConfig,
    ) -> Option<token::SessionClaims> {
        let raw = match storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted session found");
                return None;
            }
            Err(e) => {
                error!("Failed to read persisted session: {}", e);
                return None;
            }
        };

        match token::verify(&raw, &config.secret) {
            Ok(mut claims) => {
                claims.user_data.strip_legacy_keys();
                info!(
                    "Restored persisted session (logged in: {})",
                    claims.is_logged_in
                );
                Some(claims)
            }
            Err(e) => {
                warn!("Discarding persisted session: {}", e);
                if let Err(e) = storage.remove(SESSION_KEY) {
                    error!("Failed to remove discarded session: {}", e);
                }
                None
            }
        }
    }

    /// Mark the client logged in with `record`, replacing any previous session
    ///
    /// The store's key pair and device id are kept when `record` has none.
    pub fn login(&self, mut record: SessionRecord) {
        let mut state = self.write_state();

        if record.keys.is_empty() {
            record.keys = state.identity.clone();
        } else {
            state.identity = record.keys.clone();
        }
        if record.device_id.is_empty() {
            record.device_id = record.keys.public_key.clone();
        }

        state.logged_in = true;
        state.record = record;
        self.persist(&mut state);
        info!("Session logged in");
    }

    /// Reset to empty defaults, keeping only the signup tracker
    pub fn logout(&self) {
        let mut state = self.write_state();

        let signup_tracker = state.record.signup_tracker.take();
        let mut record = SessionRecord::with_identity(state.identity.clone());
        record.signup_tracker = signup_tracker;

        state.logged_in = false;
        state.record = record;
        self.persist(&mut state);
        info!("Session logged out");
    }

    /// Current record, with its login flag synced to the live flag
    pub fn get_user_data(&self) -> SessionRecord {
        let mut state = self.write_state();
        state.record.is_logged_in = state.logged_in;
        state.record.clone()
    }

    /// Shallow-merge `fields` into the record and persist
    ///
    /// Does nothing (and writes nothing) unless logged in.
    pub fn update_session<I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = SessionField>,
    {
        let mut state = self.write_state();
        if !state.logged_in {
            error!("Cannot update session: user is not logged in");
            return false;
        }

        let mut applied = 0;
        for field in fields {
            Self::apply_field(&mut state, field);
            applied += 1;
        }

        self.persist(&mut state);
        debug!("Session updated ({} fields)", applied);
        true
    }

    /// Overwrite one key that already exists on the record
    ///
    /// Untyped keys must already be present in the record's extras.
    pub fn update_session_key(&self, field: SessionField) -> bool {
        let mut state = self.write_state();
        if !state.logged_in {
            error!(
                "Cannot update session key '{}': user is not logged in",
                field.key()
            );
            return false;
        }

        if !state.record.has_key(&field) {
            error!(
                "Cannot update session key '{}': key does not exist on session",
                field.key()
            );
            return false;
        }

        let key = field.key().to_string();
        Self::apply_field(&mut state, field);
        self.persist(&mut state);
        debug!("Session key '{}' updated", key);
        true
    }

    /// String-keyed variant of [`update_session_key`](Self::update_session_key)
    pub fn update_session_key_by_name(&self, key: &str, value: Value) -> bool {
        match SessionField::from_key(key, value) {
            Ok(field) => self.update_session_key(field),
            Err(e) => {
                error!("Cannot update session key '{}': {}", key, e);
                false
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.read_state().logged_in
    }

    /// Client key pair presented on every request
    pub fn keys(&self) -> HandshakeKeyPair {
        self.read_state().record.keys.clone()
    }

    pub fn device_id(&self) -> String {
        self.read_state().record.device_id.clone()
    }

    pub fn authorization(&self) -> String {
        self.read_state().record.authorization.clone()
    }

    /// Storage shared with other local components
    pub fn storage(&self) -> Arc<dyn SessionStorage> {
        Arc::clone(&self.storage)
    }

    /// Apply one update, carrying a replaced key pair over to the identity
    ///
    /// A device id derived from the old public key follows the new one.
    fn apply_field(state: &mut SessionState, field: SessionField) {
        if let SessionField::Keys(keys) = &field {
            if state.record.device_id == state.identity.public_key {
                state.record.device_id = keys.public_key.clone();
            }
            state.identity = keys.clone();
            info!("Session key pair replaced");
        }
        state.record.apply(field);
    }

    fn persist(&self, state: &mut SessionState) {
        state.record.is_logged_in = state.logged_in;
        let expires_at = Utc::now() + Duration::days(self.config.ttl_days);

        let signed = token::issue(
            &state.record,
            state.logged_in,
            &self.config.secret,
            expires_at,
        );
        let token = match signed {
            Ok(token) => token,
            Err(e) => {
                error!("Failed to sign session token: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(SESSION_KEY, &token) {
            error!("Failed to persist session: {}", e);
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
