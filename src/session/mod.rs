// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client session state
//!
//! - **Record**: typed session record and field updates
//! - **Token**: signed, time-bound persistence format
//! - **Storage**: durable key/value backends
//! - **Store**: the session store threaded through every caller

pub mod error;
pub mod record;
pub mod storage;
pub mod store;
pub mod token;

pub use error::SessionError;
pub use record::{PaymentDraft, Sender, SessionField, SessionRecord, Transaction, User, Wallet};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::{SessionStore, SESSION_KEY};
