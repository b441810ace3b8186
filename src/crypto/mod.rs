// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Handshake and Payload Encryption
//!
//! Cryptographic helpers used to talk to the remote API:
//!
//! - **Handshake**: per-client secp256k1 key pair and per-response secret
//!   derivation (ECDH + HKDF-SHA256)
//! - **Cipher**: AES-256-GCM decryption of server payloads and encryption of
//!   the local device session
//!
//! ## Protocol Flow
//!
//! 1. Client generates its key pair once and persists it with the session
//! 2. Each request carries the client public key in `x-rojifi-handshake`
//! 3. Each successful response carries a server handshake value
//! 4. Client derives the secret from its private key and that value
//! 5. Client decrypts `data` with the secret and parses the JSON

pub mod cipher;
pub mod error;
pub mod handshake;

pub use cipher::{decrypt, encrypt};
pub use error::CryptoError;
pub use handshake::{generate, local_key, secret, HandshakeKeyPair};
