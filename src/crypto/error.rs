// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Error type for the handshake and payload-decryption helpers.
//!
//! ## Error Variants
//!
//! - **DecryptionFailed**: AES-GCM decryption failed (wrong secret, corrupted ciphertext, tag mismatch)
//! - **EncryptionFailed**: AES-GCM encryption failed
//! - **InvalidKey**: Key material is malformed (wrong size, invalid curve point, bad hex)
//! - **KeyDerivationFailed**: ECDH or HKDF derivation failed
//! - **InvalidPayload**: Ciphertext envelope is malformed (bad base64, too short, not UTF-8)
//!
//! Every variant carries enough context to tell which stage of a response
//! failed, so callers can log it and drop the response as a whole.

use std::fmt;

/// Error type for all cryptographic operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD decryption failed
    ///
    /// This error occurs when:
    /// - Authentication tag verification fails (ciphertext tampered or wrong secret)
    /// - The secret was derived from a different handshake than the payload
    DecryptionFailed {
        /// Which operation was being performed
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// AEAD encryption failed
    EncryptionFailed {
        /// Which operation was being performed
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// Invalid cryptographic key
    InvalidKey {
        /// Type of key that failed (e.g., "client_private_key", "server_handshake")
        key_type: String,
        /// Specific failure reason
        reason: String,
    },

    /// Key derivation failed (ECDH or HKDF)
    KeyDerivationFailed {
        /// Which key derivation operation failed
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// Encrypted payload validation failed
    InvalidPayload {
        /// Which field failed validation
        field: String,
        /// Specific failure reason
        reason: String,
    },
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::DecryptionFailed { operation, reason } => {
                write!(f, "Decryption failed during {}: {}", operation, reason)
            }
            CryptoError::EncryptionFailed { operation, reason } => {
                write!(f, "Encryption failed during {}: {}", operation, reason)
            }
            CryptoError::InvalidKey { key_type, reason } => {
                write!(f, "Invalid key ({}): {}", key_type, reason)
            }
            CryptoError::KeyDerivationFailed { operation, reason } => {
                write!(f, "Key derivation failed during {}: {}", operation, reason)
            }
            CryptoError::InvalidPayload { field, reason } => {
                write!(f, "Invalid payload field '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for CryptoError {}

// Conversion from hex decode errors
impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        CryptoError::InvalidKey {
            key_type: "hex_key".to_string(),
            reason: format!("hex decode error: {}", err),
        }
    }
}

// Conversion from base64 decode errors
impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::InvalidPayload {
            field: "ciphertext".to_string(),
            reason: format!("base64 decode error: {}", err),
        }
    }
}

// Conversion from k256 errors (elliptic curve operations)
impl From<k256::elliptic_curve::Error> for CryptoError {
    fn from(err: k256::elliptic_curve::Error) -> Self {
        CryptoError::InvalidKey {
            key_type: "unknown".to_string(),
            reason: format!("k256 error: {}", err),
        }
    }
}
