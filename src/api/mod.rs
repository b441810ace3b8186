// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod client;
pub mod defaults;
pub mod errors;
pub mod response;

pub use client::{ApiClient, Receipt};
pub use defaults::{
    default_headers, parse_data, ApiConfig, DEFAULT_BASE_URL, DEVICE_ID_HEADER, HANDSHAKE_HEADER,
};
pub use errors::{ApiError, ApiResult, UNPROCESSABLE_RESPONSE};
pub use response::{ApiResponse, EncryptedPayload, Pagination, STATUS_SUCCESS};
