// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Authenticated client for the remote payments API
//!
//! Every call attaches the session's handshake, device id and bearer token,
//! then runs the response through the envelope check and `parse_data`.
//! Calls are independent: nothing is retried, de-duplicated or cancelled.

use super::defaults::{default_headers, ApiConfig};
use super::errors::{ApiError, ApiResult};
use super::response::{ApiResponse, Pagination};
use crate::session::SessionStore;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Receipt returned by a receipt endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum Receipt {
    /// Link to the stored document
    Url(String),
    /// Raw file body
    File {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    url: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: SessionStore) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        info!("API client configured: base_url={}", config.base_url);

        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn headers(&self) -> ApiResult<HeaderMap> {
        default_headers(&self.session.get_user_data())
    }

    /// GET `path` and decode the encrypted payload
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.config.endpoint(path);
        debug!("API GET {}", url);
        self.fetch(self.http.get(url)).await
    }

    /// GET a paginated listing, returning the page metadata alongside
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> ApiResult<(T, Option<Pagination>)> {
        let url = self.config.endpoint(path);
        debug!("API GET (paged) {}", url);

        let envelope = self.envelope(self.http.get(url)).await?;
        let pagination = envelope.pagination.clone();
        let data = envelope.decode(&self.session.keys())?;
        Ok((data, pagination))
    }

    /// POST a JSON body to `path` and decode the encrypted payload
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!("API POST {}", url);
        self.fetch(self.http.post(url).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.config.endpoint(path);
        debug!("API DELETE {}", url);
        self.fetch(self.http.delete(url)).await
    }

    /// DELETE a resource addressed by escaped path segments
    pub async fn delete_segments<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> ApiResult<T> {
        let url = self.config.endpoint_segments(segments)?;
        debug!("API DELETE {}", url);
        self.fetch(self.http.delete(url)).await
    }

    /// Multipart upload; returns the stored file's URL
    pub async fn upload(&self, path: &str, filename: &str, bytes: Vec<u8>) -> ApiResult<String> {
        let url = self.config.endpoint(path);
        debug!("API upload {} ({} bytes) to {}", filename, bytes.len(), url);

        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let uploaded: UploadedFile = self.fetch(self.http.post(url).multipart(form)).await?;
        Ok(uploaded.url)
    }

    /// Redirect URL that proxies `url` back as a download named `filename`
    pub fn download_url(&self, url: &str, filename: &str) -> ApiResult<String> {
        let mut download = Url::parse(&self.config.endpoint("download"))?;
        download
            .query_pairs_mut()
            .append_pair("url", url)
            .append_pair("filename", filename);
        Ok(download.into())
    }

    /// Fetch a receipt, which is either an encrypted link or the file itself
    pub async fn receipt(&self, path: &str) -> ApiResult<Receipt> {
        let url = self.config.endpoint(path);
        debug!("API GET receipt {}", url);

        let response = self.send(self.http.get(url)).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if content_type
            .as_deref()
            .map_or(false, |ct| ct.starts_with("application/json"))
        {
            let envelope = read_envelope(response).await?;
            let link: UploadedFile = envelope.decode(&self.session.keys())?;
            return Ok(Receipt::Url(link.url));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                message: format!("Request failed with status {}", status),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        Ok(Receipt::File {
            bytes,
            content_type,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let envelope = self.envelope(request).await?;
        envelope.decode(&self.session.keys())
    }

    async fn envelope(&self, request: RequestBuilder) -> ApiResult<ApiResponse> {
        let response = self.send(request).await?;
        read_envelope(response).await
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| {
                error!("API request failed: {}", e);
                ApiError::Transport(e)
            })
    }
}

async fn read_envelope(response: Response) -> ApiResult<ApiResponse> {
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<ApiResponse>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Err(ApiError::Api {
            message: format!("Request failed with status {}", status),
        }),
        Err(e) => Err(ApiError::Parse(e)),
    }
}
