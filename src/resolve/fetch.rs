//! Blob fetch capability.
//!
//! The resolver only sees the [`BlobFetcher`] trait; the HTTP implementation
//! talks to a blob-storage aggregator. Tests substitute an in-memory fetcher.

use std::time::Duration;

use crate::resolve::ContentId;
use crate::settings::Settings;
use crate::util::{Error, Result};

/// Raw bytes fetched for a content identifier, plus the response's declared
/// content type when the transport provided one.
#[derive(Debug, Clone)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub declared_type: Option<String>,
}

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, declared_type: None }
    }

    pub fn with_type(bytes: Vec<u8>, declared_type: impl Into<String>) -> Self {
        Self { bytes, declared_type: Some(declared_type.into()) }
    }
}

/// Capability to read a blob by identifier.
///
/// `Send + Sync` so a resolver session can run fetches on its worker thread.
pub trait BlobFetcher: Send + Sync {
    /// Issue a single read for `id`.
    ///
    /// Non-success status maps to [`Error::Fetch`], transport failure to
    /// [`Error::Network`]. Never retried at this layer.
    fn fetch(&self, id: &ContentId) -> Result<Payload>;
}

/// Fetcher reading `GET {aggregator}/v1/blobs/{id}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher against an aggregator base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::network)?;
        Ok(Self { client, base_url: base_url.into() })
    }

    /// Create a fetcher from persistent settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.aggregator_base_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Full URL a given identifier resolves against.
    pub fn blob_url(&self, id: &ContentId) -> String {
        format!("{}/v1/blobs/{}", self.base_url.trim_end_matches('/'), id)
    }
}

impl BlobFetcher for HttpFetcher {
    fn fetch(&self, id: &ContentId) -> Result<Payload> {
        let url = self.blob_url(id);
        tracing::debug!(%url, "fetching blob");

        let response = self.client.get(&url).send().map_err(Error::network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch { status: status.as_u16() });
        }

        let declared_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.bytes().map_err(Error::network)?.to_vec();
        tracing::debug!(len = bytes.len(), declared_type = ?declared_type, "blob fetched");

        Ok(Payload { bytes, declared_type })
    }
}
