//! HTTP-backed collaborators.
//!
//! Failures are tagged at the point of failure: transport and timeout
//! problems become `Network`, server-side record-store failures become
//! `Storage`, malformed requests become `Validation`, and generation-service
//! failure bodies (quota, api key, safety) become `RemoteGeneration` via the
//! message classifier.

use async_trait::async_trait;
use bytes::Bytes;
use loadstone_config::SourcesConfig;
use loadstone_core::{BinaryLoader, FetchError, RecordDetail, RecordList, RecordStore};
use loadstone_resilience::with_timeout;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Record store speaking to the remote project API.
pub struct HttpRecordStore {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRecordStore {
    /// Create a record store for `endpoint`.
    ///
    /// # Errors
    /// Returns `FetchError::Unknown` if the HTTP client cannot be created
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| FetchError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create a record store from the application config section
    ///
    /// # Errors
    /// Returns `FetchError::Unknown` if the HTTP client cannot be created
    pub fn from_config(config: &SourcesConfig) -> Result<Self, FetchError> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(url, "Record store request");

        let mut request = self.client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url, status = status.as_u16(), "Record store error response");
            return Err(error_for_status(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::unknown(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn load_list(&self) -> Result<RecordList, FetchError> {
        self.get_json(&format!("{}/records", self.endpoint)).await
    }

    async fn load_detail(&self, id: &str) -> Result<RecordDetail, FetchError> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(FetchError::validation(
                format!("malformed record id: {id:?}"),
                Some("id".to_string()),
            ));
        }
        self.get_json(&format!("{}/records/{id}", self.endpoint)).await
    }
}

/// Binary loader fetching image bytes over HTTP.
///
/// The per-attempt timeout is applied here, at the loader, so a hung attempt
/// surfaces as a retryable `Network` failure.
pub struct HttpBinaryLoader {
    client: Client,
}

impl HttpBinaryLoader {
    /// Create a binary loader.
    ///
    /// # Errors
    /// Returns `FetchError::Unknown` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .build()
            .map_err(|e| FetchError::unknown(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BinaryLoader for HttpBinaryLoader {
    async fn load_binary(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError> {
        let client = self.client.clone();
        let owned_url = url.to_string();

        with_timeout(timeout, async move {
            debug!(url = %owned_url, "Binary load");

            let response = client
                .get(&owned_url)
                .send()
                .await
                .map_err(map_transport_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::network(format!(
                    "failed to fetch {owned_url}: HTTP {status}"
                )));
            }

            response
                .bytes()
                .await
                .map_err(|e| FetchError::network(format!("failed to read body: {e}")))
        })
        .await
    }
}

fn map_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() || err.is_connect() {
        FetchError::network(format!("request failed: {err}"))
    } else if err.is_decode() {
        FetchError::unknown(format!("response decode failed: {err}"))
    } else {
        FetchError::network(format!("transport error: {err}"))
    }
}

fn error_for_status(status: StatusCode, body: &str) -> FetchError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return FetchError::storage(format!("record store failed ({status}): {body}"));
    }

    // Generation-service failures come back through the record API with
    // recognizable wording; everything else client-side is a bad request
    match FetchError::classify_message(body) {
        err @ FetchError::RemoteGeneration { .. } => err,
        _ => FetchError::validation(format!("{status}: {body}"), None),
    }
}
