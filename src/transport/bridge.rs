//! `reqwest`-backed transport talking to the local bridge process.

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::header::CONTENT_TYPE;

use super::{RawResult, RequestPayload, Transport};
use crate::config::{Config, BATCH_ENDPOINT, SINGLE_ENDPOINT};
use crate::error_handling::{ClientError, InitializationError, TransportError};

/// Transport that POSTs JSON payloads to the bridge's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct BridgeTransport {
    client: reqwest::Client,
    base_url: String,
}

impl BridgeTransport {
    /// Creates a transport for the bridge described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        let client = reqwest::ClientBuilder::new().no_proxy().build()?;
        Ok(Self::with_client(client, config.bridge_base_url()))
    }

    /// Creates a transport from an existing client and a base URL such as
    /// `http://127.0.0.1:8215`.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, endpoint: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("POST {url} ({} bytes)", body.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            // The bridge reports its own failures (bad proxy, unsupported
            // browser, ...) as non-2xx with a plain text message.
            return Err(TransportError::Client(ClientError::Bridge {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).trim().to_string(),
            }));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    async fn execute(&self, payload: &RequestPayload) -> Result<RawResult, TransportError> {
        debug!("Sending {} {} through bridge", payload.method, payload.url);
        let body = serde_json::to_vec(payload)?;
        let bytes = self.post(SINGLE_ENDPOINT, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute_batch(
        &self,
        payloads: &[RequestPayload],
    ) -> Result<Vec<RawResult>, TransportError> {
        debug!("Sending batch of {} requests through bridge", payloads.len());
        let body = serde_json::to_vec(payloads)?;
        let bytes = self.post(BATCH_ENDPOINT, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
