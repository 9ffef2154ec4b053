//! HTTP client abstraction and utilities

use crate::constants::DEFAULT_TIMEOUT_SECS;
use crate::error;
use bytes::Bytes;
use colloquy_core::Error;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

/// Type alias for response streams
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// HTTP client abstraction
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a POST request
    async fn post(&self, url: &str, headers: HeaderMap, body: Value) -> Result<Value, Error>;

    /// Send a streaming POST request
    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<ResponseStream, Error>;
}

/// Default HTTP client implementation using reqwest
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new HTTP client with the default timeout
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP client with a custom whole-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(error::network_error)?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &Value,
    ) -> Result<reqwest::Response, Error> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(error::network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Endpoint rejected request with HTTP {}", status);
            return Err(Error::http_status(
                status.as_u16(),
                format!("HTTP {}: {}", status, text),
            ));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn post(&self, url: &str, headers: HeaderMap, body: Value) -> Result<Value, Error> {
        let response = self.send(url, headers, &body).await?;
        response.json().await.map_err(error::network_error)
    }

    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<ResponseStream, Error> {
        let response = self.send(url, headers, &body).await?;
        Ok(Box::pin(response.bytes_stream()))
    }
}

/// Helper to create common headers
pub fn create_headers(api_key: &str, additional: Option<HeaderMap>) -> Result<HeaderMap, Error> {
    if api_key.trim().is_empty() {
        return Err(Error::Configuration("API key must not be empty".to_string()));
    }

    let mut headers = HeaderMap::new();

    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| Error::Configuration(format!("Invalid API key: {}", e)))?,
    );

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/event-stream"));

    if let Some(additional) = additional {
        headers.extend(additional);
    }

    Ok(headers)
}
