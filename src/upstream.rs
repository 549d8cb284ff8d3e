use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::HeaderTemplate;

/// Largest upstream body read into memory. Player payloads are a few KiB.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Raw response from one upstream call.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Outbound HTTP seam used by the prober.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration)
        -> Result<UpstreamResponse, TransportError>;

    /// Status-only request; the body is left empty.
    async fn head(&self, url: &str, timeout: Duration)
        -> Result<UpstreamResponse, TransportError>;
}

/// `reqwest`-backed transport that sends the configured browser-like headers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpTransport {
    pub fn new(template: &HeaderTemplate) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &template.headers {
            let name = HeaderName::from_static(*name);
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("invalid header {name}: {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: MAX_BODY_BYTES,
        })
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Reads the body chunk by chunk, giving up as soon as it passes the limit.
    async fn read_body(&self, mut resp: reqwest::Response) -> Result<String, TransportError> {
        let limit = self.max_body_bytes;
        if resp.content_length().is_some_and(|len| len > limit as u64) {
            return Err(TransportError::BodyTooLarge { limit });
        }

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if buf.len() + chunk.len() > limit {
                return Err(TransportError::BodyTooLarge { limit });
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<UpstreamResponse, TransportError> {
        let resp = self.client.get(url).timeout(timeout).send().await?;
        let status = resp.status().as_u16();
        let body = self.read_body(resp).await?;

        Ok(UpstreamResponse { status, body })
    }

    async fn head(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<UpstreamResponse, TransportError> {
        let resp = self.client.head(url).timeout(timeout).send().await?;

        Ok(UpstreamResponse {
            status: resp.status().as_u16(),
            body: String::new(),
        })
    }
}
