//! HTTP transport for the Shodan REST API, backed by wreq.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use wreq::{Client, Method};

/// Content type sent with every API request.
pub const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// A fully built request, ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// HTTP method (only GET and POST ever reach a transport)
    pub method: Method,
    /// Full URL including the encoded query string
    pub url: String,
    /// Raw payload, only ever set for POST
    pub body: Option<String>,
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP status layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Trait for issuing a single HTTP request - enables mocking for tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns whatever status the server answered with.
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// Knobs for the underlying HTTP client.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Proxy URL (e.g., socks5://host:port)
    pub proxy: Option<String>,
    /// Skip TLS certificate verification. Exposes the API key to any
    /// man-in-the-middle, so it is off unless explicitly requested.
    pub accept_invalid_certs: bool,
}

/// Production transport using wreq.
pub struct WreqTransport {
    client: Client,
}

impl WreqTransport {
    /// Creates a transport with the given options.
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        let mut builder = Client::builder().gzip(true).brotli(true);

        if let Some(proxy_url) = &options.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url)
                .map_err(|e| TransportError::Build(format!("invalid proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        if options.accept_invalid_certs {
            warn!("TLS certificate verification is disabled; the API key can be intercepted");
            builder = builder.cert_verification(false);
        }

        let client = builder.build().map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for WreqTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str())
            .header("Content-Type", CONTENT_TYPE);

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body = response.text().await.map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
