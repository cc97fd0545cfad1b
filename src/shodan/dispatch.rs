//! Request dispatch against the Shodan REST API.
//!
//! [`RestDispatcher`] issues exactly one request per call and sorts the
//! outcome into three buckets: a successful body, a recoverable remote
//! failure (`404` and `400`, which batch callers skip), or an error.

use crate::shodan::transport::{OutboundRequest, Transport, TransportError};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info_span, warn, Instrument, Span};
use wreq::{Method, StatusCode};

/// Base URI of the public Shodan API.
pub const DEFAULT_BASE_URL: &str = "https://api.shodan.io";

/// Describes a single API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRequest {
    /// HTTP method, GET unless set otherwise
    pub method: Method,
    /// Path appended to the base URI
    pub path: String,
    /// Query parameters sent after the API key
    pub params: Vec<(String, String)>,
    /// Raw payload, only sent with POST
    pub body: Option<String>,
}

impl RestRequest {
    /// Creates a request with an explicit method.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), params: Vec::new(), body: None }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a POST request carrying `body`.
    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Method::POST, path).body(body)
    }

    /// Appends a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Sets the payload.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A remote failure the caller may skip over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub status: u16,
    pub message: String,
    pub body: String,
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.body)
    }
}

/// Outcome of a dispatch that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// 2xx with the raw response body
    Success(String),
    /// 404 or 400, returned as a value
    Recoverable(RemoteFailure),
}

impl Dispatched {
    /// Returns true for the recoverable variant.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Dispatched::Recoverable(_))
    }

    /// Returns the body, turning a recoverable failure into an error for
    /// callers that have nothing to skip to.
    pub fn into_body(self) -> Result<String, DispatchError> {
        match self {
            Dispatched::Success(body) => Ok(body),
            Dispatched::Recoverable(failure) => Err(DispatchError::Remote {
                status: failure.status,
                message: failure.message,
                body: failure.body,
            }),
        }
    }
}

/// Errors that abort the current operation.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request cannot be issued at all. Never retried.
    #[error("Unsupported HTTP method {0}")]
    Configuration(Method),

    /// The server answered with a status the caller cannot skip.
    #[error("{message}: {body}")]
    Remote { status: u16, message: String, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// HTTP status behind the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Human-readable status line used in error messages.
pub fn status_message(status: u16) -> String {
    match status {
        404 => "404 Resource Not Found".to_string(),
        400 => "400 Bad Request".to_string(),
        _ => match StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
            Some(reason) => format!("{} {}", status, reason),
            None => status.to_string(),
        },
    }
}

/// Issues authenticated requests against a fixed base URI.
pub struct RestDispatcher<T: Transport> {
    transport: T,
    base_url: String,
    api_key: String,
    span: Span,
}

impl<T: Transport> RestDispatcher<T> {
    /// Creates a dispatcher for the public API.
    pub fn new(transport: T, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            span: info_span!("shodan_dispatch"),
        }
    }

    /// Points the dispatcher at another base URI (for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Records every event of this dispatcher inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the wire request without sending it.
    pub fn build(&self, request: &RestRequest) -> Result<OutboundRequest, DispatchError> {
        let body = match request.method {
            Method::GET => None,
            Method::POST => request.body.clone(),
            _ => return Err(DispatchError::Configuration(request.method.clone())),
        };

        let mut url = format!(
            "{}/{}?key={}",
            self.base_url,
            request.path.trim_start_matches('/'),
            urlencoding::encode(&self.api_key)
        );
        for (key, value) in &request.params {
            url.push('&');
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        Ok(OutboundRequest { method: request.method.clone(), url, body })
    }

    /// Sends one request and classifies the answer.
    pub async fn dispatch(&self, request: RestRequest) -> Result<Dispatched, DispatchError> {
        self.send_and_classify(&request).instrument(self.span.clone()).await
    }

    async fn send_and_classify(&self, request: &RestRequest) -> Result<Dispatched, DispatchError> {
        let path = request.path.trim_start_matches('/');
        let outbound = match self.build(request) {
            Ok(outbound) => outbound,
            Err(e) => {
                error!("{} for Shodan dispatcher", e);
                return Err(e);
            }
        };

        // The URL carries the API key, so only the path is logged.
        debug!("{} /{}", outbound.method, path);

        let response = self.transport.send(&outbound).await?;
        if response.is_success() {
            return Ok(Dispatched::Success(response.body));
        }

        let message = status_message(response.status);
        match response.status {
            404 | 400 => {
                warn!("{} for /{}", message, path);
                Ok(Dispatched::Recoverable(RemoteFailure {
                    status: response.status,
                    message,
                    body: response.body,
                }))
            }
            status => Err(DispatchError::Remote { status, message, body: response.body }),
        }
    }
}
