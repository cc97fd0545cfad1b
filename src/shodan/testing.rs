//! In-memory transport for unit tests.

use crate::shodan::transport::{OutboundRequest, Transport, TransportError, TransportResponse};
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

type Reply = Result<TransportResponse, String>;

/// Answers by URL path and records every request it sees.
pub struct MockTransport {
    routes: Vec<(String, Reply)>,
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self { routes: Vec::new(), requests: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Answers `path` with the given status and body.
    pub fn route(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes.push((path.to_string(), Ok(TransportResponse::new(status, body))));
        self
    }

    /// Fails `path` below the HTTP layer.
    pub fn fail(mut self, path: &str, message: &str) -> Self {
        self.routes.push((path.to_string(), Err(message.to_string())));
        self
    }

    /// Handle to the request log, usable after the transport is moved.
    pub fn requests(&self) -> Arc<Mutex<Vec<OutboundRequest>>> {
        Arc::clone(&self.requests)
    }
}

fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let path = without_scheme.split_once('/').map(|(_, rest)| rest).unwrap_or("");
    path.split('?').next().unwrap_or("")
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let path = path_of(&request.url);
        match self.routes.iter().find(|(route, _)| route == path) {
            Some((_, Ok(response))) => Ok(response.clone()),
            Some((_, Err(message))) => Err(TransportError::Request(message.clone())),
            None => Ok(TransportResponse::new(404, r#"{"error":"no mock route"}"#)),
        }
    }
}

/// Records every event with the names of the spans it happened in.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<(Vec<String>, String)>>>);

impl CapturedEvents {
    /// Snapshot of (span names from root, rendered fields) per event.
    pub fn events(&self) -> Vec<(Vec<String>, String)> {
        self.0.lock().unwrap().clone()
    }
}

struct FieldText(String);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push_str(&format!("{}={:?} ", field.name(), value));
    }
}

impl<S> Layer<S> for CapturedEvents
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let spans = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
            .unwrap_or_default();
        let mut text = FieldText(String::new());
        event.record(&mut text);
        self.0.lock().unwrap().push((spans, text.0));
    }
}

#[test]
fn test_path_of() {
    assert_eq!(path_of("http://mock/shodan/host/1.1.1.1?key=k"), "shodan/host/1.1.1.1");
    assert_eq!(path_of("http://mock/api-info"), "api-info");
    assert_eq!(path_of("http://mock"), "");
}
