//! Shodan REST API: transport, dispatcher, operations and response models.

pub mod client;
pub mod dispatch;
pub mod models;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ShodanClient;
pub use dispatch::{DispatchError, Dispatched, RemoteFailure, RestDispatcher, RestRequest};
pub use models::{HoneyScore, HostSummary, SearchResults};
pub use transport::{Transport, TransportOptions, WreqTransport};
