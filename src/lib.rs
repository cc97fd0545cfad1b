//! shodan-cli - Small Shodan REST API client and CLI
//!
//! One dispatcher issues every request and decides which failures a
//! batch lookup may skip; the operations on top are thin.

pub mod commands;
pub mod config;
pub mod format;
pub mod shodan;

pub use config::Config;
pub use shodan::{DispatchError, Dispatched, RestDispatcher, RestRequest, ShodanClient};
