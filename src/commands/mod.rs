//! CLI command implementations.

pub mod host;
pub mod info;
pub mod scan;
pub mod search;

pub use host::HostCommand;
pub use info::{InfoCommand, InfoKind};
pub use scan::ScanCommand;
pub use search::{SearchCommand, SearchKind};
