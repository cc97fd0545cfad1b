//! Account and reference-data commands that take no arguments.

use crate::config::Config;
use crate::format::Formatter;
use crate::shodan::{ShodanClient, Transport};
use anyhow::Result;

/// Which argument-less endpoint to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    Ports,
    Protocols,
    Services,
    Profile,
    MyIp,
    ApiInfo,
}

/// Fetches one piece of account or reference data.
pub struct InfoCommand {
    config: Config,
    kind: InfoKind,
}

impl InfoCommand {
    /// Creates a new info command.
    pub fn new(config: Config, kind: InfoKind) -> Self {
        Self { config, kind }
    }

    /// Fetches the data and returns formatted output.
    pub async fn execute(&self) -> Result<String> {
        let client = ShodanClient::new(&self.config)?;
        self.execute_with_client(&client).await
    }

    /// Fetches the data with a provided client (for testing).
    pub async fn execute_with_client<T: Transport>(&self, client: &ShodanClient<T>) -> Result<String> {
        let formatter = Formatter::new(self.config.format);

        let value = match self.kind {
            InfoKind::Ports => client.ports().await?,
            InfoKind::Protocols => client.protocols().await?,
            InfoKind::Services => client.services().await?,
            InfoKind::Profile => client.profile().await?,
            InfoKind::ApiInfo => client.api_info().await?,
            InfoKind::MyIp => return Ok(formatter.format_text(&client.my_ip().await?)),
        };

        Ok(formatter.format_value(&value))
    }
}
