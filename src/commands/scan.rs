//! On-demand scan command.

use crate::config::Config;
use crate::format::Formatter;
use crate::shodan::{ShodanClient, Transport};
use anyhow::Result;

/// Submits IPs for an on-demand scan.
pub struct ScanCommand {
    config: Config,
}

impl ScanCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self, targets: &[String]) -> Result<String> {
        let client = ShodanClient::new(&self.config)?;
        self.execute_with_client(&client, targets).await
    }

    pub async fn execute_with_client<T: Transport>(
        &self,
        client: &ShodanClient<T>,
        targets: &[String],
    ) -> Result<String> {
        let response = client.scan(targets).await?;
        Ok(Formatter::new(self.config.format).format_value(&response))
    }
}
