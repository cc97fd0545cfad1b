//! Host lookup and honeyscore commands.

use crate::config::Config;
use crate::format::Formatter;
use crate::shodan::client::normalize_targets;
use crate::shodan::{ShodanClient, Transport};
use anyhow::Result;
use tracing::info;

/// Looks up hosts by IP.
pub struct HostCommand {
    config: Config,
}

impl HostCommand {
    /// Creates a new host command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Looks up the given IPs and returns formatted output.
    pub async fn execute(&self, targets: &[String]) -> Result<String> {
        let client = ShodanClient::new(&self.config)?;
        self.execute_with_client(&client, targets).await
    }

    /// Looks up the given IPs with a provided client (for testing).
    pub async fn execute_with_client<T: Transport>(
        &self,
        client: &ShodanClient<T>,
        targets: &[String],
    ) -> Result<String> {
        let targets = normalize_targets(targets);
        if targets.is_empty() {
            anyhow::bail!("No target IPs given");
        }

        let hosts = if let [ip] = targets.as_slice() {
            match client.host(ip).await? {
                Some(host) => vec![host],
                None => {
                    info!("No information available for {}", ip);
                    Vec::new()
                }
            }
        } else {
            client.services_by_ips(&targets).await?
        };

        Ok(Formatter::new(self.config.format).format_hosts(&hosts))
    }

    /// Fetches honeypot probabilities and returns formatted output.
    pub async fn honeyscores(&self, targets: &[String]) -> Result<String> {
        let client = ShodanClient::new(&self.config)?;
        self.honeyscores_with_client(&client, targets).await
    }

    /// Fetches honeypot probabilities with a provided client (for testing).
    pub async fn honeyscores_with_client<T: Transport>(
        &self,
        client: &ShodanClient<T>,
        targets: &[String],
    ) -> Result<String> {
        let scores = client.honeyscores(targets).await?;
        Ok(Formatter::new(self.config.format).format_honeyscores(&scores))
    }
}
