//! Search, count and token commands.

use crate::config::Config;
use crate::format::Formatter;
use crate::shodan::{ShodanClient, Transport};
use anyhow::Result;

/// Which query endpoint to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Full search with matches
    Search,
    /// Totals and facets only
    Count,
    /// Query tokenization
    Tokens,
}

/// Runs a Shodan query.
pub struct SearchCommand {
    config: Config,
    kind: SearchKind,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config, kind: SearchKind) -> Self {
        Self { config, kind }
    }

    /// Executes the query and returns formatted output.
    pub async fn execute(&self, query: &str, facets: Option<&str>) -> Result<String> {
        let client = ShodanClient::new(&self.config)?;
        self.execute_with_client(&client, query, facets).await
    }

    /// Executes the query with a provided client (for testing).
    pub async fn execute_with_client<T: Transport>(
        &self,
        client: &ShodanClient<T>,
        query: &str,
        facets: Option<&str>,
    ) -> Result<String> {
        let formatter = Formatter::new(self.config.format);

        let output = match self.kind {
            SearchKind::Search => formatter.format_search(&client.search(query, facets).await?),
            SearchKind::Count => formatter.format_search(&client.count(query, facets).await?),
            SearchKind::Tokens => formatter.format_value(&client.tokens(query).await?),
        };

        Ok(output)
    }
}
