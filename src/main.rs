//! shodan-cli - Small Shodan REST API client and CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use shodan_cli::commands::{
    HostCommand, InfoCommand, InfoKind, ScanCommand, SearchCommand, SearchKind,
};
use shodan_cli::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shodan-cli",
    version,
    about = "Small Shodan REST API client",
    long_about = "Query hosts, searches, scans and account data from the Shodan REST API."
)]
struct Cli {
    /// Shodan API key
    #[arg(long, global = true, env = "SHODAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "SHODAN_PROXY")]
    proxy: Option<String>,

    /// Skip TLS certificate verification (exposes the API key to interception)
    #[arg(long, global = true)]
    insecure: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up hosts by IP
    #[command(alias = "h")]
    Host {
        /// IP addresses (space or comma separated)
        #[arg(required = true)]
        ips: Vec<String>,
    },

    /// Count results for a query
    Count {
        /// Search query
        query: String,

        /// Facets to summarize (comma-separated)
        #[arg(long)]
        facets: Option<String>,
    },

    /// Search banners
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Facets to summarize (comma-separated)
        #[arg(long)]
        facets: Option<String>,
    },

    /// Show how Shodan parses a query
    Tokens {
        /// Search query
        query: String,
    },

    /// List ports Shodan crawls
    Ports,

    /// List protocols available for on-demand scans
    Protocols,

    /// Request an on-demand scan
    Scan {
        /// IP addresses (space or comma separated)
        #[arg(required = true)]
        ips: Vec<String>,
    },

    /// List services Shodan crawls
    Services,

    /// Show account profile
    Profile,

    /// Show your public IP address
    Myip,

    /// Show API plan and credits
    ApiInfo,

    /// Show honeypot probability for hosts
    Honeyscore {
        /// IP addresses (space or comma separated)
        #[arg(required = true)]
        ips: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(api_key) = cli.api_key {
        config.api_key = Some(api_key);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if cli.insecure {
        config.insecure = true;
    }

    let output = match cli.command {
        Commands::Host { ips } => HostCommand::new(config).execute(&ips).await?,
        Commands::Honeyscore { ips } => HostCommand::new(config).honeyscores(&ips).await?,
        Commands::Scan { ips } => ScanCommand::new(config).execute(&ips).await?,

        Commands::Count { query, facets } => {
            SearchCommand::new(config, SearchKind::Count).execute(&query, facets.as_deref()).await?
        }
        Commands::Search { query, facets } => {
            SearchCommand::new(config, SearchKind::Search).execute(&query, facets.as_deref()).await?
        }
        Commands::Tokens { query } => {
            SearchCommand::new(config, SearchKind::Tokens).execute(&query, None).await?
        }

        Commands::Ports => InfoCommand::new(config, InfoKind::Ports).execute().await?,
        Commands::Protocols => InfoCommand::new(config, InfoKind::Protocols).execute().await?,
        Commands::Services => InfoCommand::new(config, InfoKind::Services).execute().await?,
        Commands::Profile => InfoCommand::new(config, InfoKind::Profile).execute().await?,
        Commands::Myip => InfoCommand::new(config, InfoKind::MyIp).execute().await?,
        Commands::ApiInfo => InfoCommand::new(config, InfoKind::ApiInfo).execute().await?,
    };

    println!("{}", output);

    Ok(())
}
