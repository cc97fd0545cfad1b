//! Caller-facing Shodan operations built on [`RestDispatcher`].

use crate::config::Config;
use crate::shodan::dispatch::{Dispatched, RestDispatcher, RestRequest};
use crate::shodan::models::HoneyScore;
use crate::shodan::transport::{Transport, TransportOptions, WreqTransport};
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn, Span};

/// Shodan API client. Generic over the transport so tests can swap it out.
pub struct ShodanClient<T: Transport = WreqTransport> {
    dispatcher: RestDispatcher<T>,
}

impl ShodanClient<WreqTransport> {
    /// Creates a client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let options = TransportOptions {
            proxy: config.proxy.clone(),
            accept_invalid_certs: config.insecure,
        };
        let transport = WreqTransport::new(&options).context("Failed to create HTTP client")?;

        Ok(Self::with_transport(transport, &api_key)?.with_base_url(&config.base_url))
    }
}

impl<T: Transport> ShodanClient<T> {
    /// Creates a client over an arbitrary transport.
    pub fn with_transport(transport: T, api_key: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            anyhow::bail!("Shodan API key must not be empty");
        }

        Ok(Self { dispatcher: RestDispatcher::new(transport, api_key) })
    }

    /// Overrides the API base URI.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.dispatcher = self.dispatcher.with_base_url(base_url);
        self
    }

    /// Records the dispatcher's events inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.dispatcher = self.dispatcher.with_span(span);
        self
    }

    pub fn dispatcher(&self) -> &RestDispatcher<T> {
        &self.dispatcher
    }

    /// Dispatches a call that has no item to skip and parses the JSON body.
    async fn fetch_json(&self, request: RestRequest, what: &str) -> Result<Value> {
        let body = self.dispatcher.dispatch(request).await?.into_body()?;
        serde_json::from_str(&body).with_context(|| format!("Failed to parse {} response", what))
    }

    /// Runs one GET per target, skipping targets the API reports as
    /// missing or malformed. Any other failure aborts the whole batch.
    async fn for_each_target<R>(
        &self,
        targets: &[String],
        path_prefix: &str,
        mut parse: impl FnMut(&str, String) -> Result<R>,
    ) -> Result<Vec<R>> {
        let mut results = Vec::with_capacity(targets.len());

        for target in targets {
            let request = RestRequest::get(format!("{}/{}", path_prefix, urlencoding::encode(target)));
            match self.dispatcher.dispatch(request).await? {
                Dispatched::Success(body) => results.push(parse(target, body)?),
                Dispatched::Recoverable(failure) => {
                    warn!("Skipping {}: {}", target, failure);
                }
            }
        }

        Ok(results)
    }

    /// Looks up one host. Returns `None` when Shodan has nothing on it.
    pub async fn host(&self, ip: &str) -> Result<Option<Value>> {
        let ip = ip.trim();
        info!("Looking up host: {}", ip);

        let request = RestRequest::get(format!("shodan/host/{}", urlencoding::encode(ip)));
        match self.dispatcher.dispatch(request).await? {
            Dispatched::Success(body) => {
                let host = serde_json::from_str(&body)
                    .with_context(|| format!("Failed to parse host response for {}", ip))?;
                Ok(Some(host))
            }
            Dispatched::Recoverable(failure) => {
                debug!("No host data for {}: {}", ip, failure);
                Ok(None)
            }
        }
    }

    /// Looks up every host in `targets`, in order.
    pub async fn services_by_ips<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<Value>> {
        let targets = normalize_targets(targets);
        info!("Looking up {} hosts", targets.len());

        self.for_each_target(&targets, "shodan/host", |ip, body| {
            serde_json::from_str(&body)
                .with_context(|| format!("Failed to parse host response for {}", ip))
        })
        .await
    }

    /// Counts results for a query without returning matches.
    pub async fn count(&self, query: &str, facets: Option<&str>) -> Result<Value> {
        let request = search_request("shodan/host/count", query, facets)?;
        info!("Counting results for: {}", query.trim());
        self.fetch_json(request, "count").await
    }

    /// Searches banners.
    pub async fn search(&self, query: &str, facets: Option<&str>) -> Result<Value> {
        let request = search_request("shodan/host/search", query, facets)?;
        info!("Searching: {}", query.trim());
        self.fetch_json(request, "search").await
    }

    /// Breaks a query into the filters and terms Shodan understood.
    pub async fn tokens(&self, query: &str) -> Result<Value> {
        let request = search_request("shodan/host/search/tokens", query, None)?;
        self.fetch_json(request, "tokens").await
    }

    /// Lists the ports Shodan crawls.
    pub async fn ports(&self) -> Result<Value> {
        self.fetch_json(RestRequest::get("shodan/ports"), "ports").await
    }

    /// Lists protocols usable for on-demand scans.
    pub async fn protocols(&self) -> Result<Value> {
        self.fetch_json(RestRequest::get("shodan/protocols"), "protocols").await
    }

    /// Requests an on-demand scan of `targets`.
    pub async fn scan<S: AsRef<str>>(&self, targets: &[S]) -> Result<Value> {
        let targets = normalize_targets(targets);
        if targets.is_empty() {
            anyhow::bail!("No target IPs given for scan");
        }

        info!("Requesting scan of {} targets", targets.len());
        let request = RestRequest::post("shodan/scan", format!("ips={}", targets.join(",")));
        self.fetch_json(request, "scan").await
    }

    /// Lists the services Shodan crawls.
    pub async fn services(&self) -> Result<Value> {
        self.fetch_json(RestRequest::get("shodan/services"), "services").await
    }

    /// Fetches the account profile.
    pub async fn profile(&self) -> Result<Value> {
        self.fetch_json(RestRequest::get("account/profile"), "profile").await
    }

    /// Returns the caller's public IP as Shodan sees it.
    pub async fn my_ip(&self) -> Result<String> {
        let body = self.dispatcher.dispatch(RestRequest::get("tools/myip")).await?.into_body()?;
        Ok(body.trim().trim_matches('"').to_string())
    }

    /// Fetches plan and credit usage.
    pub async fn api_info(&self) -> Result<Value> {
        self.fetch_json(RestRequest::get("api-info"), "api-info").await
    }

    /// Fetches the honeypot probability of every host in `targets`.
    pub async fn honeyscores<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<HoneyScore>> {
        let targets = normalize_targets(targets);
        info!("Fetching honeyscores for {} hosts", targets.len());

        self.for_each_target(&targets, "labs/honeyscore", |ip, body| {
            let score = body
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid honeyscore for {}: {}", ip, body.trim()))?;
            Ok(HoneyScore { ip: ip.to_string(), score })
        })
        .await
    }
}

fn search_request(path: &str, query: &str, facets: Option<&str>) -> Result<RestRequest> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Search query must not be empty");
    }

    let mut request = RestRequest::get(path).param("query", query);
    if let Some(facets) = facets.map(str::trim).filter(|f| !f.is_empty()) {
        request = request.param("facets", facets);
    }
    Ok(request)
}

/// Splits comma-delimited target lists, strips all whitespace and drops
/// empty entries. Order is preserved.
pub fn normalize_targets<S: AsRef<str>>(targets: &[S]) -> Vec<String> {
    targets
        .iter()
        .flat_map(|t| t.as_ref().split(','))
        .map(|t| t.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|t| !t.is_empty())
        .collect()
}
