//! Typed views over Shodan JSON responses.
//!
//! The client hands back raw [`serde_json::Value`]s; these structs pick out
//! the handful of fields the CLI renders. Unknown fields are ignored and
//! missing ones fall back to defaults, since Shodan omits keys freely.
//! A field of the wrong type is reported rather than blanked.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Summary of a `shodan/host/<ip>` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSummary {
    /// IP address as a string
    pub ip_str: String,
    /// Owning organization
    pub org: Option<String>,
    /// Detected operating system
    pub os: Option<String>,
    /// Country name
    pub country_name: Option<String>,
    /// Open ports
    pub ports: Vec<u16>,
    /// Reverse DNS hostnames
    pub hostnames: Vec<String>,
}

impl HostSummary {
    /// Extracts a summary. Missing fields default; mistyped ones are an error.
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        serde_json::from_value(value.clone())
    }
}

/// One banner in a search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchMatch {
    pub ip_str: String,
    pub port: u16,
    pub transport: Option<String>,
    pub org: Option<String>,
    pub product: Option<String>,
}

/// A bucket in a facet summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetCount {
    pub value: Value,
    pub count: u64,
}

/// Result of `shodan/host/search` or `shodan/host/count`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    /// Total number of matching banners
    pub total: u64,
    /// Matches on this page (always empty for count)
    pub matches: Vec<SearchMatch>,
    /// Facet summaries keyed by facet name
    pub facets: BTreeMap<String, Vec<FacetCount>>,
}

impl SearchResults {
    /// Extracts search results. Missing fields default; mistyped ones are an error.
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        serde_json::from_value(value.clone())
    }
}

/// Honeypot probability for one IP, between 0.0 and 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoneyScore {
    pub ip: String,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_host_summary_from_full_value() {
        let value = json!({
            "ip_str": "1.1.1.1",
            "org": "Cloudflare",
            "os": null,
            "country_name": "Australia",
            "ports": [53, 80, 443],
            "hostnames": ["one.one.one.one"],
            "data": [{"port": 53}]
        });

        let host = HostSummary::from_value(&value).unwrap();
        assert_eq!(host.ip_str, "1.1.1.1");
        assert_eq!(host.org.as_deref(), Some("Cloudflare"));
        assert!(host.os.is_none());
        assert_eq!(host.ports, vec![53, 80, 443]);
        assert_eq!(host.hostnames, vec!["one.one.one.one"]);
    }

    #[test]
    fn test_host_summary_missing_fields() {
        let host = HostSummary::from_value(&json!({"ip_str": "2.2.2.2"})).unwrap();
        assert_eq!(host.ip_str, "2.2.2.2");
        assert!(host.ports.is_empty());
        assert!(host.org.is_none());
    }

    #[test]
    fn test_host_summary_wrong_shape_is_error() {
        assert!(HostSummary::from_value(&json!("not an object")).is_err());
    }

    #[test]
    fn test_host_summary_mistyped_field_is_error() {
        let err = HostSummary::from_value(&json!({"ip_str": "1.1.1.1", "org": 42})).unwrap_err();
        assert!(err.to_string().contains("invalid type"));
    }

    #[test]
    fn test_search_results_with_facets() {
        let value = json!({
            "total": 1234,
            "matches": [
                {"ip_str": "3.3.3.3", "port": 22, "transport": "tcp", "product": "OpenSSH"}
            ],
            "facets": {
                "country": [{"value": "US", "count": 1000}, {"value": "DE", "count": 234}]
            }
        });

        let results = SearchResults::from_value(&value).unwrap();
        assert_eq!(results.total, 1234);
        assert_eq!(results.matches.len(), 1);
        assert_eq!(results.matches[0].port, 22);
        assert_eq!(results.matches[0].product.as_deref(), Some("OpenSSH"));
        assert_eq!(results.facets["country"].len(), 2);
        assert_eq!(results.facets["country"][1].count, 234);
    }

    #[test]
    fn test_count_results_have_no_matches() {
        let results = SearchResults::from_value(&json!({"total": 7, "matches": []})).unwrap();
        assert_eq!(results.total, 7);
        assert!(results.matches.is_empty());
        assert!(results.facets.is_empty());
    }
}
