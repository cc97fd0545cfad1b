//! Output formatting for Shodan results (table, JSON).

use crate::config::OutputFormat;
use crate::shodan::models::{HoneyScore, HostSummary, SearchResults};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const TITLE_WIDTH: usize = 40;

/// Formats API results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats host lookups.
    pub fn format_hosts(&self, hosts: &[Value]) -> String {
        match self.format {
            OutputFormat::Json => json(hosts, "[]"),
            OutputFormat::Table if hosts.is_empty() => "No hosts found.".to_string(),
            OutputFormat::Table => {
                match hosts.iter().map(HostSummary::from_value).collect::<Result<Vec<_>, _>>() {
                    Ok(summaries) => table_hosts(&summaries),
                    Err(e) => {
                        debug!("Unexpected host shape, showing raw JSON: {}", e);
                        json(hosts, "[]")
                    }
                }
            }
        }
    }

    /// Formats search or count results, with facet summaries if present.
    pub fn format_search(&self, results: &Value) -> String {
        match self.format {
            OutputFormat::Json => json(results, "{}"),
            OutputFormat::Table => match SearchResults::from_value(results) {
                Ok(parsed) => table_search(&parsed),
                Err(e) => {
                    debug!("Unexpected search shape, showing raw JSON: {}", e);
                    json(results, "{}")
                }
            },
        }
    }

    /// Formats honeypot scores.
    pub fn format_honeyscores(&self, scores: &[HoneyScore]) -> String {
        match self.format {
            OutputFormat::Json => json(scores, "[]"),
            OutputFormat::Table if scores.is_empty() => "No scores found.".to_string(),
            OutputFormat::Table => {
                let mut lines = Vec::new();
                lines.push(format!("{:<39}  {}", "IP", "Score"));
                lines.push(format!("{:-<39}  {:-<5}", "", ""));
                for score in scores {
                    lines.push(format!("{:<39}  {:.1}", score.ip, score.score));
                }
                lines.join("\n")
            }
        }
    }

    /// Formats a plain-text answer such as the caller's public IP.
    pub fn format_text(&self, text: &str) -> String {
        match self.format {
            OutputFormat::Json => json(&text, "\"\""),
            OutputFormat::Table => text.to_string(),
        }
    }

    /// Formats any other JSON answer.
    pub fn format_value(&self, value: &Value) -> String {
        match self.format {
            OutputFormat::Json => json(value, "null"),
            OutputFormat::Table => table_value(value),
        }
    }
}

fn json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn table_hosts(hosts: &[HostSummary]) -> String {
    let mut lines = Vec::new();

    lines.push(format!("{:<15}  {:<24}  {:<12}  {}", "IP", "Organization", "OS", "Ports"));
    lines.push(format!("{:-<15}  {:-<24}  {:-<12}  {:-<20}", "", "", "", ""));

    for host in hosts {
        let ports = host.ports.iter().map(u16::to_string).collect::<Vec<_>>().join(",");
        lines.push(format!(
            "{:<15}  {:<24}  {:<12}  {}",
            host.ip_str,
            truncate(host.org.as_deref().unwrap_or("N/A"), 24),
            truncate(host.os.as_deref().unwrap_or("N/A"), 12),
            ports
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total: {} hosts", hosts.len()));

    lines.join("\n")
}

fn table_search(results: &SearchResults) -> String {
    let mut lines = vec![format!("Total results: {}", results.total)];

    if !results.matches.is_empty() {
        lines.push(String::new());
        lines.push(format!("{:<15}  {:>5}  {:<24}  {}", "IP", "Port", "Organization", "Product"));
        lines.push(format!("{:-<15}  {:-<5}  {:-<24}  {:-<40}", "", "", "", ""));
        for m in &results.matches {
            lines.push(format!(
                "{:<15}  {:>5}  {:<24}  {}",
                m.ip_str,
                m.port,
                truncate(m.org.as_deref().unwrap_or("N/A"), 24),
                truncate(m.product.as_deref().unwrap_or(""), TITLE_WIDTH)
            ));
        }
    }

    for (facet, buckets) in &results.facets {
        lines.push(String::new());
        lines.push(format!("Top {}:", facet));
        for bucket in buckets {
            let value = match &bucket.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("  {:<30} {:>10}", truncate(&value, 30), bucket.count));
        }
    }

    lines.join("\n")
}

fn table_value(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => "(empty)".to_string(),
        Value::Object(map) => {
            let width = map.keys().map(|k| k.len()).max().unwrap_or(0);
            map.iter()
                .map(|(key, v)| format!("{:<width$}  {}", key, scalar(v)))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => {
            items.iter().map(scalar).collect::<Vec<_>>().join(", ")
        }
        other => json(other, "null"),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "N/A".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hosts_table() {
        let hosts = vec![
            json!({"ip_str": "1.1.1.1", "org": "Cloudflare", "ports": [53, 80]}),
            json!({"ip_str": "8.8.8.8", "org": "Google LLC", "os": "Linux", "ports": [53]}),
        ];

        let output = Formatter::new(OutputFormat::Table).format_hosts(&hosts);
        assert!(output.contains("1.1.1.1"));
        assert!(output.contains("Cloudflare"));
        assert!(output.contains("53,80"));
        assert!(output.contains("Linux"));
        assert!(output.contains("Total: 2 hosts"));
    }

    #[test]
    fn test_hosts_empty() {
        assert_eq!(Formatter::new(OutputFormat::Table).format_hosts(&[]), "No hosts found.");
        assert_eq!(Formatter::new(OutputFormat::Json).format_hosts(&[]), "[]");
    }

    #[test]
    fn test_hosts_json() {
        let hosts = vec![json!({"ip_str": "1.1.1.1"})];
        let output = Formatter::new(OutputFormat::Json).format_hosts(&hosts);
        assert!(output.starts_with('['));
        assert!(output.contains("\"ip_str\": \"1.1.1.1\""));
    }

    #[test]
    fn test_hosts_mistyped_field_falls_back_to_json() {
        let hosts = vec![json!({"ip_str": "1.1.1.1", "org": 42, "ports": [22]})];

        let output = Formatter::new(OutputFormat::Table).format_hosts(&hosts);
        assert!(output.starts_with('['));
        assert!(output.contains("\"org\": 42"));
        assert!(!output.contains("Total:"));
    }

    #[test]
    fn test_search_mistyped_total_falls_back_to_json() {
        let results = json!({"total": "many", "matches": []});

        let output = Formatter::new(OutputFormat::Table).format_search(&results);
        assert!(output.contains("\"total\": \"many\""));
        assert!(!output.contains("Total results: 0"));
    }

    #[test]
    fn test_search_table_with_facets() {
        let results = json!({
            "total": 2,
            "matches": [{"ip_str": "3.3.3.3", "port": 22, "product": "OpenSSH"}],
            "facets": {"country": [{"value": "US", "count": 2}]}
        });

        let output = Formatter::new(OutputFormat::Table).format_search(&results);
        assert!(output.starts_with("Total results: 2"));
        assert!(output.contains("OpenSSH"));
        assert!(output.contains("Top country:"));
        assert!(output.contains("US"));
    }

    #[test]
    fn test_honeyscores_table() {
        let scores = vec![HoneyScore { ip: "1.1.1.1".to_string(), score: 0.3 }];
        let output = Formatter::new(OutputFormat::Table).format_honeyscores(&scores);
        assert!(output.contains("1.1.1.1"));
        assert!(output.contains("0.3"));
    }

    #[test]
    fn test_text_formats() {
        assert_eq!(Formatter::new(OutputFormat::Table).format_text("9.9.9.9"), "9.9.9.9");
        assert_eq!(Formatter::new(OutputFormat::Json).format_text("9.9.9.9"), "\"9.9.9.9\"");
    }

    #[test]
    fn test_value_table() {
        let formatter = Formatter::new(OutputFormat::Table);

        let output = formatter.format_value(&json!({"plan": "dev", "credits": 10, "display_name": null}));
        assert!(output.contains("plan"));
        assert!(output.contains("dev"));
        assert!(output.contains("N/A"));

        assert_eq!(formatter.format_value(&json!([22, 80, 443])), "22, 80, 443");
        assert_eq!(formatter.format_value(&json!({})), "(empty)");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long organization name", 10), "a very ...");
    }
}
