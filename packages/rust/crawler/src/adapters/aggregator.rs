//! Link-aggregator adapter.
//!
//! Aggregator pages list the real sources inside elements matched by a
//! CSS selector (`div.mainURL` by default). Each match's trimmed text is one
//! source link, in document order.

use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use timeline_shared::{Result, SourceLinks, TimelineError};

use super::SourceAdapter;

pub struct AggregatorAdapter {
    hosts: Vec<String>,
    selector: Selector,
}

impl AggregatorAdapter {
    pub fn new(hosts: Vec<String>, selector: &str) -> Result<Self> {
        let selector = Selector::parse(selector).map_err(|e| {
            TimelineError::config(format!("invalid link selector {selector:?}: {e}"))
        })?;

        let hosts = hosts
            .into_iter()
            .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        Ok(Self { hosts, selector })
    }
}

/// `host` is `domain` or one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

impl SourceAdapter for AggregatorAdapter {
    fn detect(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.hosts.iter().any(|domain| host_matches(&host, domain))
    }

    fn needs_page(&self) -> bool {
        true
    }

    fn extract(&self, reference: &str, page: Option<&str>) -> SourceLinks {
        let Some(body) = page else {
            warn!(url = %reference, "aggregator page missing, no links extracted");
            return Vec::new();
        };

        let doc = Html::parse_document(body);
        doc.select(&self.selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    }

    fn name(&self) -> &str {
        "aggregator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> AggregatorAdapter {
        AggregatorAdapter::new(vec!["linkmix.co".into()], "div.mainURL").unwrap()
    }

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn host_matching() {
        assert!(host_matches("linkmix.co", "linkmix.co"));
        assert!(host_matches("www.linkmix.co", "linkmix.co"));
        assert!(!host_matches("notlinkmix.co", "linkmix.co"));
        assert!(!host_matches("linkmix.co.evil.com", "linkmix.co"));
    }

    #[test]
    fn extracts_main_urls_in_document_order() {
        let page = load_fixture("aggregator.html");
        let links = adapter().extract("https://linkmix.co/9876543", Some(&page));
        assert_eq!(
            links,
            vec![
                "https://news.example.org/report".to_string(),
                "https://archive.example.net/report-mirror".to_string(),
            ]
        );
    }

    #[test]
    fn page_without_matches_yields_empty_list() {
        let links = adapter().extract(
            "https://linkmix.co/1",
            Some("<html><body><p>Nothing here</p></body></html>"),
        );
        assert!(links.is_empty());
    }

    #[test]
    fn detection_is_case_insensitive() {
        let url = Url::parse("https://LinkMix.CO/abc").unwrap();
        assert!(adapter().detect(&url));
    }
}
