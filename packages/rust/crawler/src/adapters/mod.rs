//! Source adapters: how a reference URL becomes a list of source links.
//!
//! Most reference URLs already point at the source and are stored as-is.
//! Link-aggregator pages wrap one or more real sources and have to be
//! fetched and scraped first.

mod aggregator;
mod direct;

use url::Url;

use timeline_shared::{FetchPolicy, Result, SourceLinks};

pub use aggregator::AggregatorAdapter;
pub use direct::DirectAdapter;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Strategy for resolving one kind of reference URL.
///
/// Adapters are tried in priority order; [`DirectAdapter`] is the
/// always-last fallback.
pub trait SourceAdapter: Send + Sync {
    /// Whether this adapter handles `url`.
    fn detect(&self, url: &Url) -> bool;

    /// Whether [`extract`](Self::extract) needs the fetched page body.
    fn needs_page(&self) -> bool;

    /// Produce the source links for `reference`. `page` is the fetched body
    /// when [`needs_page`](Self::needs_page) is true.
    fn extract(&self, reference: &str, page: Option<&str>) -> SourceLinks;

    /// Human-readable adapter name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered adapters in priority order.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SourceAdapter>>,
    fallback: DirectAdapter,
}

impl AdapterRegistry {
    /// Build the registry for `policy`: the aggregator adapter first, direct last.
    ///
    /// Fails if the configured link selector is not valid CSS.
    pub fn from_policy(policy: &FetchPolicy) -> Result<Self> {
        let aggregator =
            AggregatorAdapter::new(policy.aggregator_hosts.clone(), &policy.link_selector)?;

        Ok(Self {
            adapters: vec![Box::new(aggregator)],
            fallback: DirectAdapter,
        })
    }

    /// Pick the adapter for a raw reference cell.
    ///
    /// Cells that do not parse as URLs are treated as direct links.
    pub fn detect(&self, reference: &str) -> &dyn SourceAdapter {
        if let Ok(url) = Url::parse(reference.trim()) {
            for adapter in &self.adapters {
                if adapter.detect(&url) {
                    return adapter.as_ref();
                }
            }
        }
        &self.fallback
    }
}
