//! Reference URL → source links, fetching through the matching adapter.

use tracing::{debug, instrument};

use timeline_shared::{FetchPolicy, Result, SourceLinks};

use crate::adapters::AdapterRegistry;
use crate::fetcher::{PageFetcher, fetch_with_retry};

/// Outcome of resolving one reference URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub links: SourceLinks,
    /// Name of the adapter that handled the URL.
    pub adapter: String,
    /// Whether a network fetch was needed.
    pub fetched: bool,
}

/// Resolves reference URLs using a registry of adapters and a page fetcher.
pub struct SourceResolver<F> {
    fetcher: F,
    registry: AdapterRegistry,
    policy: FetchPolicy,
}

impl<F: PageFetcher> SourceResolver<F> {
    pub fn new(fetcher: F, policy: FetchPolicy) -> Result<Self> {
        let registry = AdapterRegistry::from_policy(&policy)?;
        Ok(Self {
            fetcher,
            registry,
            policy,
        })
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve `reference` into its source links.
    ///
    /// Errors are whatever [`fetch_with_retry`] returns: a permanent HTTP
    /// status, or a network error once retries are exhausted.
    #[instrument(skip_all, fields(url = %reference))]
    pub async fn resolve(&self, reference: &str) -> Result<Resolved> {
        let adapter = self.registry.detect(reference);

        let page = if adapter.needs_page() {
            Some(
                fetch_with_retry(
                    &self.fetcher,
                    reference,
                    self.policy.max_attempts,
                    self.policy.retry_delay,
                )
                .await?,
            )
        } else {
            None
        };

        let links = adapter.extract(reference, page.as_deref());
        debug!(adapter = adapter.name(), links = links.len(), "reference resolved");

        Ok(Resolved {
            links,
            adapter: adapter.name().to_string(),
            fetched: page.is_some(),
        })
    }
}
