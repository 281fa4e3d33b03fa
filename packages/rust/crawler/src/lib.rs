//! Source-link resolution for timeline entries.
//!
//! This crate provides:
//! - [`adapters`]: how a reference URL becomes source links (direct or aggregator scrape)
//! - [`PageFetcher`] / [`HttpFetcher`]: page fetching, with [`fetch_with_retry`]
//!   for bounded fixed-delay retry
//! - [`SourceResolver`]: ties the two together for the enrichment pipeline

pub mod adapters;
pub mod fetcher;
pub mod resolver;

pub use adapters::{AdapterRegistry, AggregatorAdapter, DirectAdapter, SourceAdapter};
pub use fetcher::{HttpFetcher, PageFetcher, fetch_with_retry};
pub use resolver::{Resolved, SourceResolver};
