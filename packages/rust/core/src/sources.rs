//! Source-link enrichment: reference URL → resolved sources, cached by entry id.
//!
//! Every record is looked up in the store by its identity first, so a re-run
//! over an unchanged sheet makes no network calls and leaves the store
//! byte-identical. Each newly resolved entry is persisted before the next
//! record is looked at; an interrupted run loses at most the record in flight.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use timeline_crawler::{PageFetcher, SourceResolver};
use timeline_shared::{
    EntryId, MissingLinkPolicy, Result, SourceLinks, TimelineError, TimelineRecord,
};
use timeline_storage::RecordStore;

use crate::progress::ProgressReporter;

/// Counts from one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcesSummary {
    /// Records resolved and stored during this run.
    pub enriched: usize,
    /// Records already present in the store.
    pub cached: usize,
    /// Records with no reference URL.
    pub skipped_no_link: usize,
    /// Records whose reference URL answered with a permanent error; left pending.
    pub failed: usize,
    /// Aggregator pages that yielded no links (stored as empty lists).
    pub empty_aggregators: usize,
    /// Store entries no current record maps to (edited or removed rows).
    pub orphaned: usize,
    /// Records considered.
    pub total: usize,
}

impl std::fmt::Display for SourcesSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} enriched, {} cached, {} without link, {} failed, {} empty aggregator pages",
            self.enriched, self.cached, self.skipped_no_link, self.failed, self.empty_aggregators
        )?;
        if self.orphaned > 0 {
            write!(f, ", {} orphaned", self.orphaned)?;
        }
        Ok(())
    }
}

/// Resolve source links for every record not yet in `store`.
///
/// Records are processed strictly in sheet order. A permanent HTTP error
/// (e.g. 404) leaves the record pending and moves on; a fetch that still
/// fails after the configured retries aborts the run with everything stored
/// so far intact.
#[instrument(skip_all, fields(records = records.len(), store = %store.path().display()))]
pub async fn enrich_sources<F: PageFetcher>(
    records: &[TimelineRecord],
    store: &mut RecordStore<SourceLinks>,
    resolver: &SourceResolver<F>,
    progress: &dyn ProgressReporter,
) -> Result<SourcesSummary> {
    let mut summary = SourcesSummary {
        total: records.len(),
        ..SourcesSummary::default()
    };
    let missing_link = resolver.policy().missing_link;

    info!(cached = store.len(), "starting source enrichment");
    progress.phase("Resolving sources");

    for (i, record) in records.iter().enumerate() {
        progress.advance(i + 1, records.len(), &record.date);

        if record.is_blank() {
            continue;
        }

        let id = record.id();
        if store.has(&id) {
            summary.cached += 1;
            continue;
        }

        let Some(reference) = record
            .reference_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
        else {
            summary.skipped_no_link += 1;
            match missing_link {
                MissingLinkPolicy::Skip => {
                    debug!(%id, date = %record.date, "no reference URL, leaving pending");
                }
                MissingLinkPolicy::RecordEmpty => {
                    debug!(%id, date = %record.date, "no reference URL, recording empty");
                    store.put(id, Vec::new())?;
                }
            }
            continue;
        };

        let resolved = match resolver.resolve(reference).await {
            Ok(resolved) => resolved,
            Err(e @ TimelineError::HttpStatus { .. }) if !e.is_transient() => {
                warn!(
                    %id,
                    url = %reference,
                    error = %e,
                    "source page unavailable, will retry next run"
                );
                summary.failed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if resolved.fetched && resolved.links.is_empty() {
            warn!(%id, url = %reference, "aggregator page has no source links");
            summary.empty_aggregators += 1;
        }

        debug!(
            %id,
            date = %record.date,
            adapter = %resolved.adapter,
            links = resolved.links.len(),
            "sources resolved"
        );
        store.put(id, resolved.links)?;
        summary.enriched += 1;
    }

    // Orphans stay in the store; they are what an edited row used to be.
    let live: HashSet<EntryId> = records.iter().map(TimelineRecord::id).collect();
    summary.orphaned = store.iter().filter(|(id, _)| !live.contains(*id)).count();

    info!(
        enriched = summary.enriched,
        cached = summary.cached,
        orphaned = summary.orphaned,
        skipped_no_link = summary.skipped_no_link,
        failed = summary.failed,
        empty_aggregators = summary.empty_aggregators,
        "source enrichment complete"
    );
    progress.done(&summary.to_string());

    Ok(summary)
}
