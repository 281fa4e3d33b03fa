//! Batch translation of the timeline, resumable through the output CSV.
//!
//! The translated CSV doubles as the ledger: a record whose identity already
//! has a row there is done. Pending records are sent in fixed-size batches,
//! and the ledger is rewritten after every batch, so an interrupted run
//! resumes at the first untranslated batch.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use timeline_shared::{
    Result, TimelineError, TimelineRecord, TranslatedRow, TranslationConfig, TranslationPolicy,
};
use timeline_storage::TranslationLedger;
use timeline_translate::{Translator, batch_prompt, parse_batch_response, system_prompt};

use crate::progress::{ProgressReporter, pause};

/// Counts from one translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    /// Input records already present in the ledger at start.
    pub already_translated: usize,
    /// Rows written to the ledger during this run (padded ones included).
    pub translated: usize,
    /// Rows filled with the untranslated original after repeated malformed replies.
    pub padded_rows: usize,
    /// Batches abandoned after all attempts; retried next run.
    pub failed_batches: usize,
    /// Input records with a ledger row at the end of the run.
    pub total_done: usize,
    /// Input records considered.
    pub total_input: usize,
}

impl std::fmt::Display for TranslationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} translated ({} this run, {} padded, {} failed batches)",
            self.total_done,
            self.total_input,
            self.translated,
            self.padded_rows,
            self.failed_batches
        )
    }
}

/// A batch that produced rows.
struct BatchOutcome {
    rows: Vec<TranslatedRow>,
    padded: usize,
}

/// Translate every record of `records` that has no row in `ledger`.
#[instrument(skip_all, fields(records = records.len(), output = %ledger.path().display()))]
pub async fn translate_timeline<T: Translator>(
    records: &[TimelineRecord],
    ledger: &mut TranslationLedger,
    translator: &T,
    config: &TranslationConfig,
    policy: &TranslationPolicy,
    progress: &dyn ProgressReporter,
) -> Result<TranslationSummary> {
    let mut summary = TranslationSummary {
        total_input: records.len(),
        already_translated: ledger.count_done(records),
        ..TranslationSummary::default()
    };

    // Duplicate rows share an identity; translate them once.
    let mut seen = HashSet::new();
    let pending: Vec<&TimelineRecord> = records
        .iter()
        .filter(|r| !r.is_blank())
        .filter(|r| {
            let id = r.id();
            !ledger.has(&id) && seen.insert(id)
        })
        .collect();

    info!(
        already_translated = summary.already_translated,
        pending = pending.len(),
        "starting translation"
    );

    if pending.is_empty() {
        summary.total_done = summary.already_translated;
        info!("all records already translated, nothing to do");
        progress.done(&summary.to_string());
        return Ok(summary);
    }

    let system = system_prompt(config);
    let batch_size = policy.batch_size.max(1);
    let batches: Vec<&[&TimelineRecord]> = pending.chunks(batch_size).collect();
    let total_batches = batches.len();

    progress.phase("Translating");

    for (idx, batch) in batches.iter().enumerate() {
        let start = idx * batch_size + 1;
        let end = start + batch.len() - 1;
        info!(batch = idx + 1, total_batches, start, end, "translating batch");

        match translate_batch(batch, translator, &system, config, policy, progress).await {
            Some(outcome) => {
                summary.translated += outcome.rows.len();
                summary.padded_rows += outcome.padded;
                for row in outcome.rows {
                    ledger.insert(row);
                }
            }
            None => {
                warn!(
                    batch = idx + 1,
                    attempts = policy.max_attempts,
                    "batch failed, will retry next run"
                );
                summary.failed_batches += 1;
            }
        }

        let written = ledger.save(records)?;
        debug!(rows = written, "progress saved");
        progress.advance(idx + 1, total_batches, &format!("events {start}-{end}"));

        if idx + 1 < total_batches {
            pause(progress, "pacing before next batch", policy.batch_pause).await;
        }
    }

    summary.total_done = ledger.count_done(records);
    info!(
        translated = summary.translated,
        padded_rows = summary.padded_rows,
        failed_batches = summary.failed_batches,
        total_done = summary.total_done,
        total_input = summary.total_input,
        "translation complete"
    );
    progress.done(&summary.to_string());

    Ok(summary)
}

/// Run one batch through the service, retrying per `policy`.
///
/// Returns `None` when every attempt ended in a service error.
async fn translate_batch<T: Translator>(
    batch: &[&TimelineRecord],
    translator: &T,
    system: &str,
    config: &TranslationConfig,
    policy: &TranslationPolicy,
    progress: &dyn ProgressReporter,
) -> Option<BatchOutcome> {
    let owned: Vec<TimelineRecord> = batch.iter().map(|r| (*r).clone()).collect();
    let prompt = batch_prompt(config, &owned);
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let last = attempt == max_attempts;

        let reply = match translator.translate(system, &prompt).await {
            Ok(reply) => reply,
            Err(e @ TimelineError::RateLimited(_)) => {
                warn!(attempt, error = %e, "rate limited");
                if !last {
                    pause(progress, "rate limited", policy.rate_limit_backoff * attempt).await;
                }
                continue;
            }
            Err(e) => {
                warn!(attempt, error = %e, "translation request failed");
                if !last {
                    pause(progress, "retrying after error", policy.error_delay).await;
                }
                continue;
            }
        };

        let parsed = parse_batch_response(&reply);
        if parsed.len() != batch.len() && !last {
            warn!(
                attempt,
                expected = batch.len(),
                got = parsed.len(),
                "row count mismatch, retrying"
            );
            continue;
        }

        let mut padded = 0;
        let rows = batch
            .iter()
            .enumerate()
            .map(|(i, original)| match parsed.get(i) {
                Some(row) => TranslatedRow::from_original(original, row.event.clone()),
                None => {
                    padded += 1;
                    TranslatedRow::from_original(original, original.description.clone())
                }
            })
            .collect();

        if padded > 0 || parsed.len() > batch.len() {
            warn!(
                expected = batch.len(),
                got = parsed.len(),
                padded,
                "row count still wrong on final attempt, padded with originals"
            );
        }

        return Some(BatchOutcome { rows, padded });
    }

    None
}
