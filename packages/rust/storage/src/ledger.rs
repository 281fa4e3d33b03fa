//! Translated timeline CSV, used as the translation pipeline's ledger.
//!
//! Rows are keyed by their `Entry ID` column. Saving re-keys against the
//! current input: only rows whose id matches a current input record are
//! written, in input order, so stale translations disappear on their own.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use timeline_shared::{
    EntryId, Result, TRANSLATED_HEADER, TimelineError, TimelineRecord, TranslatedRow,
};

use crate::fs::write_atomic;

/// In-memory view of the translated CSV.
#[derive(Debug)]
pub struct TranslationLedger {
    path: PathBuf,
    rows: HashMap<EntryId, TranslatedRow>,
}

impl TranslationLedger {
    /// Load the ledger at `path`. A missing file is an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no translated output yet, starting empty");
                return Ok(Self {
                    path,
                    rows: HashMap::new(),
                });
            }
            Err(e) => return Err(TimelineError::io(&path, e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut rows = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| TimelineError::csv(&path, e))?;
            if record.len() < TRANSLATED_HEADER.len() {
                continue;
            }

            let entry_id = match record[4].trim().parse::<EntryId>() {
                Ok(id) => id,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping ledger row");
                    continue;
                }
            };

            rows.insert(
                entry_id.clone(),
                TranslatedRow {
                    date: record[0].to_string(),
                    event: record[1].to_string(),
                    link: record[2].to_string(),
                    sort_number: record[3].to_string(),
                    entry_id,
                },
            );
        }

        info!(path = %path.display(), rows = rows.len(), "translation ledger loaded");
        Ok(Self { path, rows })
    }

    pub fn has(&self, id: &EntryId) -> bool {
        self.rows.contains_key(id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&TranslatedRow> {
        self.rows.get(id)
    }

    /// Record a translated row. Call [`save`](Self::save) to persist.
    pub fn insert(&mut self, row: TranslatedRow) {
        self.rows.insert(row.entry_id.clone(), row);
    }

    /// Number of rows held, including ones no current input refers to.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// How many of `order`'s records already have a translation.
    pub fn count_done(&self, order: &[TimelineRecord]) -> usize {
        order.iter().filter(|r| self.has(&r.id())).count()
    }

    /// Write the ledger, one row per record in `order` that has a translation.
    ///
    /// Returns the number of rows written.
    pub fn save(&self, order: &[TimelineRecord]) -> Result<usize> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(TRANSLATED_HEADER)
            .map_err(|e| TimelineError::csv(&self.path, e))?;

        let mut written = 0;
        let mut seen = HashSet::new();
        for record in order {
            let id = record.id();
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(row) = self.rows.get(&id) {
                writer
                    .write_record(row.to_columns())
                    .map_err(|e| TimelineError::csv(&self.path, e))?;
                written += 1;
            }
        }

        let buf = writer
            .into_inner()
            .map_err(|e| TimelineError::csv(&self.path, e.error()))?;
        write_atomic(&self.path, &buf)?;

        debug!(path = %self.path.display(), rows = written, "translation ledger saved");
        Ok(written)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
