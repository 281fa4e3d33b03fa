//! Timeline spreadsheet reader.
//!
//! Columns: `date, description, referenceURL[, sortKey[, entryId]]`. The
//! header row is ignored, short rows are tolerated, and rows whose date and
//! description are both empty are skipped.

use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use timeline_shared::{EntryId, Result, TimelineError, TimelineRecord};

/// Read all records from the spreadsheet at `path`.
pub fn read_timeline(path: &Path) -> Result<Vec<TimelineRecord>> {
    let file = std::fs::File::open(path).map_err(|e| TimelineError::io(path, e))?;
    let records = parse_timeline(file, path)?;
    debug!(path = %path.display(), records = records.len(), "timeline read");
    Ok(records)
}

/// Parse records from any reader; `origin` is only used in error messages.
pub fn parse_timeline<R: Read>(reader: R, origin: &Path) -> Result<Vec<TimelineRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, row) in csv_reader.records().enumerate() {
        let row = row.map_err(|e| TimelineError::csv(origin, e))?;
        let cell = |i: usize| row.get(i).unwrap_or("").to_string();
        let optional = |i: usize| row.get(i).filter(|v| !v.is_empty()).map(str::to_string);

        let mut record = TimelineRecord::new(cell(0), cell(1));
        if record.is_blank() {
            continue;
        }
        record.reference_url = optional(2);
        record.sort_key = optional(3);
        record.entry_id = match row.get(4).map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => match raw.parse::<EntryId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    // Data rows start on line 2
                    warn!(line = idx + 2, error = %e, "ignoring malformed entry id column");
                    None
                }
            },
            None => None,
        };

        records.push(record);
    }

    Ok(records)
}
