//! Batch response parser.
//!
//! The service is asked for bare CSV rows `Date,Event,Link,Sort Number`,
//! one per line. Replies often carry extra framing anyway:
//! - an echoed header row (`Date,...`)
//! - Markdown code fences
//! - `[i]` index markers copied from the prompt
//! - list bullets (`- `, `* `, `• `)
//!
//! Those lines are dropped; every remaining line is parsed as one CSV record.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row recovered from a batch response.
///
/// Only `event` is trusted; the other columns are overwritten from the
/// input record by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub date: String,
    pub event: String,
    pub link: String,
    pub sort: String,
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Lines that are framing rather than data.
static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Date,|```|\[|[-*•]\s)").expect("noise regex")
});

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a batch response into rows, in response order.
///
/// Records with four or more fields keep the first four; three-field
/// records get an empty sort column; anything shorter is discarded.
pub fn parse_batch_response(text: &str) -> Vec<ParsedRow> {
    let mut rows = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if NOISE_RE.is_match(line) {
            continue;
        }

        let Some(fields) = parse_csv_line(line) else {
            debug!(line, "unparseable response line");
            continue;
        };

        if fields.len() < 3 {
            debug!(line, "discarding short response line");
            continue;
        }

        let field = |i: usize| fields.get(i).cloned().unwrap_or_default();
        rows.push(ParsedRow {
            date: field(0),
            event: field(1),
            link: field(2),
            sort: field(3),
        });
    }

    rows
}

/// Split one line into CSV fields. `None` if the line is not valid CSV.
fn parse_csv_line(line: &str) -> Option<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let record = reader.records().next()?.ok()?;
    Some(record.iter().map(str::to_string).collect())
}
