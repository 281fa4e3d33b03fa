//! Core domain types for timeline records and their enrichment payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::{EntryId, identify};

/// Date format used by the spreadsheet (`DD/MM/YYYY`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Header row of the translated timeline CSV.
pub const TRANSLATED_HEADER: [&str; 5] = ["Date", "Event", "Link", "Sort Number", "Entry ID"];

/// Payload of the source-link store: resolved source URLs for one entry.
pub type SourceLinks = Vec<String>;

// ---------------------------------------------------------------------------
// TimelineRecord
// ---------------------------------------------------------------------------

/// One row of the timeline spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRecord {
    /// Event date as written in the sheet (`DD/MM/YYYY`), untrimmed.
    pub date: String,
    /// Event text, untrimmed.
    pub description: String,
    /// Reference link, if the cell is non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
    /// Editorial sort number, if the cell is non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Identity carried in an explicit `Entry ID` column (translated sheets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,
}

impl TimelineRecord {
    pub fn new(date: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            reference_url: None,
            sort_key: None,
            entry_id: None,
        }
    }

    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        self.reference_url = Some(url.into());
        self
    }

    pub fn with_sort_key(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }

    /// The record's identity: the content hash of its natural key.
    ///
    /// Progress in the source store and the translation ledger is keyed by
    /// this, so editing either cell makes the record pending again.
    pub fn id(&self) -> EntryId {
        identify(&self.date, &self.description)
    }

    /// Key for looking up data resolved for the row this one came from.
    ///
    /// Translated sheets carry the original identity in an `Entry ID`
    /// column; everything else joins on [`id`](Self::id).
    pub fn join_id(&self) -> EntryId {
        self.entry_id.clone().unwrap_or_else(|| self.id())
    }

    /// Both natural-key cells are empty (trailing spreadsheet rows).
    pub fn is_blank(&self) -> bool {
        self.date.is_empty() && self.description.is_empty()
    }

    /// Calendar date, if the cell parses as `DD/MM/YYYY`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }
}

// ---------------------------------------------------------------------------
// TranslatedRow
// ---------------------------------------------------------------------------

/// One row of the translated timeline; payload of the translation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedRow {
    pub date: String,
    pub event: String,
    pub link: String,
    pub sort_number: String,
    pub entry_id: EntryId,
}

impl TranslatedRow {
    /// Build a row from translated text, taking every structured field from
    /// the original record. Only `event` ever comes from the service.
    pub fn from_original(original: &TimelineRecord, event: impl Into<String>) -> Self {
        Self {
            date: original.date.clone(),
            event: event.into(),
            link: original.reference_url.clone().unwrap_or_default(),
            sort_number: original.sort_key.clone().unwrap_or_default(),
            entry_id: original.id(),
        }
    }

    /// Column values in [`TRANSLATED_HEADER`] order.
    pub fn to_columns(&self) -> [&str; 5] {
        [
            self.date.as_str(),
            self.event.as_str(),
            self.link.as_str(),
            self.sort_number.as_str(),
            self.entry_id.as_str(),
        ]
    }
}
