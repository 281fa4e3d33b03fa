//! File-backed persistence for the timeline builder.
//!
//! Everything here is plain files owned by a single process for the
//! duration of a run:
//! - [`RecordStore`]: JSON ledger of completed enrichment, keyed by [`EntryId`]
//! - [`read_timeline`]: the input spreadsheet
//! - [`TranslationLedger`]: the translated CSV, which is both the
//!   translation pipeline's completion record and its final artifact
//!
//! All writes go through [`write_atomic`]: a crash mid-save leaves the
//! previous file intact.
//!
//! [`EntryId`]: timeline_shared::EntryId

mod fs;
mod ledger;
mod record_store;
mod sheet;

pub use fs::write_atomic;
pub use ledger::TranslationLedger;
pub use record_store::RecordStore;
pub use sheet::{parse_timeline, read_timeline};
