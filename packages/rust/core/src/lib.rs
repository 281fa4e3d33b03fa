//! Pipeline orchestration for the timeline builder.
//!
//! This crate ties the storage, crawler, translation and rendering crates
//! together into the three workflows the CLI exposes:
//! - [`sources`]: resolve and cache source links per entry
//! - [`translation`]: resumable batch translation into the output CSV
//! - [`site`]: render the static pages

pub mod progress;
pub mod site;
pub mod sources;
pub mod translation;

pub use progress::{ProgressReporter, SilentProgress};
pub use site::{INDEX_PAGE, REVERSED_PAGE, SiteSummary, render_site};
pub use sources::{SourcesSummary, enrich_sources};
pub use translation::{TranslationSummary, translate_timeline};
