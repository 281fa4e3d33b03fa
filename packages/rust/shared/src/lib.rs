//! Shared types, error model, and configuration for the timeline builder.
//!
//! This crate is the foundation depended on by all other timeline crates.
//! It provides:
//! - [`TimelineError`]: the unified error type
//! - The identity function ([`identify`], [`EntryId`])
//! - Domain types ([`TimelineRecord`], [`SourceLinks`], [`TranslatedRow`])
//! - Configuration ([`AppConfig`], [`FetchPolicy`], [`TranslationPolicy`], config loading)

pub mod config;
pub mod error;
pub mod identity;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchPolicy, MissingLinkPolicy, PathsConfig, RenderConfig, SourcesConfig,
    TranslationConfig, TranslationPolicy, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_api_key,
};
pub use error::{Result, TimelineError};
pub use identity::{EntryId, identify};
pub use types::{SourceLinks, TRANSLATED_HEADER, TimelineRecord, TranslatedRow};
