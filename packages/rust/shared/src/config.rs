//! Application configuration for the timeline builder.
//!
//! Config lives in `timeline.toml`, looked up in the working directory first
//! and then at `~/.timeline-builder/timeline.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "timeline.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".timeline-builder";

// ---------------------------------------------------------------------------
// Config structs (matching timeline.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output file locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Source-link enrichment settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Batch translation settings.
    #[serde(default)]
    pub translation: TranslationConfig,

    /// HTML rendering settings.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Source-language timeline spreadsheet.
    #[serde(default = "default_timeline_csv")]
    pub timeline_csv: PathBuf,

    /// Record store for resolved source links.
    #[serde(default = "default_sources_json")]
    pub sources_json: PathBuf,

    /// Translated timeline (ledger and final artifact).
    #[serde(default = "default_translated_csv")]
    pub translated_csv: PathBuf,

    /// Directory rendered HTML is written to.
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            timeline_csv: default_timeline_csv(),
            sources_json: default_sources_json(),
            translated_csv: default_translated_csv(),
            site_dir: default_site_dir(),
        }
    }
}

fn default_timeline_csv() -> PathBuf {
    "timeline.csv".into()
}
fn default_sources_json() -> PathBuf {
    "sources.json".into()
}
fn default_translated_csv() -> PathBuf {
    "en/timeline.csv".into()
}
fn default_site_dir() -> PathBuf {
    "site".into()
}

/// What to do with a record that has no reference URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingLinkPolicy {
    /// Leave the record out of the store; it is re-examined on every run.
    #[default]
    Skip,
    /// Store an empty source list so the record is settled for good.
    RecordEmpty,
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Hosts whose pages list the real sources and must be scraped.
    #[serde(default = "default_aggregator_hosts")]
    pub aggregator_hosts: Vec<String>,

    /// CSS selector for the link elements on an aggregator page.
    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    /// Seconds to wait between fetch attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Fetch attempts before the run is aborted.
    #[serde(default = "default_fetch_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Handling of records without a reference URL.
    #[serde(default)]
    pub missing_link: MissingLinkPolicy,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            aggregator_hosts: default_aggregator_hosts(),
            link_selector: default_link_selector(),
            retry_delay_secs: default_retry_delay(),
            max_attempts: default_fetch_attempts(),
            request_timeout_secs: default_request_timeout(),
            missing_link: MissingLinkPolicy::default(),
        }
    }
}

fn default_aggregator_hosts() -> Vec<String> {
    vec!["linkmix.co".into()]
}
fn default_link_selector() -> String {
    "div.mainURL".into()
}
fn default_retry_delay() -> u64 {
    5
}
fn default_fetch_attempts() -> u32 {
    5
}
fn default_request_timeout() -> u64 {
    30
}

/// `[translation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Messages endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used for translation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Response token ceiling per batch.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Language of the input sheet.
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language to translate into.
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Free-text background for the translator (subject, tone).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Fixed renderings, one per line (e.g. `EYP -> Greek Intelligence Service (EYP)`).
    #[serde(default)]
    pub glossary: Vec<String>,

    /// Rows per request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts per batch.
    #[serde(default = "default_translation_attempts")]
    pub max_attempts: u32,

    /// Base backoff after a rate-limit response, multiplied by the attempt number.
    #[serde(default = "default_rate_limit_backoff")]
    pub rate_limit_backoff_secs: u64,

    /// Pause after any other failed attempt.
    #[serde(default = "default_retry_delay")]
    pub error_delay_secs: u64,

    /// Pause between consecutive batches.
    #[serde(default = "default_batch_pause")]
    pub batch_pause_secs: u64,

    /// Per-request timeout.
    #[serde(default = "default_translation_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_url: default_api_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            context: None,
            glossary: Vec::new(),
            batch_size: default_batch_size(),
            max_attempts: default_translation_attempts(),
            rate_limit_backoff_secs: default_rate_limit_backoff(),
            error_delay_secs: default_retry_delay(),
            batch_pause_secs: default_batch_pause(),
            request_timeout_secs: default_translation_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".into()
}
fn default_model() -> String {
    "claude-sonnet-4-5-20250929".into()
}
fn default_max_tokens() -> u32 {
    8192
}
fn default_source_language() -> String {
    "Greek".into()
}
fn default_target_language() -> String {
    "English".into()
}
fn default_batch_size() -> usize {
    10
}
fn default_translation_attempts() -> u32 {
    3
}
fn default_rate_limit_backoff() -> u64 {
    30
}
fn default_batch_pause() -> u64 {
    60
}
fn default_translation_timeout() -> u64 {
    120
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Page template containing `{{main_body}}`; built-in page when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Also write a newest-first page.
    #[serde(default = "default_true")]
    pub reversed: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template: None,
            reversed: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Runtime policies (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime source-resolution policy.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub aggregator_hosts: Vec<String>,
    pub link_selector: String,
    pub retry_delay: Duration,
    pub max_attempts: u32,
    pub request_timeout: Duration,
    pub missing_link: MissingLinkPolicy,
}

impl From<&AppConfig> for FetchPolicy {
    fn from(config: &AppConfig) -> Self {
        let sources = &config.sources;
        Self {
            aggregator_hosts: sources.aggregator_hosts.clone(),
            link_selector: sources.link_selector.clone(),
            retry_delay: Duration::from_secs(sources.retry_delay_secs),
            max_attempts: sources.max_attempts.max(1),
            request_timeout: Duration::from_secs(sources.request_timeout_secs),
            missing_link: sources.missing_link,
        }
    }
}

/// Runtime batching and backoff policy for the translation pipeline.
#[derive(Debug, Clone)]
pub struct TranslationPolicy {
    pub batch_size: usize,
    pub max_attempts: u32,
    pub rate_limit_backoff: Duration,
    pub error_delay: Duration,
    pub batch_pause: Duration,
}

impl From<&AppConfig> for TranslationPolicy {
    fn from(config: &AppConfig) -> Self {
        let t = &config.translation;
        Self {
            batch_size: t.batch_size.max(1),
            max_attempts: t.max_attempts.max(1),
            rate_limit_backoff: Duration::from_secs(t.rate_limit_backoff_secs),
            error_delay: Duration::from_secs(t.error_delay_secs),
            batch_pause: Duration::from_secs(t.batch_pause_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.timeline-builder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TimelineError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user-level config file (`~/.timeline-builder/timeline.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config.
///
/// A `timeline.toml` in the working directory wins over the user-level file.
/// Returns defaults if neither exists.
pub fn load_config() -> Result<AppConfig> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    let path = config_file_path()?;
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TimelineError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TimelineError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into `dir`. Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| TimelineError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(TimelineError::config(format!(
            "{} already exists; remove it first to regenerate defaults",
            path.display()
        )));
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TimelineError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TimelineError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the translation API key from the configured env var.
///
/// A missing or empty key is fatal: nothing useful can happen without it.
pub fn resolve_api_key(config: &TranslationConfig) -> Result<String> {
    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(TimelineError::config(format!(
            "translation API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timeline_csv"));
        assert!(toml_str.contains("ANTHROPIC_API_KEY"));
        assert!(toml_str.contains("linkmix.co"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.translation.batch_size, 10);
        assert_eq!(parsed.sources.link_selector, "div.mainURL");
        assert_eq!(parsed.sources.missing_link, MissingLinkPolicy::Skip);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[paths]
timeline_csv = "gr/timeline.csv"

[sources]
missing_link = "record-empty"
aggregator_hosts = ["linkmix.co", "linktr.ee"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.timeline_csv, PathBuf::from("gr/timeline.csv"));
        assert_eq!(config.paths.sources_json, PathBuf::from("sources.json"));
        assert_eq!(config.sources.missing_link, MissingLinkPolicy::RecordEmpty);
        assert_eq!(config.sources.aggregator_hosts.len(), 2);
        assert_eq!(config.sources.retry_delay_secs, 5);
        assert!(config.render.reversed);
    }

    #[test]
    fn fetch_policy_from_app_config() {
        let app = AppConfig::default();
        let policy = FetchPolicy::from(&app);
        assert_eq!(policy.retry_delay, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn translation_policy_from_app_config() {
        let mut app = AppConfig::default();
        app.translation.batch_size = 0;
        let policy = TranslationPolicy::from(&app);
        assert_eq!(policy.batch_size, 1);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.rate_limit_backoff, Duration::from_secs(30));
        assert_eq!(policy.batch_pause, Duration::from_secs(60));
    }

    #[test]
    fn api_key_missing_is_an_error() {
        let config = TranslationConfig {
            // Unique name so other tests' environment cannot interfere
            api_key_env: "TIMELINE_TEST_NONEXISTENT_KEY_12345".into(),
            ..TranslationConfig::default()
        };
        let result = resolve_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn init_config_writes_defaults_once() {
        let dir = std::env::temp_dir()
            .join(format!("timeline-config-test-{}", uuid::Uuid::now_v7()));

        let path = init_config(&dir).expect("init");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.translation.model, default_model());
        assert!(init_config(&dir).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
