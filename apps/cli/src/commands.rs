//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use timeline_core::{ProgressReporter, enrich_sources, render_site, translate_timeline};
use timeline_crawler::{HttpFetcher, SourceResolver};
use timeline_render::Templates;
use timeline_shared::{
    AppConfig, FetchPolicy, SourceLinks, TranslationPolicy, config_dir, identify, init_config,
    load_config, load_config_from, resolve_api_key,
};
use timeline_storage::{RecordStore, TranslationLedger, read_timeline};
use timeline_translate::AnthropicTranslator;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Timeline builder: spreadsheet in, enriched and translated timeline site out.
#[derive(Parser)]
#[command(
    name = "timeline",
    version,
    about = "Build a static timeline site from a spreadsheet: resolve sources, translate, render.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ./timeline.toml or the user-level one.
    #[arg(long, global = true, env = "TIMELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Resolve source links for every timeline entry not yet in the store.
    Sources {
        /// Timeline CSV (defaults to paths.timeline_csv).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Sources JSON store (defaults to paths.sources_json).
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Translate entries missing from the translated CSV.
    Translate {
        /// Source-language timeline CSV (defaults to paths.timeline_csv).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Translated CSV, read for resume and rewritten per batch
        /// (defaults to paths.translated_csv).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the static timeline pages.
    Render {
        /// Timeline CSV to render (defaults to paths.timeline_csv).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Sources JSON store (defaults to paths.sources_json).
        #[arg(short, long)]
        sources: Option<PathBuf>,

        /// Output directory (defaults to paths.site_dir).
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Skip the newest-first page.
        #[arg(long)]
        no_reversed: bool,
    },

    /// Print the entry identifier for a date and description.
    Id {
        /// Date cell, exactly as in the sheet.
        date: String,

        /// Description cell, exactly as in the sheet.
        description: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default timeline.toml.
    Init {
        /// Write to ~/.timeline-builder/ instead of the working directory.
        #[arg(long)]
        global: bool,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "timeline=info",
        1 => "timeline=debug",
        _ => "timeline=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Sources { input, store } => {
            let config = resolve_config(config_path)?;
            cmd_sources(&config, input, store).await
        }
        Command::Translate { input, output } => {
            let config = resolve_config(config_path)?;
            cmd_translate(&config, input, output).await
        }
        Command::Render {
            input,
            sources,
            out_dir,
            no_reversed,
        } => {
            let config = resolve_config(config_path)?;
            cmd_render(&config, input, sources, out_dir, no_reversed)
        }
        Command::Id { date, description } => {
            println!("{}", identify(&date, &description));
            Ok(())
        }
        Command::Config { action } => match action {
            ConfigAction::Init { global } => cmd_config_init(global),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// `--config` wins; otherwise the usual lookup.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_sources(
    config: &AppConfig,
    input: Option<PathBuf>,
    store: Option<PathBuf>,
) -> Result<()> {
    let input = input.unwrap_or_else(|| config.paths.timeline_csv.clone());
    let store_path = store.unwrap_or_else(|| config.paths.sources_json.clone());

    let records = read_timeline(&input)?;
    let mut store: RecordStore<SourceLinks> = RecordStore::load(&store_path)?;

    let policy = FetchPolicy::from(config);
    let fetcher = HttpFetcher::new(policy.request_timeout)?;
    let resolver = SourceResolver::new(fetcher, policy)?;

    info!(
        input = %input.display(),
        store = %store_path.display(),
        records = records.len(),
        "resolving sources"
    );

    let reporter = CliProgress::new();
    let summary = enrich_sources(&records, &mut store, &resolver, &reporter).await?;

    println!();
    println!("  Sources resolved.");
    println!("  Enriched:      {}", summary.enriched);
    println!("  Cached:        {}", summary.cached);
    println!("  Without link:  {}", summary.skipped_no_link);
    println!("  Failed:        {}", summary.failed);
    println!("  Empty pages:   {}", summary.empty_aggregators);
    println!("  Orphaned:      {}", summary.orphaned);
    println!("  Store:         {}", store.path().display());
    println!();

    Ok(())
}

async fn cmd_translate(
    config: &AppConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    // Validate API key before doing anything
    let api_key = resolve_api_key(&config.translation)?;

    let input = input.unwrap_or_else(|| config.paths.timeline_csv.clone());
    let output = output.unwrap_or_else(|| config.paths.translated_csv.clone());

    let records = read_timeline(&input)?;
    let mut ledger = TranslationLedger::load(&output)?;
    let translator = AnthropicTranslator::new(&config.translation, api_key)?;
    let policy = TranslationPolicy::from(config);

    info!(
        input = %input.display(),
        output = %output.display(),
        model = translator.model(),
        records = records.len(),
        "translating timeline"
    );

    let reporter = CliProgress::new();
    let summary = translate_timeline(
        &records,
        &mut ledger,
        &translator,
        &config.translation,
        &policy,
        &reporter,
    )
    .await?;

    println!();
    println!("  Translation finished.");
    println!("  Already done:   {}", summary.already_translated);
    println!("  Translated:     {}", summary.translated);
    println!("  Padded rows:    {}", summary.padded_rows);
    println!("  Failed batches: {}", summary.failed_batches);
    println!("  Total:          {}/{}", summary.total_done, summary.total_input);
    println!("  Output:         {}", output.display());
    println!();

    if summary.failed_batches > 0 {
        println!("  Some batches failed; run again to retry them.");
        println!();
    }

    Ok(())
}

fn cmd_render(
    config: &AppConfig,
    input: Option<PathBuf>,
    sources: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    no_reversed: bool,
) -> Result<()> {
    let input = input.unwrap_or_else(|| config.paths.timeline_csv.clone());
    let sources_path = sources.unwrap_or_else(|| config.paths.sources_json.clone());
    let out_dir = out_dir.unwrap_or_else(|| config.paths.site_dir.clone());
    let reversed = config.render.reversed && !no_reversed;

    let records = read_timeline(&input)?;
    let store: RecordStore<SourceLinks> = RecordStore::load(&sources_path)?;
    let templates = Templates::load(config.render.template.as_deref())?;

    let summary = render_site(&records, Some(&store), &templates, &out_dir, reversed)?;

    println!();
    println!("  Site rendered.");
    println!("  Entries:      {}", summary.items);
    println!("  With sources: {}", summary.with_sources);
    for page in &summary.pages {
        println!("  Wrote:        {}", page.display());
    }
    println!();

    Ok(())
}

fn cmd_config_init(global: bool) -> Result<()> {
    let dir = if global {
        config_dir()?
    } else {
        std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?
    };
    let path = init_config(&dir)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn advance(&self, current: usize, total: usize, detail: &str) {
        self.spinner.set_message(format!("[{current}/{total}] {detail}"));
    }

    fn waiting(&self, reason: &str, delay: Duration) {
        self.spinner
            .set_message(format!("{reason}: waiting {}s", delay.as_secs()));
    }

    fn done(&self, summary: &str) {
        self.spinner.finish_and_clear();
        info!(%summary, "done");
    }
}
