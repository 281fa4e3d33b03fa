//! Timeline builder CLI.
//!
//! Resolves source links for a timeline spreadsheet, translates it in
//! resumable batches, and renders the static timeline pages.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
