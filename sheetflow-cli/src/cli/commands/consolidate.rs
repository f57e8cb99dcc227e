//! `sheetflow consolidate`

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use crate::config::AppConfig;
use crate::pipeline::run_consolidate;

#[derive(Args, Debug, Clone, Default)]
pub struct ConsolidateCommand {
    /// Target database URL (sqlite://, postgres://, mysql://)
    #[arg(long)]
    pub target_url: Option<String>,

    /// Target table to replace
    #[arg(long)]
    pub table: Option<String>,
}

/// Apply command line overrides to the loaded config and run the pipeline
pub async fn handle_consolidate_command(args: ConsolidateCommand, config: AppConfig) -> Result<()> {
    let mut config = config.consolidate;
    if let Some(url) = args.target_url {
        config.target.url = url;
    }
    if let Some(table) = args.table {
        config.target.table = table;
    }

    let report = run_consolidate(&config)
        .await
        .context("Consolidation failed")?;

    for (source, rows) in &report.sources {
        println!("  {} {} rows", source.dimmed(), rows);
    }
    println!(
        "Loaded {} rows ({} columns) into {}",
        report.combined_rows.to_string().bold(),
        report.columns.len(),
        report.table.bright_green().bold()
    );
    Ok(())
}
