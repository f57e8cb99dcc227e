//! `sheetflow analyze`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use crate::config::AppConfig;
use crate::pipeline::run_analyze;

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeCommand {
    /// Workbook with the sales, customers and products sheets
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Workbook to write the processed rows and pivot to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not open the chart view
    #[arg(long)]
    pub no_charts: bool,
}

/// Apply command line overrides to the loaded config and run the pipeline
pub async fn handle_analyze_command(args: AnalyzeCommand, config: AppConfig) -> Result<()> {
    let mut config = config.analyze;
    if let Some(input) = args.input {
        config.workbook = input;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if args.no_charts {
        config.show_charts = false;
    }

    // Workbook I/O and the chart view both block
    let report = tokio::task::spawn_blocking(move || run_analyze(&config))
        .await
        .context("Analysis task panicked")?
        .context("Analysis failed")?;

    if !report.charts_shown {
        log::debug!("Charts were not displayed");
    }
    println!(
        "Read {} sales, {} customer and {} product rows",
        report.sales_rows, report.customer_rows, report.product_rows
    );
    println!(
        "Processed {} sales rows ({} duplicates removed, {} quantities filled)",
        report.processed_rows.to_string().bold(),
        report.duplicates_removed,
        report.quantities_filled
    );
    println!("Total revenue: {:.2}", report.total_revenue);
    println!(
        "Analysis complete! Results saved to {}",
        report.output.display().to_string().bright_green()
    );
    Ok(())
}
