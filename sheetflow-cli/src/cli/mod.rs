//! Command line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{AnalyzeCommand, ConsolidateCommand};

#[derive(Parser)]
#[command(name = "sheetflow")]
#[command(about = "Consolidate spreadsheets and databases, analyze sales workbooks")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $SHEETFLOW_CONFIG, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read every configured source and replace the target table with their union
    Consolidate(ConsolidateCommand),
    /// Clean and join the sales workbook, chart revenue and export the results
    Analyze(AnalyzeCommand),
}
