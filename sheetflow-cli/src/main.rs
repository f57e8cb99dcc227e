mod chart;
mod cli;
mod config;
mod error;
mod extract;
mod load;
mod pipeline;
mod table;
mod transform;

use anyhow::Result;
use clap::Parser;

use cli::commands::{handle_analyze_command, handle_consolidate_command};
use cli::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; credentials may come from the environment or a prompt
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Consolidate(args) => handle_consolidate_command(args, config).await,
        Commands::Analyze(args) => handle_analyze_command(args, config).await,
    }
}
