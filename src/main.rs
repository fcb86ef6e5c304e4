//! HackEval CLI entry point.

use anyhow::Context;
use clap::Parser;

use hackeval::cli::{commands, handle_error, Cli, Commands};
use hackeval::infrastructure::logging::{LogConfig, LoggerImpl};
use hackeval::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref())?;

    let log_config = LogConfig::try_from(&config.logging)?;
    let _logger = if cli.command.is_service() {
        LoggerImpl::init(&log_config)
    } else {
        LoggerImpl::init_for_cli(&log_config)
    }
    .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Criteria => commands::criteria::execute(config, cli.json).await,
        Commands::Evaluate(args) => commands::evaluate::execute(args, config, cli.json).await,
        Commands::Check => commands::check::execute(config, cli.json).await,
    }
}
