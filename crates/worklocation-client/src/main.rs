//! worklocation CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use worklocation_client::cli::{Cli, Command, ConfigAction};
use worklocation_client::commands;
use worklocation_client::config::ClientConfig;
use worklocation_client::error::{ClientError, ClientResult};
use worklocation_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(cli.tracing_config(config.debug)) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(hint) = e.hint() {
                eprintln!("hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
    .map_err(ClientError::Config)?;

    config.apply_cli(cli);
    Ok(config)
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Some(Command::Watch) => commands::watch::run(&config).await,
        Some(Command::Status) | None => commands::status::run(&config, cli.json).await,
    }
}
