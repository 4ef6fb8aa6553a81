//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use worklocation_core::TracingConfig;

/// worklocation - Today's working location from your calendar
#[derive(Debug, Parser)]
#[command(name = "worklocation")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "WORKLOCATION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Calendar to query (overrides config)
    #[arg(long, global = true)]
    pub calendar_id: Option<String>,

    /// Report `none` when no event covers the current time
    #[arg(long, global = true)]
    pub none_outside_hours: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Poll timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns true if this invocation runs the watch loop.
    pub fn is_watch(&self) -> bool {
        matches!(self.command, Some(Command::Watch))
    }

    /// Tracing preset for this invocation.
    ///
    /// `watch` logs state changes at info, as JSON lines with `--json`.
    pub fn tracing_config(&self, debug: bool) -> TracingConfig {
        if debug {
            TracingConfig::cli_debug()
        } else if self.is_watch() && self.json {
            TracingConfig::daemon()
        } else if self.is_watch() {
            TracingConfig::default().with_level(Level::INFO)
        } else {
            TracingConfig::default()
        }
    }
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show today's working location (default)
    Status,

    /// Poll periodically and log changes until interrupted
    Watch,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Dump,
    /// Validate the configuration and credentials
    Validate,
    /// Show the configuration file path
    Path,
}
