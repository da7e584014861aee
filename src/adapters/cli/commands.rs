//! CLI Command Definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pairs Alpha - spread statistics and paired directional signals
#[derive(Parser, Debug)]
#[command(
    name = "pairs-alpha",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Pairs trading signal generator",
    long_about = "Pairs Alpha tracks the price and volume spread of two instruments over \
                  rolling windows and emits paired Up/Down signals when the spread breaks \
                  its asymmetric bands."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Warm up from history and process a tick feed
    Run(RunCmd),

    /// Validate configuration and print resolved parameters
    Check(CheckCmd),
}

impl Command {
    pub fn config_path(&self) -> &PathBuf {
        match self {
            Command::Run(cmd) => &cmd.config,
            Command::Check(cmd) => &cmd.config,
        }
    }
}

/// Process a tick feed
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "PAIRS_CONFIG", default_value = "config/pairs.toml")]
    pub config: PathBuf,

    /// JSON file with historical closes per instrument
    #[arg(long, value_name = "FILE")]
    pub history: PathBuf,

    /// JSON-lines tick feed (reads stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub ticks: Option<PathBuf>,

    /// Print an engine snapshot to stderr when the feed ends
    #[arg(long)]
    pub summary: bool,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "PAIRS_CONFIG", default_value = "config/pairs.toml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let app = CliApp::try_parse_from([
            "pairs-alpha",
            "run",
            "--config",
            "pairs.toml",
            "--history",
            "history.json",
            "--ticks",
            "ticks.jsonl",
            "-v",
        ])
        .unwrap();

        assert!(app.verbose);
        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("pairs.toml"));
                assert_eq!(cmd.history, PathBuf::from("history.json"));
                assert_eq!(cmd.ticks, Some(PathBuf::from("ticks.jsonl")));
                assert!(!cmd.summary);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_history() {
        assert!(CliApp::try_parse_from(["pairs-alpha", "run"]).is_err());
    }

    #[test]
    fn test_parse_check_json() {
        let app = CliApp::try_parse_from(["pairs-alpha", "check", "-c", "x.toml", "--format", "json"]).unwrap();
        match app.command {
            Command::Check(cmd) => assert_eq!(cmd.format, OutputFormat::Json),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        CliApp::command().debug_assert();
    }
}
