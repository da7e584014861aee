//! Pairs Alpha - Pairs trading signal generator
//!
//! Warms up from a history file, then turns a JSON-lines tick feed into
//! JSON-lines signal groups on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Stdout;
use std::path::Path;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use pairs_alpha::adapters::cli::{CheckCmd, CliApp, Command, OutputFormat, RunCmd};
use pairs_alpha::adapters::feed::{JsonHistoryFile, JsonLinesSink, TickFeed};
use pairs_alpha::application::SignalOrchestrator;
use pairs_alpha::config::{load_config, Config};
use pairs_alpha::strategy::StrategyConfig;

type StdoutOrchestrator = SignalOrchestrator<JsonHistoryFile, JsonLinesSink<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    let config_path = expand(app.command.config_path());
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Check(cmd) => check_command(cmd, config),
    }
}

fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    Ok(())
}

fn expand(path: &Path) -> String {
    shellexpand::tilde(&path.to_string_lossy()).to_string()
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    let strategy_config = StrategyConfig::from(&config);
    let history = JsonHistoryFile::new(expand(&cmd.history));
    let sink = JsonLinesSink::new(std::io::stdout());

    let mut orchestrator = SignalOrchestrator::new(strategy_config, history, sink)
        .context("Failed to create orchestrator")?
        .with_history_bars(config.strategy.history_bars());

    let (instrument_a, instrument_b) = config.pair.instruments();
    tracing::info!("Starting pairs alpha for {}/{}", instrument_a, instrument_b);

    let report = orchestrator
        .assign_pair(instrument_a, instrument_b)
        .await
        .context("Warm-up failed")?;
    tracing::info!(
        "Warm-up replayed {} rows ({:?} .. {:?})",
        report.replayed,
        report.first,
        report.last
    );

    match &cmd.ticks {
        Some(path) => {
            let path = expand(path);
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open tick feed {}", path))?;
            drive(&mut orchestrator, BufReader::new(file)).await?;
        }
        None => drive(&mut orchestrator, BufReader::new(tokio::io::stdin())).await?,
    }

    let status = orchestrator.status();
    tracing::info!(
        "Feed finished: {} batches, {} signal groups, {} pair assignments",
        status.batches_processed,
        status.groups_emitted,
        status.pair_assignments
    );
    if cmd.summary {
        eprintln!("{}", serde_json::to_string_pretty(&status)?);
    }
    Ok(())
}

/// Run the feed until it ends or Ctrl+C arrives
async fn drive<R>(orchestrator: &mut StdoutOrchestrator, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut feed = TickFeed::new(reader);
    let interrupted = tokio::select! {
        result = orchestrator.run_feed(&mut feed) => {
            result.context("Tick feed processing failed")?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        tracing::info!("Shutdown signal received");
    }
    Ok(())
}

fn check_command(cmd: CheckCmd, config: Config) -> Result<()> {
    let strategy_config = StrategyConfig::from(&config);

    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Text => {
            println!("Pair:            {} / {}", config.pair.instrument_a, config.pair.instrument_b);
            println!("Short window:    {} bars", strategy_config.short_window);
            println!("Long window:     {} bars", strategy_config.long_window);
            println!("History bars:    {}", config.strategy.history_bars());
            println!("Signal lifespan: {} min", strategy_config.signal_lifespan_minutes);
            println!("Log level:       {}", config.logging.level);
        }
    }
    Ok(())
}
