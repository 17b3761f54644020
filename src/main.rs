//! Lobby info CLI entry point.
//!
//! `watch` (the default) tails the live game log and reports signals until
//! Ctrl-C. `replay` runs a saved log through the rules without touching the
//! network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use lobby_info::config::{load_config, runtime_paths, Config};
use lobby_info::reader::LobbyReader;
use lobby_info::rules::RuleSet;
use lobby_info::signal::LobbySignal;
use lobby_info::tailer::LogTailer;

/// Live lobby and match details from the Dead by Daylight log.
#[derive(Parser)]
#[command(name = "lobby-info", version, about)]
struct Cli {
    /// Config file (defaults to `config.toml` under the runtime directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Watch the live game log and report lobby signals.
    Watch {
        /// Override the watched log directory.
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
    /// Classify every line of a saved log and print the parsed events.
    Replay {
        /// Log file to replay.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Watch { log_dir: None }) {
        Command::Watch { log_dir } => handle_watch(cli.config.as_deref(), log_dir).await,
        Command::Replay { file } => handle_replay(&file),
    }
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => load_config(&runtime_paths()?.config_toml),
    }
}

/// Run the reader until Ctrl-C or until the signal channel closes.
async fn handle_watch(config_path: Option<&Path>, log_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let paths = runtime_paths()?;
    let _logging_guard = lobby_info::logging::init_production(&paths.logs_dir)?;

    let mut config = resolve_config(config_path)?;
    if log_dir.is_some() {
        config.log.directory = log_dir;
    }

    let (reader, mut signals) = LobbyReader::start(&config).await?;

    loop {
        tokio::select! {
            signal = signals.recv() => {
                let Some(signal) = signal else {
                    info!("signal channel closed");
                    break;
                };
                report(&reader, &signal);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal");
                break;
            }
        }
    }

    Ok(())
}

/// Stand-in for the presentation layer: one log line per signal.
///
/// Customization changes are only reported for killers.
fn report(reader: &LobbyReader, signal: &LobbySignal) {
    match signal {
        LobbySignal::LobbyLeft => info!("left lobby"),
        LobbySignal::CustomizationChanged(change) => {
            if !change.character.is_killer() {
                debug!(outfit = %change.outfit, "ignoring survivor customization");
                return;
            }
            info!(
                killer = %change.character.display_name,
                outfit = %change.outfit,
                category = ?change.item.category,
                base_directory = ?reader.base_directory(),
                "killer customization"
            );
        }
        LobbySignal::MatchInfo { rank, match_id } => info!(rank, match_id = %match_id, "match"),
        LobbySignal::KillerIdentified(record) => info!(
            cloud_id = %record.user_id,
            steam_id = record.steam_id().unwrap_or("unknown"),
            name = record.steam_name().unwrap_or("unknown"),
            "killer identified"
        ),
    }
}

/// Print every event the standard rules find in `file`.
fn handle_replay(file: &Path) -> anyhow::Result<()> {
    lobby_info::logging::init_cli();

    let rules = RuleSet::standard().context("failed to compile log rules")?;
    let tailer = LogTailer::from_start(file.to_path_buf());
    let lines = tailer.read_remaining_lines()?;

    let mut matched: usize = 0;
    for (index, line) in lines.iter().enumerate() {
        match rules.classify(line) {
            Some(Ok(event)) => {
                matched = matched.saturating_add(1);
                println!("{:>6}  {event:?}", index.saturating_add(1));
            }
            Some(Err(e)) => println!("{:>6}  rejected: {e}", index.saturating_add(1)),
            None => {}
        }
    }

    info!(lines = lines.len(), matched, "replay finished");
    Ok(())
}
