//! tally-replay: rebuild wallet state from decoded blocks and report it as JSON.

mod input;
mod replay;

use clap::Parser;
use input::ReplayInput;
use replay::{replay, ReplayOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tally_ledger::{AttributeKey, LedgerConfig, LedgerError, WalletManager};
use tally_types::{Clock, RoundInfo, SystemClock, Timestamp};
use tally_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "tally-replay", about = "Replay blocks through the tally wallet manager")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the configuration file.
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Overrides the configuration file.
    #[arg(long, env = "TALLY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Apply every block of a JSON input and print the resulting state.
    Run {
        /// JSON file with optional `wallets` and the `blocks` to apply.
        input: PathBuf,

        /// Purge empty non-delegate wallets after the last block.
        #[arg(long)]
        purge: bool,

        /// Process stake power-ups due at or before this time (seconds since epoch).
        #[arg(long)]
        power_ups_until: Option<u64>,

        /// Number of active delegates; loads the active list instead of a full ranking.
        #[arg(long)]
        delegates: Option<usize>,

        /// Round number reported with the active list.
        #[arg(long, default_value_t = 1)]
        round: u64,

        /// Attribute to report per wallet, e.g. "delegate.username". Repeatable.
        #[arg(long = "attribute")]
        attributes: Vec<AttributeKey>,

        /// Fix the clock at this time (seconds since epoch) instead of reading the
        /// system clock.
        #[arg(long)]
        now: Option<u64>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
struct FixedClock(Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match LedgerConfig::from_toml_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => LedgerConfig::default(),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(cli.log_format.unwrap_or(config.log_format), level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<LedgerError>() {
            Some(ledger) if ledger.is_fatal() => {
                tracing::error!(error = %ledger, "fatal ledger error, wallet state can't be trusted");
                ExitCode::from(2)
            }
            _ => {
                tracing::error!("{e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(command: Command, config: &LedgerConfig) -> anyhow::Result<()> {
    match command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Run {
            input,
            purge,
            power_ups_until,
            delegates,
            round,
            attributes,
            now,
        } => {
            let clock: Arc<dyn Clock> = match now {
                Some(secs) => Arc::new(FixedClock(Timestamp::new(secs))),
                None => Arc::new(SystemClock::new(config.epoch_unix_secs)),
            };
            let mut manager = WalletManager::new(config, clock);
            let input = ReplayInput::from_json_file(&input)?;
            let options = ReplayOptions {
                purge,
                power_ups_until: power_ups_until.map(Timestamp::new),
                round: delegates.map(|max| RoundInfo::new(round, max)),
                attributes,
            };

            let report = replay(&mut manager, input, &options)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
