//! `regbox`: run a producer and a consumer against a shared register file and
//! report whether every transaction read back what was written.
//!
//! ```text
//! USAGE:
//!   regbox [--count N] [--seed S] [--capacity C] [--backend mutex|atomic] [--json]
//! ```
//!
//! Exits with a non-zero status if verification failed.
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use regbox::register::{AtomicRegister, MutexRegister, Register};
use regbox::{Config, Coordinator, Summary};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Backend {
    /// One mutex per register.
    #[default]
    Mutex,
    /// One sequentially consistent atomic word per register.
    Atomic,
}

#[derive(Debug, Parser)]
#[command(name = "regbox", about = "Verify a register file shared through a mailbox", version)]
struct Cli {
    /// JSON file with a base configuration. Flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bits per register.
    #[arg(long)]
    width: Option<u32>,
    /// Number of registers.
    #[arg(long)]
    depth: Option<usize>,
    /// Number of transactions to produce.
    #[arg(long)]
    count: Option<usize>,
    /// Time units the producer waits after each transaction.
    #[arg(long)]
    pacing: Option<u64>,
    /// Time units the consumer waits after each transaction.
    #[arg(long)]
    consumer_pacing: Option<u64>,
    /// Time units the consumer may keep draining after the producer is done.
    #[arg(long)]
    grace: Option<u64>,
    /// Time units after which the run is stopped unconditionally.
    #[arg(long)]
    deadline: Option<u64>,
    /// Bound the mailbox to this many queued transactions.
    #[arg(long)]
    capacity: Option<usize>,
    /// Seed for transaction generation.
    #[arg(long)]
    seed: Option<u64>,
    /// Length of a time unit, in microseconds.
    #[arg(long)]
    time_unit_us: Option<u64>,
    /// Storage used for each register.
    #[arg(long, value_enum, default_value_t)]
    backend: Backend,
    /// Print the summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(count) = self.count {
            config.transaction_count = count;
        }
        if let Some(pacing) = self.pacing {
            config.pacing_interval = pacing;
        }
        if self.consumer_pacing.is_some() {
            config.consumer_pacing_interval = self.consumer_pacing;
        }
        if let Some(grace) = self.grace {
            config.shutdown_grace = grace;
        }
        if let Some(deadline) = self.deadline {
            config.deadline = deadline;
        }
        if self.capacity.is_some() {
            config.mailbox_capacity = self.capacity;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(micros) = self.time_unit_us {
            config.time_unit = Duration::from_micros(micros);
        }
        Ok(config)
    }
}

async fn run<R: Register + 'static>(config: Config) -> Result<Summary> {
    let coordinator = Coordinator::<R>::with_backend(config)?;
    Ok(coordinator.run().await?)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.to_config()?;

    let summary = match cli.backend {
        Backend::Mutex => run::<MutexRegister>(config).await?,
        Backend::Atomic => run::<AtomicRegister>(config).await?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
        for failure in summary.failures() {
            println!("FAILED {failure}");
        }
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["regbox", "--count", "3", "--capacity", "2", "--seed", "9"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.transaction_count, 3);
        assert_eq!(config.mailbox_capacity, Some(2));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.depth, regbox::config::DEPTH);
    }

    #[test]
    fn time_unit_is_in_microseconds() {
        let cli = Cli::parse_from(["regbox", "--time-unit-us", "250"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.time_unit, Duration::from_micros(250));
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
