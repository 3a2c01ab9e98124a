//! Times the notification strategies against each other.
//!
//! ```text
//! cargo run --release --bin notify_bench -- --loops 10000000 --strategy standard,cached,stacked
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use bindable::driver::{self, BenchConfig, Strategy};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "notify_bench")]
#[command(about = "Compare property-change notification strategies", long_about = None)]
struct Cli {
    /// JSON config file; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// `X` mutations per strategy (and per thread)
    #[arg(long)]
    loops: Option<u64>,

    /// Strategies to run: standard, cached, stacked, thread-stacked
    #[arg(long = "strategy", value_delimiter = ',')]
    strategies: Vec<Strategy>,

    /// Run the loop on this many threads at once, one model per thread
    #[arg(long)]
    threads: Option<usize>,

    /// Check the chained relations on every notification
    #[arg(long, default_value_t = false)]
    verify: bool,

    /// Also write the report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<(BenchConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_json_file(path)?,
            None => BenchConfig::default(),
        };
        if let Some(loops) = self.loops {
            config.loop_count = loops;
        }
        if !self.strategies.is_empty() {
            config.strategies = self.strategies;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        config.verify |= self.verify;
        Ok((config, self.json))
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config, json) = cli.into_config()?;
    let report = driver::run(&config)?;
    print!("{report}");
    if let Some(path) = json {
        report.write_json(&path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
