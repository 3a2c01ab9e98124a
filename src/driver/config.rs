//! Benchmark configuration.

use core::fmt;
use core::str::FromStr;
use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Mutations per strategy when nothing else is configured. Debug builds run a
/// short smoke loop; measurements are only meaningful in release builds.
pub const DEFAULT_LOOP_COUNT: u64 = if cfg!(debug_assertions) { 100 } else { 10_000_000 };

/// A notification strategy to benchmark, each backed by one test model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// [`StandardTestModel`](crate::model::StandardTestModel): a new record per notification.
    Standard,
    /// [`CachedTestModel`](crate::model::CachedTestModel): shared records from the global cache.
    Cached,
    /// [`StackedTestModel`](crate::model::StackedTestModel): per-instance record stack.
    Stacked,
    /// [`ThreadStackedTestModel`](crate::model::ThreadStackedTestModel): per-thread record stack.
    ThreadStacked,
}

impl Strategy {
    /// Every strategy.
    pub const ALL: [Strategy; 4] = [
        Strategy::Standard,
        Strategy::Cached,
        Strategy::Stacked,
        Strategy::ThreadStacked,
    ];

    /// The strategies benchmarked by default.
    pub const DEFAULT: [Strategy; 3] = [Strategy::Standard, Strategy::Cached, Strategy::Stacked];

    /// Command-line / config spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Standard => "standard",
            Strategy::Cached => "cached",
            Strategy::Stacked => "stacked",
            Strategy::ThreadStacked => "thread-stacked",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Strategy::Standard),
            "cached" => Ok(Strategy::Cached),
            "stacked" => Ok(Strategy::Stacked),
            "thread-stacked" | "thread_stacked" => Ok(Strategy::ThreadStacked),
            other => bail!(
                "unknown strategy `{other}` (expected one of: standard, cached, stacked, thread-stacked)"
            ),
        }
    }
}

/// What to run and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Sequential `X` mutations per strategy (per thread).
    pub loop_count: u64,
    /// Strategies to run, in order.
    pub strategies: Vec<Strategy>,
    /// Threads running the loop concurrently, each on its own model.
    pub threads: usize,
    /// Check the chained-observer relations on every notification. On by
    /// default in debug builds.
    pub verify: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            loop_count: DEFAULT_LOOP_COUNT,
            strategies: Strategy::DEFAULT.to_vec(),
            threads: 1,
            verify: cfg!(debug_assertions),
        }
    }
}

impl BenchConfig {
    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid benchmark config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config from `path`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read benchmark config {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Rejects configs that cannot produce a measurement.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.loop_count > 0, "loop_count must be > 0");
        ensure!(self.threads > 0, "threads must be > 0");
        ensure!(!self.strategies.is_empty(), "at least one strategy is required");
        Ok(())
    }
}
