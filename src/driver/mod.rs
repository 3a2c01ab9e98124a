//! The benchmark driver.
//!
//! For every configured [`Strategy`] the driver builds the matching test
//! model, subscribes the chained observer (`X` → `Y = X + 1` → `Z = Y + 1`),
//! writes `X` `loop_count` times and records the elapsed time.
//!
//! ```rust
//! use bindable::driver::{self, BenchConfig, Strategy};
//!
//! let config = BenchConfig {
//!     loop_count: 100,
//!     strategies: vec![Strategy::Standard, Strategy::Stacked],
//!     verify: true,
//!     ..BenchConfig::default()
//! };
//! let report = driver::run(&config).unwrap();
//! assert_eq!(report.results.len(), 2);
//! assert!(report.results.iter().all(|r| r.notifications == 300));
//! ```

pub mod config;
pub mod report;
pub mod runner;

pub use config::{BenchConfig, Strategy, DEFAULT_LOOP_COUNT};
pub use report::{BenchReport, BenchResult};
pub use runner::{measure, measure_concurrent, Measurement};

use anyhow::{ensure, Result};

use crate::model::{CachedTestModel, StackedTestModel, StandardTestModel, TestModel, ThreadStackedTestModel};

fn run_model<M: TestModel>(strategy: Strategy, config: &BenchConfig) -> Result<BenchResult> {
    let measurement = measure_concurrent::<M>(config.loop_count, config.threads, config.verify)?;
    ensure!(
        measurement.violations == 0,
        "{}: {} notifications broke the chained relation",
        M::NAME,
        measurement.violations
    );
    let result = BenchResult::new(strategy, M::NAME, config.loop_count, config.threads, &measurement);
    tracing::debug!(
        strategy = %strategy,
        notifications = result.notifications,
        elapsed_ms = result.elapsed_ms,
        ns_per_notification = result.ns_per_notification,
        "strategy finished"
    );
    Ok(result)
}

/// Runs one strategy as configured.
pub fn run_strategy(strategy: Strategy, config: &BenchConfig) -> Result<BenchResult> {
    match strategy {
        Strategy::Standard => run_model::<StandardTestModel>(strategy, config),
        Strategy::Cached => run_model::<CachedTestModel>(strategy, config),
        Strategy::Stacked => run_model::<StackedTestModel>(strategy, config),
        Strategy::ThreadStacked => run_model::<ThreadStackedTestModel>(strategy, config),
    }
}

/// Validates `config` and runs every strategy in order.
pub fn run(config: &BenchConfig) -> Result<BenchReport> {
    config.validate()?;
    tracing::info!(
        loop_count = config.loop_count,
        threads = config.threads,
        strategies = config.strategies.len(),
        verify = config.verify,
        "starting notification benchmark"
    );

    let results = config
        .strategies
        .iter()
        .map(|&strategy| run_strategy(strategy, config))
        .collect::<Result<Vec<_>>>()?;

    let report = BenchReport::new(results);
    if let Some(fastest) = report.fastest() {
        tracing::info!(
            fastest = %fastest.strategy,
            ns_per_notification = fastest.ns_per_notification,
            "benchmark complete"
        );
    }
    Ok(report)
}
