//! Benchmark results and their JSON form.

use core::fmt;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::config::Strategy;
use super::runner::Measurement;

/// One strategy's measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    /// Strategy that was run.
    pub strategy: Strategy,
    /// Model type that implements it.
    pub model: String,
    /// `X` mutations per thread.
    pub loop_count: u64,
    /// Threads that ran the loop.
    pub threads: usize,
    /// Observer invocations across all threads.
    pub notifications: u64,
    /// Wall-clock milliseconds.
    pub elapsed_ms: f64,
    /// Average cost of one notification, including the setter that raised it.
    pub ns_per_notification: f64,
}

impl BenchResult {
    /// Builds a result row from a measurement.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(strategy: Strategy, model: &str, loop_count: u64, threads: usize, measurement: &Measurement) -> Self {
        let elapsed_ns = measurement.elapsed.as_secs_f64() * 1e9;
        // Concurrent threads overlap, so divide by per-thread notifications.
        let per_thread = measurement.notifications as f64 / threads.max(1) as f64;
        let ns_per_notification = if per_thread > 0.0 { elapsed_ns / per_thread } else { 0.0 };
        Self {
            strategy,
            model: model.to_owned(),
            loop_count,
            threads,
            notifications: measurement.notifications,
            elapsed_ms: elapsed_ns / 1e6,
            ns_per_notification,
        }
    }
}

impl fmt::Display for BenchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {:.0} ms", self.model, self.elapsed_ms)
    }
}

/// Every result of one driver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    /// Seconds since the Unix epoch when the run finished.
    pub timestamp: u64,
    /// Results in run order.
    pub results: Vec<BenchResult>,
}

impl BenchReport {
    /// Wraps `results`, stamped with the current time.
    pub fn new(results: Vec<BenchResult>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self { timestamp, results }
    }

    /// The result with the lowest per-notification cost.
    pub fn fastest(&self) -> Option<&BenchResult> {
        self.results
            .iter()
            .min_by(|a, b| a.ns_per_notification.total_cmp(&b.ns_per_notification))
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize benchmark report")
    }

    /// Writes the pretty JSON report to `path`, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("failed to write benchmark report {}", path.display()))
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{result}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(strategy: Strategy, model: &str, millis: u64) -> BenchResult {
        let measurement = Measurement {
            elapsed: Duration::from_millis(millis),
            notifications: 3_000,
            violations: 0,
        };
        BenchResult::new(strategy, model, 1_000, 1, &measurement)
    }

    #[test]
    fn test_result_line_matches_driver_output() {
        let row = result(Strategy::Standard, "StandardTestModel", 12);
        assert_eq!(row.to_string(), "StandardTestModel : 12 ms");
        assert!((row.ns_per_notification - 4_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_fastest_picks_lowest_cost() {
        let report = BenchReport::new(vec![
            result(Strategy::Standard, "StandardTestModel", 30),
            result(Strategy::Stacked, "StackedTestModel", 10),
            result(Strategy::Cached, "CachedTestModel", 20),
        ]);
        assert_eq!(report.fastest().map(|r| r.strategy), Some(Strategy::Stacked));
        assert_eq!(report.to_string().lines().count(), 3);
    }

    #[test]
    fn test_report_json_shape() {
        let report = BenchReport::new(vec![result(Strategy::ThreadStacked, "ThreadStackedTestModel", 5)]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["results"][0]["strategy"], "thread-stacked");
        assert_eq!(json["results"][0]["notifications"], 3_000);

        let back: BenchReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
