use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "bindable workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the notification benchmarks once per global allocator
    Bench {
        /// Short measurement windows, for CI and smoke runs
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Only rebuild the report from existing criterion output
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Where to write the markdown report
        #[arg(long, default_value = "benchmark_results/report.md")]
        output: PathBuf,
    },
}

const BENCH: &str = "notify_benchmark";

const ALLOCATORS: &[&str] = &["alloc-system", "alloc-mimalloc", "alloc-snmalloc", "alloc-jemalloc"];

/// Baseline every ratio is relative to.
const REFERENCE_BASELINE: &str = "system";

fn baseline_name(feature: &str) -> &str {
    feature.strip_prefix("alloc-").unwrap_or(feature)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            output,
        } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            let results = collect_results(Path::new("target/criterion"))?;
            write_report(&results, &output)?;
            println!("Report written to {}", output.display());
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Compiling {BENCH}...");
    let status = Command::new("cargo")
        .args(["build", "--release", "--bench", BENCH])
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        bail!("failed to compile {BENCH}");
    }

    let mut failed = Vec::new();
    for &feature in ALLOCATORS {
        println!("\n>>> {BENCH} with {feature}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.args(["bench", "--bench", BENCH, "--no-default-features", "--features", feature])
            .arg("--")
            .args(["--save-baseline", baseline_name(feature)]);
        if quick {
            cmd.args(["--measurement-time", "0.2", "--sample-size", "10", "--noplot"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to run {BENCH} with {feature}"))?;
        if status.success() {
            println!("Finished {feature} in {:.2?}", start.elapsed());
        } else {
            eprintln!("warning: {BENCH} failed with {feature}");
            failed.push(feature);
        }
    }

    if failed.len() == ALLOCATORS.len() {
        bail!("every allocator run failed");
    }
    Ok(())
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

#[derive(Deserialize)]
struct BenchmarkMeta {
    throughput: Option<ThroughputMeta>,
}

#[derive(Deserialize)]
enum ThroughputMeta {
    Elements(u64),
    Bytes(u64),
    BytesDecimal(u64),
}

/// `workload -> baseline -> ns per element`.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

/// Walks criterion's `<group>/<function>/<baseline>/estimates.json` tree.
fn collect_results(criterion_dir: &Path) -> Result<Results> {
    let mut results = Results::new();
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(results);
    }
    visit(criterion_dir, criterion_dir, &mut results)?;
    Ok(results)
}

fn visit(root: &Path, dir: &Path, results: &mut Results) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            visit(root, &path, results)?;
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let Some(baseline) = baseline_dir.file_name().and_then(|n| n.to_str()) else { continue };
        // criterion's own scratch baselines, and the html report tree.
        if matches!(baseline, "base" | "new" | "change" | "report") {
            continue;
        }
        let Ok(workload) = workload_dir.strip_prefix(root) else { continue };
        let workload = workload.to_string_lossy().replace('\\', "/");
        if workload.split('/').any(|part| part == "report") {
            continue;
        }

        let estimates: Estimates = read_json(&path)?;
        let elements = read_json::<BenchmarkMeta>(&baseline_dir.join("benchmark.json"))
            .ok()
            .and_then(|meta| meta.throughput)
            .map_or(1, |t| match t {
                ThroughputMeta::Elements(n) => n.max(1),
                ThroughputMeta::Bytes(_) | ThroughputMeta::BytesDecimal(_) => 1,
            });

        #[allow(clippy::cast_precision_loss)]
        let ns_per_element = estimates.mean.point_estimate / elements as f64;
        results
            .entry(workload)
            .or_default()
            .insert(baseline.to_owned(), ns_per_element);
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// The standard strategy of the same group under the reference allocator.
fn reference_for(results: &Results, workload: &str) -> Option<f64> {
    let (group, _) = workload.rsplit_once('/')?;
    results
        .get(&format!("{group}/standard"))
        .and_then(|by_baseline| by_baseline.get(REFERENCE_BASELINE))
        .copied()
}

fn render_report(results: &Results) -> String {
    let baselines: Vec<&str> = ALLOCATORS.iter().map(|f| baseline_name(f)).collect();
    let mut out = String::new();

    let _ = writeln!(out, "# Notification Benchmark Report\n");
    let _ = writeln!(
        out,
        "Mean ns per notification. Ratios are relative to the `standard` strategy under the `{REFERENCE_BASELINE}` allocator; lower is faster.\n"
    );

    let _ = write!(out, "| Workload |");
    for name in &baselines {
        let _ = write!(out, " {name} (ns) | vs {REFERENCE_BASELINE}/standard |");
    }
    let _ = writeln!(out);
    let _ = write!(out, "|---|");
    for _ in &baselines {
        let _ = write!(out, "---|---|");
    }
    let _ = writeln!(out);

    for (workload, by_baseline) in results {
        let reference = reference_for(results, workload);
        let _ = write!(out, "| {workload} |");
        for name in &baselines {
            match by_baseline.get(*name) {
                Some(&ns) => {
                    let ratio = reference
                        .filter(|r| *r > 0.0)
                        .map_or_else(|| "-".to_owned(), |r| format!("**{:.2}x**", ns / r));
                    let _ = write!(out, " {ns:.2} | {ratio} |");
                }
                None => {
                    let _ = write!(out, " N/A | - |");
                }
            }
        }
        let _ = writeln!(out);
    }
    out
}

fn write_report(results: &Results, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, render_report(results)).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Results {
        let mut results = Results::new();
        results
            .entry("chained_set_x/standard".to_owned())
            .or_default()
            .extend([("system".to_owned(), 40.0), ("mimalloc".to_owned(), 20.0)]);
        results
            .entry("chained_set_x/stacked".to_owned())
            .or_default()
            .insert("system".to_owned(), 10.0);
        results
    }

    #[test]
    fn test_ratios_are_relative_to_system_standard() {
        let report = render_report(&sample());
        assert!(report.contains("| chained_set_x/stacked | 10.00 | **0.25x** |"));
        assert!(report.contains("| chained_set_x/standard | 40.00 | **1.00x** | 20.00 | **0.50x** |"));
    }

    #[test]
    fn test_missing_baselines_render_as_na() {
        let report = render_report(&sample());
        let stacked = report.lines().find(|l| l.starts_with("| chained_set_x/stacked")).unwrap();
        assert!(stacked.contains(" N/A | - |"));
    }

    #[test]
    fn test_baseline_names_drop_feature_prefix() {
        assert_eq!(baseline_name("alloc-jemalloc"), "jemalloc");
        assert_eq!(baseline_name("custom"), "custom");
    }
}
