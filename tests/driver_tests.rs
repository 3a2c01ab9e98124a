//! End-to-end driver runs, config files and JSON reports.

use bindable::driver::{self, measure, measure_concurrent, BenchConfig, BenchReport, Strategy};
use bindable::{CachedTestModel, StackedTestModel, StandardTestModel, ThreadStackedTestModel};
use std::fs;

fn small(strategies: &[Strategy], threads: usize) -> BenchConfig {
    BenchConfig {
        loop_count: 64,
        strategies: strategies.to_vec(),
        threads,
        verify: true,
    }
}

#[test]
fn test_run_every_strategy_in_order() {
    let report = driver::run(&small(&Strategy::ALL, 1)).unwrap();
    let strategies: Vec<Strategy> = report.results.iter().map(|r| r.strategy).collect();
    assert_eq!(strategies, Strategy::ALL);

    let models: Vec<&str> = report.results.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(
        models,
        ["StandardTestModel", "CachedTestModel", "StackedTestModel", "ThreadStackedTestModel"]
    );
    for result in &report.results {
        assert_eq!(result.loop_count, 64);
        assert_eq!(result.notifications, 3 * 64);
        assert!(result.to_string().starts_with(&format!("{} : ", result.model)));
        assert!(result.to_string().ends_with(" ms"));
    }
}

#[test]
fn test_run_with_threads_sums_notifications() {
    let report = driver::run(&small(&[Strategy::Cached, Strategy::ThreadStacked], 4)).unwrap();
    for result in &report.results {
        assert_eq!(result.threads, 4);
        assert_eq!(result.notifications, 4 * 3 * 64);
    }
}

#[test]
fn test_measure_counts_three_notifications_per_write() {
    assert_eq!(measure::<StandardTestModel>(10, true).notifications, 30);
    assert_eq!(measure::<CachedTestModel>(10, true).notifications, 30);
    assert_eq!(measure::<StackedTestModel>(10, true).violations, 0);
    let concurrent = measure_concurrent::<ThreadStackedTestModel>(10, 3, true).unwrap();
    assert_eq!(concurrent.notifications, 90);
    assert_eq!(concurrent.violations, 0);
}

#[test]
fn test_run_rejects_invalid_config() {
    let mut config = small(&[Strategy::Standard], 1);
    config.loop_count = 0;
    assert!(driver::run(&config).is_err());

    let mut config = small(&[Strategy::Standard], 0);
    config.loop_count = 1;
    let err = driver::run(&config).unwrap_err();
    assert!(err.to_string().contains("threads"));

    let config = small(&[], 1);
    assert!(driver::run(&config).is_err());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.json");
    fs::write(
        &path,
        r#"{ "loop_count": 32, "strategies": ["stacked", "cached"], "verify": true }"#,
    )
    .unwrap();

    let config = BenchConfig::from_json_file(&path).unwrap();
    assert_eq!(config.loop_count, 32);
    assert_eq!(config.strategies, [Strategy::Stacked, Strategy::Cached]);
    assert!(config.verify);

    let missing = BenchConfig::from_json_file(dir.path().join("missing.json")).unwrap_err();
    assert!(format!("{missing:#}").contains("missing.json"));
}

#[test]
fn test_report_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("report.json");

    let report = driver::run(&small(&[Strategy::Standard, Strategy::Stacked], 1)).unwrap();
    report.write_json(&path).unwrap();

    let back: BenchReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back.results.len(), 2);
    assert_eq!(back.results[1].strategy, Strategy::Stacked);
    assert_eq!(back.results[1].model, "StackedTestModel");
    assert_eq!(back.results[0].notifications, report.results[0].notifications);
}
