use std::process::Command;

#[derive(Debug)]
struct Summary {
    energy_kwh: f64,
    theoretical_kw: f64,
    actual_kw: f64,
    concurrency_pct: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_dynamics() {
    let small = run_and_parse(&["--scenario", "scenarios/small_site.toml"]);
    let evening = run_and_parse(&["--scenario", "scenarios/evening_peak.toml"]);

    assert_eq!(small.theoretical_kw, 88.0);
    assert_eq!(evening.theoretical_kw, 88.0);
    for s in [&small, &evening] {
        assert!(s.actual_kw <= s.theoretical_kw, "{s:?}");
        assert!((0.0..=100.0).contains(&s.concurrency_pct), "{s:?}");
        assert!(s.energy_kwh > 0.0, "{s:?}");
    }
    assert!(
        (small.energy_kwh - evening.energy_kwh).abs() > 1.0,
        "expected scenarios to differ: small={small:?}, evening={evening:?}"
    );
}

#[test]
fn presets_and_overrides_via_cli() {
    let fast = run_and_parse(&["--preset", "fast_charging", "--days", "14"]);
    assert_eq!(fast.theoretical_kw, 220.0);

    let tiny = run_and_parse(&["--preset", "baseline", "--days", "7", "--chargepoints", "3"]);
    assert_eq!(tiny.theoretical_kw, 33.0);
}

#[test]
fn same_seed_gives_identical_output() {
    let args = ["--preset", "busy_depot", "--days", "10", "--seed", "5"];
    let a = run_and_parse(&args);
    let b = run_and_parse(&args);
    assert_eq!(a.energy_kwh, b.energy_kwh);
    assert_eq!(a.actual_kw, b.actual_kw);
}

#[test]
fn sweep_prints_analysis_table() {
    let output = Command::new(env!("CARGO_BIN_EXE_ev-charge-sim"))
        .args(["--scenario", "scenarios/small_site.toml", "--sweep"])
        .output()
        .expect("ev-charge-sim process should run");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Concurrency Factor Analysis"));
    assert!(stdout.contains("Trend: concurrency factor tends to be"));
}

#[test]
fn invalid_arguments_exit_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_ev-charge-sim"))
        .args(["--preset", "nonexistent"])
        .output()
        .expect("ev-charge-sim process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));

    let output = Command::new(env!("CARGO_BIN_EXE_ev-charge-sim"))
        .args(["--preset", "baseline", "--days", "0"])
        .output()
        .expect("ev-charge-sim process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("simulation.days"));
}

fn run_and_parse(args: &[&str]) -> Summary {
    let output = Command::new(env!("CARGO_BIN_EXE_ev-charge-sim"))
        .args(args)
        .output()
        .expect("ev-charge-sim process should run");

    assert!(
        output.status.success(),
        "ev-charge-sim failed for {args:?}: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    Summary {
        energy_kwh: parse_metric(&stdout, "Total energy consumed:"),
        theoretical_kw: parse_metric(&stdout, "Theoretical maximum power demand:"),
        actual_kw: parse_metric(&stdout, "Actual maximum power demand:"),
        concurrency_pct: parse_metric(&stdout, "Concurrency factor:"),
    }
}

fn parse_metric(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.starts_with(label))
        .unwrap_or_else(|| panic!("missing `{label}` in output:\n{stdout}"));

    line[label.len()..]
        .split_whitespace()
        .next()
        .map(|v| v.trim_end_matches('%'))
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or_else(|| panic!("could not parse value from line `{line}`"))
}
