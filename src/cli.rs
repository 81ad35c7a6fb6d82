use std::env;
use std::path::PathBuf;

use crate::config::ScenarioConfig;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub days: Option<usize>,
    pub chargepoints: Option<usize>,
    /// Run the concurrency sweep after the main simulation.
    pub sweep: bool,
    pub trace_out: Option<PathBuf>,
    pub sweep_out: Option<PathBuf>,
    /// Emit logs as JSON lines.
    pub log_json: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: Option<u16>,
}

impl CliOptions {
    /// Applies command-line overrides on top of a loaded scenario.
    pub fn apply_overrides(&self, scenario: &mut ScenarioConfig) {
        if let Some(seed) = self.seed {
            scenario.simulation.seed = seed;
        }
        if let Some(days) = self.days {
            scenario.simulation.days = days;
        }
        if let Some(count) = self.chargepoints {
            scenario.chargepoints.count = count;
        }
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                opts.seed = Some(parse_number(args, i, "--seed", "u64")?);
            }
            "--days" => {
                i += 1;
                opts.days = Some(parse_number(args, i, "--days", "day count")?);
            }
            "--chargepoints" => {
                i += 1;
                opts.chargepoints = Some(parse_number(args, i, "--chargepoints", "count")?);
            }
            "--sweep" => opts.sweep = true,
            "--trace-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --trace-out (expected a file path)",
                )?;
                opts.trace_out = Some(PathBuf::from(path));
            }
            "--sweep-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --sweep-out (expected a file path)",
                )?;
                opts.sweep_out = Some(PathBuf::from(path));
                opts.sweep = true;
            }
            "--log-json" => opts.log_json = true,
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                opts.port = Some(parse_number(args, i, "--port", "u16")?);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("baseline".to_string());
    }

    Ok(opts)
}

fn parse_number<T: std::str::FromStr>(
    args: &[String],
    index: usize,
    flag: &str,
    expected: &str,
) -> Result<T, String> {
    let raw = args.next_or_err(index, &format!("missing value for {flag} (expected a {expected})"))?;
    raw.parse()
        .map_err(|_| format!("{flag} value \"{raw}\" is not a valid {expected}"))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("ev-charge-sim — stochastic EV charging-site simulator");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  ev-charge-sim [--scenario <path> | --preset <name>] [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --days <n>               Override simulated days");
    eprintln!("  --chargepoints <n>       Override chargepoint count");
    eprintln!("  --sweep                  Run the concurrency-factor sweep");
    eprintln!("  --trace-out <path>       Export per-tick power trace to CSV");
    eprintln!("  --sweep-out <path>       Export sweep table to CSV (implies --sweep)");
    eprintln!("  --log-json               Emit logs as JSON lines");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after simulation");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
}
