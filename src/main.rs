//! EV charging-site simulator entry point: CLI wiring and config-driven
//! engine construction.

use std::process;

use tracing::error;

use ev_charge_sim::SimError;
use ev_charge_sim::cli::{self, CliOptions};
use ev_charge_sim::config::ScenarioConfig;
use ev_charge_sim::io::export::{export_sweep_csv, export_trace_csv};
use ev_charge_sim::logging::init_tracing;
use ev_charge_sim::sim::engine::Engine;
use ev_charge_sim::sim::sweep::{SweepReport, run_sweep};
use ev_charge_sim::sim::types::{SimConfig, SimulationRun};

#[cfg(feature = "api")]
const DEFAULT_PORT: u16 = 3000;

fn load_scenario(opts: &CliOptions) -> Result<ScenarioConfig, String> {
    let mut scenario = if let Some(ref path) = opts.scenario {
        ScenarioConfig::from_toml_file(path).map_err(|e| e.to_string())?
    } else if let Some(ref name) = opts.preset {
        ScenarioConfig::from_preset(name).map_err(|e| e.to_string())?
    } else {
        ScenarioConfig::baseline()
    };
    opts.apply_overrides(&mut scenario);

    let errors = scenario.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(lines.join("\n"));
    }
    Ok(scenario)
}

/// Runs the main simulation and, if requested, the sweep on the same
/// random source.
fn run(
    scenario: &ScenarioConfig,
    opts: &CliOptions,
) -> Result<(SimConfig, SimulationRun, Option<SweepReport>), SimError> {
    let built = scenario.build()?;
    let mut chargepoints = built.chargepoints;

    #[cfg(feature = "api")]
    let keep_trace = opts.trace_out.is_some() || opts.serve;
    #[cfg(not(feature = "api"))]
    let keep_trace = opts.trace_out.is_some();

    let mut engine = Engine::seeded(built.sim_config.clone(), built.model).with_trace(keep_trace);
    let sim_run = engine.run(&mut chargepoints)?;

    let sweep = if opts.sweep {
        let mut sweep_engine = engine.with_trace(false);
        Some(run_sweep(
            &mut sweep_engine,
            scenario.chargepoints.power_kw,
            scenario.sweep.max_chargepoints,
        )?)
    } else {
        None
    };

    Ok((built.sim_config, sim_run, sweep))
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    init_tracing(opts.log_json);

    let scenario = match load_scenario(&opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    println!(
        "Simulating {} chargepoints at {} kW for {} days",
        scenario.chargepoints.count, scenario.chargepoints.power_kw, scenario.simulation.days
    );

    #[cfg_attr(not(feature = "api"), expect(unused_variables))]
    let (sim_config, sim_run, sweep) = match run(&scenario, &opts) {
        Ok(out) => out,
        Err(e) => {
            error!(error = %e, "simulation failed");
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("\n{}", sim_run.result);

    if let Some(ref report) = sweep {
        println!("\n{report}");
    }

    if let Some(ref path) = opts.trace_out {
        if let Err(e) = export_trace_csv(&sim_run.trace, path) {
            eprintln!("error: failed to write trace CSV: {e}");
            process::exit(1);
        }
        eprintln!("Trace written to {}", path.display());
    }

    if let (Some(path), Some(report)) = (opts.sweep_out.as_deref(), sweep.as_ref()) {
        if let Err(e) = export_sweep_csv(&report.rows, path) {
            eprintln!("error: failed to write sweep CSV: {e}");
            process::exit(1);
        }
        eprintln!("Sweep written to {}", path.display());
    }

    #[cfg(feature = "api")]
    if opts.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(ev_charge_sim::api::AppState {
            config: sim_config,
            result: sim_run.result,
            trace: sim_run.trace,
            sweep,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], opts.port.unwrap_or(DEFAULT_PORT)));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(ev_charge_sim::api::serve(state, addr)) {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
