//! Integration tests for full simulation runs with the default tables.

mod common;

use rand::SeedableRng;
use rand::rngs::StdRng;

use ev_charge_sim::config::ScenarioConfig;
use ev_charge_sim::probability::ProbabilityModel;
use ev_charge_sim::sim::engine::Engine;

#[test]
fn single_chargepoint_bounds() {
    let config = common::config_for_days(30);
    let mut cps = common::fleet(1, &config);
    let mut engine = common::default_engine(&config);

    let result = engine.run(&mut cps).expect("run should succeed").result;
    assert_eq!(result.theoretical_max_power_demand_kw, 11.0);
    assert!((0.0..=11.0).contains(&result.actual_max_power_demand_kw));
    assert!((0.0..=100.0).contains(&result.concurrency_factor_pct));
    assert_eq!(result.ticks_simulated, 30 * 96);
}

#[test]
fn theoretical_peak_scales_with_fleet_size() {
    for n in [1, 2, 5, 13, 20] {
        let config = common::config_for_days(3);
        let mut cps = common::fleet(n, &config);
        let mut engine = common::default_engine(&config);

        let result = engine.run(&mut cps).expect("run should succeed").result;
        assert_eq!(result.theoretical_max_power_demand_kw, 11.0 * n as f64);
        assert!(result.actual_max_power_demand_kw <= result.theoretical_max_power_demand_kw);
    }
}

#[test]
fn actual_peak_is_whole_multiple_of_rating() {
    let config = common::config_for_days(30);
    let mut cps = common::fleet(10, &config);
    let mut engine = common::default_engine(&config);

    let peak = engine
        .run(&mut cps)
        .expect("run should succeed")
        .result
        .actual_max_power_demand_kw;
    let chargers = peak / 11.0;
    assert!((chargers - chargers.round()).abs() < 1e-9);
}

#[test]
fn year_long_baseline_produces_sessions_and_energy() {
    let config = common::config_for_days(365);
    let mut cps = common::fleet(20, &config);
    let mut engine = common::default_engine(&config);

    let result = engine.run(&mut cps).expect("run should succeed").result;
    assert!(result.total_charging_sessions > 0);
    assert!(result.total_energy_consumed_kwh > 0.0);
    assert!(result.actual_max_power_demand_kw > 0.0);
    assert!(result.concurrency_factor_pct < 100.0);
}

#[test]
fn energy_matches_integrated_trace() {
    let config = common::config_for_days(14);
    let mut cps = common::fleet(6, &config);
    let mut engine = common::default_engine(&config).with_trace(true);

    let run = engine.run(&mut cps).expect("run should succeed");
    let integrated: f64 = run.trace.iter().map(|r| r.power_kw * config.dt_hours()).sum();
    assert!(
        (integrated - run.result.total_energy_consumed_kwh).abs() < 1e-6,
        "integrated={integrated}, reported={}",
        run.result.total_energy_consumed_kwh
    );

    let per_cp: f64 = cps.iter().map(|c| c.total_energy_consumed_kwh()).sum();
    assert!((per_cp - run.result.total_energy_consumed_kwh).abs() < 1e-9);
}

#[test]
fn repeated_runs_start_from_reset_state() {
    let config = common::config_for_days(10);
    let mut cps = common::fleet(4, &config);

    let mut engine = common::default_engine(&config);
    let first = engine.run(&mut cps).expect("first run").result;

    // Second engine with the same seed sees the same fleet after the first run.
    let mut fresh = common::default_engine(&config);
    let second = fresh.run(&mut cps).expect("second run").result;

    assert_eq!(first, second, "totals from the first run leaked");
}

#[test]
fn determinism_for_identical_seed() {
    let config = common::config_for_days(20);
    let mut a = common::fleet(8, &config);
    let mut b = common::fleet(8, &config);

    let ra = common::default_engine(&config)
        .with_trace(true)
        .run(&mut a)
        .expect("run a");
    let rb = common::default_engine(&config)
        .with_trace(true)
        .run(&mut b)
        .expect("run b");

    assert_eq!(ra.result, rb.result);
    assert_eq!(ra.trace, rb.trace);
}

#[test]
fn different_seeds_diverge() {
    let config = common::config_for_days(60);
    let mut a = common::fleet(10, &config);
    let mut b = common::fleet(10, &config);

    let ra = Engine::new(config.clone(), ProbabilityModel::default(), StdRng::seed_from_u64(1))
        .run(&mut a)
        .expect("run a");
    let rb = Engine::new(config.clone(), ProbabilityModel::default(), StdRng::seed_from_u64(2))
        .run(&mut b)
        .expect("run b");

    assert_ne!(
        ra.result.total_energy_consumed_kwh,
        rb.result.total_energy_consumed_kwh
    );
}

#[test]
fn higher_arrival_multiplier_delivers_more_energy() {
    let mut quiet = ScenarioConfig::baseline();
    quiet.simulation.days = 90;
    quiet.ev.arrival_multiplier_pct = 50.0;
    let mut busy = quiet.clone();
    busy.ev.arrival_multiplier_pct = 300.0;

    let energy = |cfg: &ScenarioConfig| {
        let mut s = cfg.build().expect("valid scenario");
        Engine::seeded(s.sim_config, s.model)
            .run(&mut s.chargepoints)
            .expect("run")
            .result
            .total_energy_consumed_kwh
    };

    assert!(energy(&busy) > energy(&quiet));
}
