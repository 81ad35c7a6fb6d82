//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt;

use ev_charge_sim::api::{AppState, router};
use ev_charge_sim::sim::sweep::run_sweep;

/// Build a full simulation and return the API state.
fn build_api_state(with_sweep: bool) -> Arc<AppState> {
    let config = common::config_for_days(2);
    let mut cps = common::fleet(5, &config);
    let mut engine = common::default_engine(&config).with_trace(true);
    let run = engine.run(&mut cps).expect("run should succeed");

    let sweep = with_sweep.then(|| run_sweep(&mut engine, 11.0, 3).expect("sweep should succeed"));

    Arc::new(AppState {
        config,
        result: run.result,
        trace: run.trace,
        sweep,
    })
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn summary_endpoint_reports_result_and_latest_tick() {
    let app = router(build_api_state(false));
    let (status, json) = get_json(app, "/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["theoretical_max_power_demand_kw"], 55.0);
    assert_eq!(json["result"]["ticks_simulated"], 192);
    assert_eq!(json["config"]["ticks_per_hour"], 4);
    assert_eq!(json["latest_tick"]["step"], 191);
    assert_eq!(json["latest_tick"]["hour"], 23);
}

#[tokio::test]
async fn trace_endpoint_filters_inclusive_range() {
    let app = router(build_api_state(false));
    let (status, json) = get_json(app, "/trace?from=10&to=13").await;

    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().expect("trace should be an array");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["step"], 10);
    assert_eq!(rows[3]["step"], 13);
}

#[tokio::test]
async fn trace_endpoint_returns_everything_without_query() {
    let app = router(build_api_state(false));
    let (status, json) = get_json(app, "/trace").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(Vec::len), Some(192));
}

#[tokio::test]
async fn trace_endpoint_rejects_inverted_range() {
    let app = router(build_api_state(false));
    let (status, json) = get_json(app, "/trace?from=10&to=5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap_or("").contains("must be <="));
}

#[tokio::test]
async fn sweep_endpoint_depends_on_sweep_run() {
    let (status, _) = get_json(router(build_api_state(false)), "/sweep").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get_json(router(build_api_state(true)), "/sweep").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(3));
}
