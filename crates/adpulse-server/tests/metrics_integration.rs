use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use adpulse_core::{
    report::ReportData, source::MockAdManager, PeriodWindow, ReportTotals,
};
use adpulse_server::{app::build_app, config::Config, state::AppState};

const SITE: &str = "site_news";

fn config() -> Config {
    Config {
        port: 0,
        default_window_days: 30,
        max_window_days: 365,
        cors_origins: vec![],
    }
}

fn window(start: &str, end: &str) -> PeriodWindow {
    PeriodWindow::parse(start, end).expect("window")
}

fn totals_only(values: &[f64]) -> ReportData {
    ReportData {
        rows: Vec::new(),
        totals: ReportTotals::new(values.to_vec()),
    }
}

/// March 2024 against the 30 days before it (Jan 31 – Feb 29).
fn march_source(current: &[f64], previous: &[f64]) -> MockAdManager {
    MockAdManager::new()
        .with_report(SITE, window("2024-03-01", "2024-03-30"), totals_only(current))
        .with_report(SITE, window("2024-01-31", "2024-02-29"), totals_only(previous))
}

fn setup(source: MockAdManager) -> axum::Router {
    build_app(Arc::new(AppState::new(source, config())))
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = res
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, serde_json::from_slice(&bytes).expect("parse JSON"))
}

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().expect("number");
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn test_metrics_compare_against_previous_period() {
    let app = setup(march_source(
        &[150_000.0, 4_500.0, 165_000.0],
        &[120_000.0, 4_000.0, 150_000.0],
    ));

    let (status, body) = get(
        &app,
        "/api/websites/site_news/metrics?start_date=2024-03-01&end_date=2024-03-30",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["websiteId"], SITE);
    assert_eq!(data["previous"]["start"], "2024-01-31");
    assert_eq!(data["previous"]["end"], "2024-02-29");

    let metrics = &data["metrics"];
    assert_close(&metrics["impressions"]["value"], 150_000.0);
    assert_close(&metrics["impressions"]["changePercent"], 25.0);
    assert_close(&metrics["revenue"]["changePercent"], 12.5);
    assert_close(&metrics["cpm"]["value"], 30.0);
    assert_close(&metrics["cpm"]["changePercent"], -10.0);
    assert_close(&metrics["fillRate"]["value"], 150_000.0 / 165_000.0 * 100.0);
}

#[tokio::test]
async fn test_zero_baseline_reports_no_change() {
    let app = setup(march_source(&[1_000.0, 20.0, 2_000.0], &[0.0, 0.0, 0.0]));

    let (status, body) = get(
        &app,
        "/api/websites/site_news/metrics?start_date=2024-03-01&end_date=2024-03-30",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for key in ["impressions", "revenue", "cpm", "fillRate"] {
        assert_eq!(body["data"]["metrics"][key]["changePercent"], 0.0, "{key}");
    }
}

#[tokio::test]
async fn test_short_upstream_totals_are_an_error_not_zero() {
    let app = setup(march_source(&[100.0, 50.0], &[100.0, 50.0, 900.0]));

    let (status, body) = get(
        &app,
        "/api/websites/site_news/metrics?start_date=2024-03-01&end_date=2024-03-30",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "invalid_report_data");
    assert_eq!(body["error"]["field"], "current[2]");
}

#[tokio::test]
async fn test_negative_previous_totals_rejected() {
    let app = setup(march_source(&[100.0, 50.0, 900.0], &[100.0, -5.0, 900.0]));

    let (status, body) = get(
        &app,
        "/api/websites/site_news/report?start_date=2024-03-01&end_date=2024-03-30",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "previous[1]");
}

#[tokio::test]
async fn test_report_includes_daily_averages_and_trends() {
    let app = setup(march_source(
        &[150_000.0, 4_500.0, 165_000.0],
        &[120_000.0, 4_000.0, 150_000.0],
    ));

    let (status, body) = get(
        &app,
        "/api/websites/site_news/report?start_date=2024-03-01&end_date=2024-03-30",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_close(&data["daily"]["impressions"], 5_000.0);
    assert_close(&data["daily"]["revenue"], 150.0);
    assert_close(&data["trends"]["trafficGrowth"], 25.0);
    assert_close(&data["trends"]["revenueGrowth"], 12.5);
}

#[tokio::test]
async fn test_default_window_ends_today() {
    let app = setup(MockAdManager::new());

    let (status, body) = get(&app, "/api/websites/site_default/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let today = chrono::Utc::now().date_naive().to_string();
    assert_eq!(body["data"]["current"]["end"], today.as_str());
    // The mock scales by window length, so equal windows show no change.
    assert_close(&body["data"]["metrics"]["impressions"]["changePercent"], 0.0);
}

#[tokio::test]
async fn test_breakdown_groups_by_ad_unit() {
    let app = setup(MockAdManager::new());

    let (status, body) = get(
        &app,
        "/api/websites/site_default/breakdown?start_date=2024-03-01&end_date=2024-03-10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"]["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["value"], "Homepage Banner");
    assert_close(&rows[0]["revenue"], 800.0);
    assert_close(&rows[1]["revenue"], 600.0);
}

#[tokio::test]
async fn test_invalid_window_parameters() {
    let app = setup(MockAdManager::new());

    for uri in [
        "/api/websites/site_default/metrics?start_date=2024-03-10&end_date=2024-03-01",
        "/api/websites/site_default/metrics?start_date=not-a-date&end_date=2024-03-01",
        "/api/websites/site_default/metrics?start_date=2024-03-01",
        "/api/websites/site_default/metrics?days=0",
        "/api/websites/site_default/metrics?days=400",
        "/api/websites/site_default/metrics?days=-1",
        "/api/websites/site_default/metrics?days=soon",
        "/api/websites/site_default/metrics?days=200000000",
        "/api/websites/site_default/report?days=4294967295",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "validation_error", "{uri}");
    }
}

#[tokio::test]
async fn test_window_at_calendar_start_is_rejected() {
    let app = setup(MockAdManager::new());
    let first = chrono::NaiveDate::MIN.format("%Y-%m-%d").to_string();

    for route in ["metrics", "report"] {
        let uri = format!(
            "/api/websites/site_default/{route}?start_date={first}&end_date={first}"
        );
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "validation_error", "{uri}");
    }
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_bad_gateway() {
    let app = setup(MockAdManager::failing());

    let (status, body) = get(&app, "/api/websites/site_default/metrics?days=7").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "upstream_error");

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_health_network_and_ad_units() {
    let app = setup(MockAdManager::new());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&app, "/api/network").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["networkCode"], "21700000001");
    assert_eq!(body["data"]["properties"]["adExchangeEnabled"], true);

    let (status, body) = get(&app, "/api/ad-units").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("units").len(), 2);
    assert_eq!(body["data"][1]["adUnitCode"], "div-gpt-ad-123456789-1");
}
