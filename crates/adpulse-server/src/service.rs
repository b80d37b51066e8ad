//! Fetch-then-aggregate glue between the reporting source and the handlers.
//!
//! This is the only place that logs around aggregation: the core functions
//! stay pure and report failures as values.

use serde::Serialize;
use tracing::{debug, error, warn};

use adpulse_core::{
    compute, derive_previous_window,
    error::CoreError,
    report::{BreakdownRow, MetricsReport},
    source::ReportingSource,
    InvalidInputError, MetricsSnapshot, PeriodWindow, ReportTotals,
};

use crate::error::AppError;

/// Dimension index of the ad-unit name in report rows.
const AD_UNIT_DIMENSION: usize = 1;

#[derive(Debug, Clone)]
pub struct WindowTotals {
    pub current: PeriodWindow,
    pub previous: PeriodWindow,
    pub current_totals: ReportTotals,
    pub previous_totals: ReportTotals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub website_id: String,
    pub current: PeriodWindow,
    pub previous: PeriodWindow,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownResponse {
    pub website_id: String,
    pub current: PeriodWindow,
    pub rows: Vec<BreakdownRow>,
}

/// Query both windows concurrently; fails if either fetch fails.
pub async fn fetch_window_totals(
    source: &dyn ReportingSource,
    website_id: &str,
    current: PeriodWindow,
) -> Result<WindowTotals, AppError> {
    let previous = derive_previous_window(&current)?;
    let (current_totals, previous_totals) = tokio::try_join!(
        source.report_totals(website_id, &current),
        source.report_totals(website_id, &previous),
    )
    .map_err(|e| {
        error!(
            website_id,
            current_start = %current.start(),
            current_end = %current.end(),
            error = %e,
            "Reporting source fetch failed"
        );
        AppError::Upstream(e.to_string())
    })?;

    debug!(
        website_id,
        current = ?current_totals.as_slice(),
        previous = ?previous_totals.as_slice(),
        "Fetched window totals"
    );

    Ok(WindowTotals {
        current,
        previous,
        current_totals,
        previous_totals,
    })
}

fn rejected_totals(website_id: &str, e: InvalidInputError) -> AppError {
    warn!(website_id, window = %e.window, index = e.index, error = %e, "Rejected report totals");
    AppError::InvalidReportData(e)
}

pub async fn website_metrics(
    source: &dyn ReportingSource,
    website_id: &str,
    current: PeriodWindow,
) -> Result<MetricsResponse, AppError> {
    let totals = fetch_window_totals(source, website_id, current).await?;
    let metrics = compute(&totals.current_totals, &totals.previous_totals)
        .map_err(|e| rejected_totals(website_id, e))?;

    Ok(MetricsResponse {
        website_id: website_id.to_string(),
        current: totals.current,
        previous: totals.previous,
        metrics,
    })
}

pub async fn website_report(
    source: &dyn ReportingSource,
    website_id: &str,
    current: PeriodWindow,
) -> Result<MetricsReport, AppError> {
    let totals = fetch_window_totals(source, website_id, current).await?;
    MetricsReport::build(
        website_id,
        totals.current,
        &totals.current_totals,
        &totals.previous_totals,
    )
    .map_err(|e| match e {
        CoreError::InvalidInput(inner) => rejected_totals(website_id, inner),
        other => AppError::from(other),
    })
}

pub async fn ad_unit_breakdown(
    source: &dyn ReportingSource,
    website_id: &str,
    current: PeriodWindow,
) -> Result<BreakdownResponse, AppError> {
    let report = source.report(website_id, &current).await.map_err(|e| {
        error!(website_id, error = %e, "Reporting source fetch failed");
        AppError::Upstream(e.to_string())
    })?;

    Ok(BreakdownResponse {
        website_id: website_id.to_string(),
        current,
        rows: report.breakdown(AD_UNIT_DIMENSION),
    })
}
