use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use adpulse_core::{config::Config, window::trailing_window, PeriodWindow};

use crate::{error::AppError, service, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    /// Trailing window length ending today. Mutually exclusive with dates.
    /// Kept as text so a bad value gets the JSON error envelope.
    pub days: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Resolve the current window from query parameters.
///
/// Explicit `start_date`/`end_date` win; otherwise the trailing `days`
/// (or the configured default) ending on `today`.
pub fn resolve_window(
    query: &WindowQuery,
    config: &Config,
    today: NaiveDate,
) -> Result<PeriodWindow, AppError> {
    let window = match (&query.start_date, &query.end_date) {
        (Some(start), Some(end)) => {
            if query.days.is_some() {
                return Err(AppError::BadRequest(
                    "days cannot be combined with start_date/end_date".to_string(),
                ));
            }
            PeriodWindow::parse(start, end)?
        }
        (None, None) => {
            let days = match query.days.as_deref() {
                Some(raw) => parse_days(raw)?,
                None => config.default_window_days,
            };
            if days > config.max_window_days {
                return Err(too_long(config));
            }
            trailing_window(today, days)?
        }
        _ => {
            return Err(AppError::BadRequest(
                "start_date and end_date must be given together".to_string(),
            ))
        }
    };

    if window.days() > i64::from(config.max_window_days) {
        return Err(too_long(config));
    }
    Ok(window)
}

fn parse_days(raw: &str) -> Result<u32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid days {raw:?} (expected a positive integer)")))
}

fn too_long(config: &Config) -> AppError {
    AppError::BadRequest(format!(
        "window cannot exceed {} days",
        config.max_window_days
    ))
}

fn validate_website_id(website_id: &str) -> Result<(), AppError> {
    if website_id.trim().is_empty() || website_id.len() > 128 {
        return Err(AppError::BadRequest("invalid website id".to_string()));
    }
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// `GET /api/websites/{id}/metrics` - Impressions, revenue, CPM and fill
/// rate with change against the previous period.
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Path(website_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    validate_website_id(&website_id)?;
    let window = resolve_window(&query, &state.config, today())?;
    let result = service::website_metrics(state.source.as_ref(), &website_id, window).await?;
    Ok(Json(json!({ "data": result })))
}

/// `GET /api/websites/{id}/report` - Metrics plus daily averages and growth.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(website_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    validate_website_id(&website_id)?;
    let window = resolve_window(&query, &state.config, today())?;
    let report = service::website_report(state.source.as_ref(), &website_id, window).await?;
    Ok(Json(json!({ "data": report })))
}

/// `GET /api/websites/{id}/breakdown` - Current-window revenue by ad unit.
pub async fn get_breakdown(
    State(state): State<Arc<AppState>>,
    Path(website_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, AppError> {
    validate_website_id(&website_id)?;
    let window = resolve_window(&query, &state.config, today())?;
    let result = service::ad_unit_breakdown(state.source.as_ref(), &website_id, window).await?;
    Ok(Json(json!({ "data": result })))
}
