use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// `GET /api/network` - Ad network the dashboard reports on.
pub async fn get_network(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let network = state.source.network().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch ad network");
        AppError::Upstream(e.to_string())
    })?;
    Ok(Json(json!({ "data": network })))
}

/// `GET /api/ad-units` - Ad units configured in the network.
pub async fn list_ad_units(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let units = state.source.ad_units().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch ad units");
        AppError::Upstream(e.to_string())
    })?;
    Ok(Json(json!({ "data": units })))
}
