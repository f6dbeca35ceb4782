use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::Json;

use crate::endpoint::{Endpoint, Envelope};
use crate::error::DashboardError;
use crate::models::HealthStatus;
use crate::params::RangeParams;
use crate::server::error::AppError;
use crate::server::state::AppState;

/// GET /api/health
///
/// Warehouse round-trip; 500 when the warehouse cannot be reached.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthStatus>, AppError> {
    let status = state.dashboard.run(|d| d.health()).await?;
    Ok(Json(status))
}

/// GET on any read endpoint, e.g.
/// `/api/pax/by-department?start_date=2024-05-01&end_date=2024-05-31&benchmark_start=...`
pub async fn fetch(
    endpoint: Endpoint,
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Envelope>, AppError> {
    let envelope = state
        .dashboard
        .run(move |d| d.fetch(endpoint, &params))
        .await?;
    Ok(Json(envelope))
}

/// Any other `/api/...` path. Answers before the auth gate so API clients get
/// a JSON 404 rather than a Basic challenge.
pub async fn not_found(uri: Uri) -> AppError {
    DashboardError::NotFound(format!("no endpoint at {}", uri.path())).into()
}
