use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};

use crate::export::{ExportRequest, EXPORT_FILENAME};
use crate::server::error::AppError;
use crate::server::state::AppState;

/// POST /api/export/csv
///
/// Body: `{"endpoint": "/api/pax/by-department", "params": {"start_date": "..."}}`.
/// Replies with the endpoint's rows as a CSV attachment. An unreadable body
/// is a 400 in the usual error shape.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let csv = state.dashboard.run(move |d| d.export_csv(&request)).await?;
    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
