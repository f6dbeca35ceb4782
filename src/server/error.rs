use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

use crate::auth::REALM;
use crate::error::DashboardError;

/// Renders as `{"status": "error", "message": "..."}` with a status code
/// derived from the library error.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "status": "error", "message": self.message }));
        let mut response = (self.status, body).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            let challenge = format!("Basic realm=\"{}\"", REALM);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

impl From<DashboardError> for AppError {
    fn from(e: DashboardError) -> Self {
        match &e {
            _ if e.is_client_error() => AppError::bad_request(e.to_string()),
            DashboardError::Unauthorized(msg) => AppError::unauthorized(msg.clone()),
            DashboardError::NotFound(msg) => Self {
                status: StatusCode::NOT_FOUND,
                message: msg.clone(),
            },
            _ => {
                error!(error = %e, "request failed");
                AppError::internal(e.to_string())
            }
        }
    }
}
