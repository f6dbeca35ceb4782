use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::server::error::AppError;
use crate::server::state::AppState;

/// Basic-auth gate. On success the [`AuthenticatedUser`](crate::auth::AuthenticatedUser)
/// is stored in the request extensions.
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match state.dashboard.get().access().authenticate(header) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!(path = %request.uri().path(), error = %e, "rejected credentials");
            AppError::from(e).into_response()
        }
    }
}
