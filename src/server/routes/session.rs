use axum::extract::Extension;
use axum::response::Json;

use crate::auth::AuthenticatedUser;

/// GET /api/me
///
/// The user resolved by the Basic-auth gate.
pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<AuthenticatedUser> {
    Json(user)
}
