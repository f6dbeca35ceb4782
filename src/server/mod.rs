//! HTTP surface: axum router over an [`AsyncDashboard`].
//!
//! Metric endpoints are open. The static dashboard page and `/api/me` sit
//! behind the Basic-auth gate.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::params::RangeParams;
use crate::AsyncDashboard;

use state::AppState;

/// Build the full router.
pub fn router(dashboard: AsyncDashboard) -> Router {
    let static_dir = dashboard.get().settings().server.static_dir.clone();
    let state = Arc::new(AppState { dashboard });

    let mut api = Router::new()
        .route(Endpoint::Health.path(), get(routes::metrics::health))
        .route("/api/export/csv", post(routes::export::export_csv))
        .route("/api/{*rest}", any(routes::metrics::not_found));
    for endpoint in Endpoint::ALL {
        if endpoint == Endpoint::Health {
            continue;
        }
        api = api.route(
            endpoint.path(),
            get(
                move |state: State<Arc<AppState>>, params: Query<RangeParams>| {
                    routes::metrics::fetch(endpoint, state, params)
                },
            ),
        );
    }

    let gated = Router::new()
        .route("/api/me", get(routes::session::me))
        .fallback_service(ServeDir::new(static_dir))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_basic_auth,
        ));

    api.merge(gated)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C, then release the dashboard.
pub async fn serve(dashboard: AsyncDashboard, addr: SocketAddr) -> Result<()> {
    let app = router(dashboard.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    dashboard.close().await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
