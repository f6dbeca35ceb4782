//! Async wrapper around [`Dashboard`] for the HTTP server.
//!
//! Every operation runs on Tokio's blocking pool through
//! [`tokio::task::spawn_blocking`]: DuckDB queries, the blocking booking
//! client and pacer sleeps all block their thread. Within one call the work
//! stays sequential.
//!
//! # Example
//!
//! ```no_run
//! use chain_dashboard::{config::Settings, AsyncDashboard, Dashboard, Endpoint};
//! use chain_dashboard::params::RangeParams;
//!
//! #[tokio::main]
//! async fn main() {
//!     let dashboard = AsyncDashboard::build(Dashboard::builder(Settings::default()))
//!         .await
//!         .unwrap();
//!     let health = dashboard.run(|d| d.health()).await.unwrap();
//!     let pax = dashboard
//!         .run(|d| d.fetch(Endpoint::PaxByDepartment, &RangeParams::default()))
//!         .await
//!         .unwrap();
//! }
//! ```

use std::sync::Arc;

use crate::error::{DashboardError, Result};
use crate::{Dashboard, DashboardBuilder};

/// Cheap to clone; clones share one [`Dashboard`].
#[derive(Clone)]
pub struct AsyncDashboard {
    inner: Arc<Dashboard>,
}

impl AsyncDashboard {
    /// Build on the blocking pool, since the booking client may not be
    /// created inside an async context.
    pub async fn build(builder: DashboardBuilder) -> Result<Self> {
        let dashboard = tokio::task::spawn_blocking(move || builder.build())
            .await
            .map_err(join_error)??;
        Ok(Self::from_dashboard(dashboard))
    }

    pub fn from_dashboard(dashboard: Dashboard) -> Self {
        Self {
            inner: Arc::new(dashboard),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Dashboard) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let dashboard = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&dashboard))
            .await
            .map_err(join_error)?
    }

    /// Borrow the dashboard for cheap, non-blocking reads (settings, auth).
    pub fn get(&self) -> &Dashboard {
        &self.inner
    }

    /// Release the dashboard on the blocking pool.
    ///
    /// Dropping the last handle inside the async runtime would drop the
    /// blocking HTTP client there too, which panics.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || drop(self.inner))
            .await
            .map_err(join_error)
    }
}

fn join_error(e: tokio::task::JoinError) -> DashboardError {
    DashboardError::Task(e.to_string())
}
