use crate::AsyncDashboard;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Dispatches blocking dashboard work to the thread pool.
    pub dashboard: AsyncDashboard,
}
