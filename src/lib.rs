//! Operational metrics backend for a restaurant chain.
//!
//! Reads guest counts, occupancy, revenue and labor cost from a warehouse
//! and a sales store (both queried through DuckDB), counts today's guests
//! live from the booking system, and compares every metric against an
//! optional benchmark period.
//!
//! # Quick start
//!
//! ```no_run
//! use chain_dashboard::{config::Settings, dates::DateRange, Dashboard};
//!
//! let settings = Settings::from_file("dashboard.toml".as_ref()).unwrap();
//! let dashboard = Dashboard::builder(settings).build().unwrap();
//!
//! let may = DateRange::parse("2024-05-01", "2024-05-31").unwrap();
//! let last_may = DateRange::parse("2023-05-01", "2023-05-31").unwrap();
//! let rows = dashboard.pax().by_department(&may, Some(&last_may)).unwrap();
//! ```

pub mod async_client;
pub mod auth;
pub mod booking;
pub mod coerce;
pub mod comparison;
pub mod config;
pub mod connection;
pub mod dates;
pub mod departments;
pub mod endpoint;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod params;
pub mod queries;
pub mod server;
pub mod sql_builder;

pub use async_client::AsyncDashboard;
pub use endpoint::{Endpoint, Envelope};
pub use error::{DashboardError, Result};
pub use sql_builder::SqlBuilder;

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::auth::AccessTable;
use crate::booking::{BookingApiClient, BookingSource, Pacer};
use crate::config::{RateLimitScope, Settings};
use crate::connection::{ConnectionProvider, DuckDbProvider};
use crate::departments::DepartmentDirectory;
use crate::export::ExportRequest;
use crate::models::HealthStatus;
use crate::params::RangeParams;

// ---------------------------------------------------------------------------
// DashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`Dashboard`].
///
/// Data sources default to what the settings describe: DuckDB providers for
/// the warehouse and sales store and an HTTP client for the booking API.
/// Each can be replaced, which is how tests inject fixtures.
pub struct DashboardBuilder {
    settings: Settings,
    warehouse: Option<Arc<dyn ConnectionProvider>>,
    sales: Option<Arc<dyn ConnectionProvider>>,
    bookings: Option<Arc<dyn BookingSource>>,
}

impl DashboardBuilder {
    pub fn warehouse<P: ConnectionProvider + 'static>(mut self, provider: P) -> Self {
        self.warehouse = Some(Arc::new(provider));
        self
    }

    pub fn sales<P: ConnectionProvider + 'static>(mut self, provider: P) -> Self {
        self.sales = Some(Arc::new(provider));
        self
    }

    pub fn booking_source<S: BookingSource + 'static>(mut self, source: S) -> Self {
        self.bookings = Some(Arc::new(source));
        self
    }

    /// Validate the settings and assemble the dashboard.
    ///
    /// Builds a blocking HTTP client when no booking source was supplied, so
    /// call this outside an async context (or through
    /// [`AsyncDashboard::build`]).
    pub fn build(self) -> Result<Dashboard> {
        let settings = self.settings;
        settings.validate()?;

        let warehouse = match self.warehouse {
            Some(p) => p,
            None => Arc::new(DuckDbProvider::new("warehouse", &settings.warehouse)),
        };
        let sales = match self.sales {
            Some(p) => p,
            None => Arc::new(DuckDbProvider::new("sales", &settings.sales)),
        };
        let bookings = match self.bookings {
            Some(s) => s,
            None => Arc::new(BookingApiClient::new(&settings.booking_api)?),
        };

        let directory = DepartmentDirectory::new(&settings.departments);
        if directory.is_empty() {
            warn!("no departments configured; names pass through unmapped");
        }
        let access = AccessTable::new(&settings.auth, &directory);
        let shared_pacer = match settings.booking_api.rate_limit_scope {
            RateLimitScope::Process => Some(Pacer::for_range_scan(&settings.booking_api)),
            RateLimitScope::Request => None,
        };

        info!(
            departments = settings.departments.len(),
            rate_limit_scope = ?settings.booking_api.rate_limit_scope,
            auth = access.is_enabled(),
            "dashboard ready"
        );

        Ok(Dashboard {
            settings,
            directory,
            warehouse,
            sales,
            bookings,
            shared_pacer,
            access,
        })
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The main entry point: owns configuration and data sources and hands out
/// borrowing query interfaces.
///
/// `Dashboard` is `Sync`; share it behind an `Arc`.
pub struct Dashboard {
    settings: Settings,
    directory: DepartmentDirectory,
    warehouse: Arc<dyn ConnectionProvider>,
    sales: Arc<dyn ConnectionProvider>,
    bookings: Arc<dyn BookingSource>,
    shared_pacer: Option<Pacer>,
    access: AccessTable,
}

impl Dashboard {
    pub fn builder(settings: Settings) -> DashboardBuilder {
        DashboardBuilder {
            settings,
            warehouse: None,
            sales: None,
            bookings: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn directory(&self) -> &DepartmentDirectory {
        &self.directory
    }

    pub fn access(&self) -> &AccessTable {
        &self.access
    }

    /// Today in the configured local offset.
    pub fn today(&self) -> NaiveDate {
        dates::today(self.settings.timezone_offset_minutes)
    }

    // -- Query accessors ---------------------------------------------------

    pub fn pax(&self) -> queries::PaxQuery<'_> {
        queries::PaxQuery::new(self.warehouse.as_ref(), &self.directory)
    }

    pub fn occupancy(&self) -> queries::OccupancyQuery<'_> {
        queries::OccupancyQuery::new(self.warehouse.as_ref(), &self.directory)
    }

    pub fn revenue(&self) -> queries::RevenueQuery<'_> {
        queries::RevenueQuery::new(self.sales.as_ref(), &self.directory)
    }

    pub fn labor(&self) -> queries::LaborQuery<'_> {
        queries::LaborQuery::new(self.warehouse.as_ref(), &self.directory)
    }

    pub fn ratios(&self) -> queries::RatioQuery<'_> {
        queries::RatioQuery::new(self.warehouse.as_ref(), self.sales.as_ref(), &self.directory)
    }

    pub fn departments(&self) -> queries::DepartmentQuery<'_> {
        queries::DepartmentQuery::new(self.warehouse.as_ref(), &self.directory)
    }

    /// Guest counts, live or cached.
    ///
    /// With `rate_limit_scope = "process"` every live scan shares one pacer.
    pub fn guests(&self) -> queries::GuestQuery<'_> {
        queries::GuestQuery::new(
            self.bookings.as_ref(),
            self.warehouse.as_ref(),
            &self.directory,
            &self.settings.booking_api,
        )
        .shared_pacer(self.shared_pacer.clone())
    }

    // -- Service operations ------------------------------------------------

    /// Round-trip to the warehouse.
    pub fn health(&self) -> Result<HealthStatus> {
        let rows = self
            .warehouse
            .query("SELECT CAST(CURRENT_TIMESTAMP AS VARCHAR) AS ts", &[])?;
        let timestamp = rows
            .first()
            .and_then(|r| r.get("ts"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(HealthStatus {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            timestamp,
        })
    }

    /// Run one named endpoint with its request parameters.
    pub fn fetch(&self, endpoint: Endpoint, params: &RangeParams) -> Result<Envelope> {
        let today = self.today();
        match endpoint {
            Endpoint::Health => Envelope::new(self.health()?, None),
            Endpoint::Departments => Envelope::new(self.departments().list()?, None),
            Endpoint::PaxByDepartment => {
                let p = params.period(today)?;
                Envelope::new(self.pax().by_department(&p.current(), p.benchmark().as_ref())?, Some(p))
            }
            Endpoint::PaxSummary => {
                let p = params.period(today)?;
                Envelope::new(self.pax().summary(&p.current(), p.benchmark().as_ref())?, Some(p))
            }
            Endpoint::OccupancyByDepartment => {
                let p = params.period(today)?;
                let rows = self
                    .occupancy()
                    .by_department(&p.current(), p.benchmark().as_ref())?;
                Envelope::new(rows, Some(p))
            }
            Endpoint::OccupancyByCategory => {
                let p = params.period(today)?.without_benchmark();
                Envelope::new(self.occupancy().by_category(&p.current())?, Some(p))
            }
            Endpoint::RevenueByDepartment => {
                let p = params.period(today)?;
                Envelope::new(self.revenue().by_department(&p.current(), p.benchmark().as_ref())?, Some(p))
            }
            Endpoint::LaborByDepartment => {
                let p = params.period(today)?;
                Envelope::new(self.labor().by_department(&p.current(), p.benchmark().as_ref())?, Some(p))
            }
            Endpoint::LaborSummary => {
                let p = params.period(today)?;
                Envelope::new(self.labor().summary(&p.current(), p.benchmark().as_ref())?, Some(p))
            }
            Endpoint::RevenueVsPax => {
                let p = params.period(today)?.without_benchmark();
                Envelope::new(self.ratios().revenue_per_pax(&p.current())?, Some(p))
            }
            Endpoint::LaborVsRevenue => {
                let p = params.period(today)?.without_benchmark();
                Envelope::new(self.ratios().labor_share_of_revenue(&p.current())?, Some(p))
            }
            Endpoint::LaborVsPax => {
                let p = params.period(today)?;
                Envelope::new(self.ratios().labor_per_pax(&p.current(), p.benchmark().as_ref())?, Some(p))
            }
            Endpoint::GuestsLive => {
                let day = params.day(today)?;
                Envelope::new(self.guests().live_day(day)?, None)
            }
            Endpoint::GuestsLiveRange => {
                let p = params.period(today)?.without_benchmark();
                Envelope::new(self.guests().live_range(&p.current())?, Some(p))
            }
            Endpoint::GuestsCached => {
                let p = params.period(today)?;
                Envelope::new(self.guests().cached(&p.current(), p.benchmark().as_ref())?, Some(p))
            }
        }
    }

    /// Replay an endpoint and render its `data` as CSV.
    ///
    /// Unknown and live endpoints are rejected.
    pub fn export_csv(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let endpoint = Endpoint::from_path(&request.endpoint).ok_or_else(|| {
            DashboardError::InvalidArgument(format!("unknown endpoint '{}'", request.endpoint))
        })?;
        if endpoint.is_live() {
            return Err(DashboardError::InvalidArgument(format!(
                "live endpoint '{}' cannot be exported",
                endpoint.path()
            )));
        }
        let envelope = self.fetch(endpoint, &RangeParams::from_map(&request.params))?;
        let csv = export::to_csv(&envelope.data)?;
        info!(endpoint = endpoint.path(), bytes = csv.len(), "csv export");
        Ok(csv)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dashboard(warehouse={}, sales={}, departments={}, auth={})",
            self.warehouse.label(),
            self.sales.label(),
            self.directory.names().len(),
            self.access.is_enabled()
        )
    }
}
