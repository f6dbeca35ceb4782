//! The named read operations exposed over HTTP.
//!
//! Routes and CSV export both go through [`Dashboard::fetch`](crate::Dashboard::fetch),
//! so an exported file always matches what the route returns.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::params::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Departments,
    PaxByDepartment,
    PaxSummary,
    OccupancyByDepartment,
    OccupancyByCategory,
    RevenueByDepartment,
    LaborByDepartment,
    LaborSummary,
    RevenueVsPax,
    LaborVsRevenue,
    LaborVsPax,
    GuestsLive,
    GuestsLiveRange,
    GuestsCached,
}

impl Endpoint {
    pub const ALL: [Endpoint; 15] = [
        Endpoint::Health,
        Endpoint::Departments,
        Endpoint::PaxByDepartment,
        Endpoint::PaxSummary,
        Endpoint::OccupancyByDepartment,
        Endpoint::OccupancyByCategory,
        Endpoint::RevenueByDepartment,
        Endpoint::LaborByDepartment,
        Endpoint::LaborSummary,
        Endpoint::RevenueVsPax,
        Endpoint::LaborVsRevenue,
        Endpoint::LaborVsPax,
        Endpoint::GuestsLive,
        Endpoint::GuestsLiveRange,
        Endpoint::GuestsCached,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Health => "/api/health",
            Endpoint::Departments => "/api/departments",
            Endpoint::PaxByDepartment => "/api/pax/by-department",
            Endpoint::PaxSummary => "/api/pax/summary",
            Endpoint::OccupancyByDepartment => "/api/occupancy/by-department",
            Endpoint::OccupancyByCategory => "/api/occupancy/by-category",
            Endpoint::RevenueByDepartment => "/api/revenue/by-department",
            Endpoint::LaborByDepartment => "/api/labor/by-department",
            Endpoint::LaborSummary => "/api/labor/summary",
            Endpoint::RevenueVsPax => "/api/metrics/revenue-vs-pax",
            Endpoint::LaborVsRevenue => "/api/metrics/labor-vs-revenue",
            Endpoint::LaborVsPax => "/api/metrics/labor-vs-pax",
            Endpoint::GuestsLive => "/api/guests/live",
            Endpoint::GuestsLiveRange => "/api/guests/live-range",
            Endpoint::GuestsCached => "/api/guests/cached",
        }
    }

    /// Look up an endpoint by route path; a trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        Self::ALL.iter().copied().find(|e| e.path() == path)
    }

    /// Endpoints that call the booking API and may take minutes.
    pub fn is_live(self) -> bool {
        matches!(self, Endpoint::GuestsLive | Endpoint::GuestsLiveRange)
    }
}

/// Response body of every read endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(flatten)]
    pub period: Option<Period>,
}

impl Envelope {
    pub fn new<T: Serialize>(data: T, period: Option<Period>) -> Result<Self> {
        let data = serde_json::to_value(data)?;
        let count = data.as_array().map(Vec::len);
        Ok(Self {
            data,
            count,
            period,
        })
    }
}
