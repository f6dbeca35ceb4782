use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LocationGuestCount — Live guest count for one location
// ---------------------------------------------------------------------------

/// A location whose scan failed carries zero counts and the error text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGuestCount {
    pub location_id: String,
    pub department: String,
    pub pax: i64,
    pub bookings: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocationGuestCount {
    pub fn failed(location_id: &str, department: &str, error: String) -> Self {
        Self {
            location_id: location_id.to_string(),
            department: department.to_string(),
            pax: 0,
            bookings: 0,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

// ---------------------------------------------------------------------------
// LiveGuestReport — Result of a live multi-location scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveGuestReport {
    pub source: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub locations: Vec<LocationGuestCount>,
    pub total_pax: i64,
    pub total_bookings: i64,
    /// Upstream HTTP calls issued during the scan.
    pub requests: u32,
}

impl LiveGuestReport {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        locations: Vec<LocationGuestCount>,
        requests: u32,
    ) -> Self {
        let total_pax = locations.iter().map(|l| l.pax).sum();
        let total_bookings = locations.iter().map(|l| l.bookings).sum();
        Self {
            source: "live".to_string(),
            start_date,
            end_date,
            locations,
            total_pax,
            total_bookings,
            requests,
        }
    }

    pub fn failed_locations(&self) -> usize {
        self.locations.iter().filter(|l| !l.is_ok()).count()
    }
}
