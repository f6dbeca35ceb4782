//! Guest counts: live from the booking API, or from the warehouse snapshot.
//!
//! The two paths are separate operations. Nothing falls back from one to
//! the other; the caller picks.

use chrono::NaiveDate;
use tracing::info;

use crate::booking::{BookingQuery, BookingSource, LiveGuestScanner, Pacer};
use crate::comparison::{compare, metric_map, MetricMap, SortOrder};
use crate::coerce;
use crate::config::BookingApiSettings;
use crate::connection::ConnectionProvider;
use crate::dates::DateRange;
use crate::departments::DepartmentDirectory;
use crate::error::{DashboardError, Result};
use crate::models::{ComparisonRow, LiveGuestReport, MetricRow};
use crate::queries::{for_ranges, number};
use crate::sql_builder::SqlBuilder;

pub struct GuestQuery<'a> {
    bookings: &'a dyn BookingSource,
    warehouse: &'a dyn ConnectionProvider,
    directory: &'a DepartmentDirectory,
    api: &'a BookingApiSettings,
    locations: Vec<String>,
    shared_pacer: Option<Pacer>,
}

impl<'a> GuestQuery<'a> {
    /// Scans `api.live_locations`, or every configured department when that
    /// list is empty.
    pub fn new(
        bookings: &'a dyn BookingSource,
        warehouse: &'a dyn ConnectionProvider,
        directory: &'a DepartmentDirectory,
        api: &'a BookingApiSettings,
    ) -> Self {
        let locations = if api.live_locations.is_empty() {
            directory.ids()
        } else {
            api.live_locations.clone()
        };
        Self {
            bookings,
            warehouse,
            directory,
            api,
            locations,
            shared_pacer: None,
        }
    }

    /// Override the scanned locations.
    pub fn locations(mut self, locations: Vec<String>) -> Self {
        self.locations = locations;
        self
    }

    /// Pace through a pacer shared with other requests instead of a fresh one.
    pub fn shared_pacer(mut self, pacer: Option<Pacer>) -> Self {
        self.shared_pacer = pacer;
        self
    }

    fn pacer_for(&self, query: &BookingQuery) -> Pacer {
        match (&self.shared_pacer, query) {
            (Some(shared), _) => shared.clone(),
            (None, BookingQuery::Day(_)) => Pacer::for_day_scan(self.api),
            (None, BookingQuery::Range(_)) => Pacer::for_range_scan(self.api),
        }
    }

    fn scan(&self, query: BookingQuery) -> LiveGuestReport {
        let scanner = LiveGuestScanner::new(self.bookings, self.directory, self.pacer_for(&query));
        scanner.scan(&self.locations, &query)
    }

    /// Current bookings for one day, per location.
    pub fn live_day(&self, date: NaiveDate) -> Result<LiveGuestReport> {
        info!(%date, locations = self.locations.len(), "live guest scan for one day");
        Ok(self.scan(BookingQuery::Day(date)))
    }

    /// Current bookings over a range of at most `max_live_range_days` days.
    ///
    /// Longer ranges are rejected before any upstream call.
    pub fn live_range(&self, range: &DateRange) -> Result<LiveGuestReport> {
        let max = self.api.max_live_range_days;
        if range.days() > max {
            return Err(DashboardError::InvalidArgument(format!(
                "live range {} spans {} days; at most {} allowed",
                range,
                range.days(),
                max
            )));
        }
        info!(%range, locations = self.locations.len(), "live guest scan for range");
        Ok(self.scan(BookingQuery::Range(*range)))
    }

    /// Guests per department from the warehouse `guest_counts` snapshot,
    /// largest first. Unmapped location ids are grouped under "Unknown".
    pub fn cached(
        &self,
        current: &DateRange,
        benchmark: Option<&DateRange>,
    ) -> Result<Vec<ComparisonRow>> {
        let (cur, bench) = for_ranges(current, benchmark, |range| self.snapshot(range))?;
        Ok(compare(&cur, bench.as_ref(), SortOrder::CurrentDesc))
    }

    fn snapshot(&self, range: &DateRange) -> Result<MetricMap> {
        let mut qb = SqlBuilder::new("guest_counts");
        qb.select(&[
            "CAST(location_id AS VARCHAR) AS location_id",
            "CAST(SUM(COALESCE(TRY_CAST(pax AS DOUBLE), 0)) AS DOUBLE) AS value",
        ])
        .where_date_between("visit_date", range)
        .group_by(&["location_id"]);
        let (sql, params) = qb.build();
        let rows = self.warehouse.query(&sql, &params)?;

        Ok(metric_map(rows.iter().filter_map(|row| {
            let id = coerce::to_key(row.get("location_id"))?;
            Some(MetricRow::new(
                self.directory.name_for_id(&id),
                number(row, "value"),
            ))
        })))
    }
}
