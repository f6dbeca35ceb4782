//! Guest (PAX) counts from the warehouse `bookings` relation.

use crate::comparison::{compare, compare_scalar, MetricMap, SortOrder};
use crate::connection::ConnectionProvider;
use crate::dates::DateRange;
use crate::departments::DepartmentDirectory;
use crate::error::Result;
use crate::models::{ComparisonRow, PaxSummary};
use crate::queries::{fetch_metric_map, for_ranges, number, single_row};
use crate::sql_builder::SqlBuilder;

pub struct PaxQuery<'a> {
    warehouse: &'a dyn ConnectionProvider,
    directory: &'a DepartmentDirectory,
}

impl<'a> PaxQuery<'a> {
    pub fn new(warehouse: &'a dyn ConnectionProvider, directory: &'a DepartmentDirectory) -> Self {
        Self {
            warehouse,
            directory,
        }
    }

    /// Guests per department, largest first.
    pub fn by_department(
        &self,
        current: &DateRange,
        benchmark: Option<&DateRange>,
    ) -> Result<Vec<ComparisonRow>> {
        let (cur, bench) = for_ranges(current, benchmark, |range| self.totals(range))?;
        Ok(compare(&cur, bench.as_ref(), SortOrder::CurrentDesc))
    }

    /// Chain-wide guests and booking count.
    pub fn summary(&self, current: &DateRange, benchmark: Option<&DateRange>) -> Result<PaxSummary> {
        let (cur, bench) = for_ranges(current, benchmark, |range| self.chain_totals(range))?;
        Ok(PaxSummary {
            pax: compare_scalar(cur.0, bench.map(|b| b.0)),
            current_bookings: cur.1,
            benchmark_bookings: bench.map(|b| b.1),
        })
    }

    /// Summed PAX per canonical department name over one range.
    pub fn totals(&self, range: &DateRange) -> Result<MetricMap> {
        let mut qb = SqlBuilder::new("bookings b");
        qb.select(&[
            "r.name AS key",
            "CAST(SUM(COALESCE(TRY_CAST(b.pax AS DOUBLE), 0)) AS DOUBLE) AS value",
        ])
        .join("JOIN restaurants r ON CAST(b.restaurant_id AS VARCHAR) = CAST(r.id AS VARCHAR)")
        .where_date_between("b.booked_at", range)
        .group_by(&["r.name"]);
        fetch_metric_map(self.warehouse, self.directory, &qb)
    }

    fn chain_totals(&self, range: &DateRange) -> Result<(f64, i64)> {
        let mut qb = SqlBuilder::new("bookings");
        qb.select(&[
            "CAST(SUM(COALESCE(TRY_CAST(pax AS DOUBLE), 0)) AS DOUBLE) AS total_pax",
            "COUNT(*) AS total_bookings",
        ])
        .where_date_between("booked_at", range);
        let (sql, params) = qb.build();
        let row = single_row(self.warehouse.query(&sql, &params)?);
        Ok((number(&row, "total_pax"), number(&row, "total_bookings") as i64))
    }
}
