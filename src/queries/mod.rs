//! Metric queries.
//!
//! Each query struct borrows the [`ConnectionProvider`]s it reads from plus
//! the [`DepartmentDirectory`], builds parameterized SQL with
//! [`SqlBuilder`](crate::sql_builder::SqlBuilder), and returns typed rows.
//! Grouped queries alias their columns `key` and `value`; keys are
//! canonicalised before any two result sets are merged.

pub mod departments;
pub mod guests;
pub mod labor;
pub mod occupancy;
pub mod pax;
pub mod ratios;
pub mod revenue;

pub use departments::DepartmentQuery;
pub use guests::GuestQuery;
pub use labor::LaborQuery;
pub use occupancy::OccupancyQuery;
pub use pax::PaxQuery;
pub use ratios::RatioQuery;
pub use revenue::RevenueQuery;

use crate::coerce;
use crate::comparison::{metric_map, MetricMap};
use crate::connection::{ConnectionProvider, Row};
use crate::dates::DateRange;
use crate::departments::DepartmentDirectory;
use crate::error::Result;
use crate::models::MetricRow;
use crate::sql_builder::SqlBuilder;

/// Convert `key`/`value` rows into metric rows, skipping blank keys and
/// canonicalising department names.
pub(crate) fn metric_rows(rows: &[Row], directory: &DepartmentDirectory) -> Vec<MetricRow> {
    rows.iter()
        .filter_map(|row| {
            let key = coerce::to_key(row.get("key"))?;
            let value = row.get("value").map(coerce::to_f64).unwrap_or(0.0);
            Some(MetricRow::new(directory.canonical_name(&key), value))
        })
        .collect()
}

/// Run a grouped query and fold its rows into a [`MetricMap`].
pub(crate) fn fetch_metric_map(
    source: &dyn ConnectionProvider,
    directory: &DepartmentDirectory,
    query: &SqlBuilder,
) -> Result<MetricMap> {
    let (sql, params) = query.build();
    let rows = source.query(&sql, &params)?;
    Ok(metric_map(metric_rows(&rows, directory)))
}

/// Run `fetch` for the current range and, when requested, the benchmark
/// range. Either failure aborts the whole call.
pub(crate) fn for_ranges<T, F>(
    current: &DateRange,
    benchmark: Option<&DateRange>,
    fetch: F,
) -> Result<(T, Option<T>)>
where
    F: Fn(&DateRange) -> Result<T>,
{
    let cur = fetch(current)?;
    let bench = benchmark.map(&fetch).transpose()?;
    Ok((cur, bench))
}

/// First row of an ungrouped aggregate, or an empty row when none came back.
pub(crate) fn single_row(mut rows: Vec<Row>) -> Row {
    if rows.is_empty() {
        Row::new()
    } else {
        rows.swap_remove(0)
    }
}

/// Numeric column of a row, 0 when missing or not numeric.
pub(crate) fn number(row: &Row, column: &str) -> f64 {
    row.get(column).map(coerce::to_f64).unwrap_or(0.0)
}
