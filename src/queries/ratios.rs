//! Cross-source ratios per department.
//!
//! Both sides are fetched separately and joined on the canonical department
//! name, so a department known to only one source still shows up, with 0 on
//! the missing side and a ratio of 0 when the denominator is 0.

use crate::coerce::round2;
use crate::comparison::{compare, MetricMap, SortOrder};
use crate::connection::ConnectionProvider;
use crate::dates::DateRange;
use crate::departments::DepartmentDirectory;
use crate::error::Result;
use crate::models::{ComparisonRow, RatioRow};
use crate::queries::{for_ranges, LaborQuery, PaxQuery, RevenueQuery};

pub struct RatioQuery<'a> {
    warehouse: &'a dyn ConnectionProvider,
    sales: &'a dyn ConnectionProvider,
    directory: &'a DepartmentDirectory,
}

impl<'a> RatioQuery<'a> {
    pub fn new(
        warehouse: &'a dyn ConnectionProvider,
        sales: &'a dyn ConnectionProvider,
        directory: &'a DepartmentDirectory,
    ) -> Self {
        Self {
            warehouse,
            sales,
            directory,
        }
    }

    /// Revenue divided by guests.
    pub fn revenue_per_pax(&self, range: &DateRange) -> Result<Vec<RatioRow>> {
        let revenue = RevenueQuery::new(self.sales, self.directory).totals(range)?;
        let pax = PaxQuery::new(self.warehouse, self.directory).totals(range)?;
        Ok(ratio_rows(&revenue, &pax, 1.0))
    }

    /// Labor cost as a percentage of revenue.
    pub fn labor_share_of_revenue(&self, range: &DateRange) -> Result<Vec<RatioRow>> {
        let labor = LaborQuery::new(self.warehouse, self.directory).costs(range)?;
        let revenue = RevenueQuery::new(self.sales, self.directory).totals(range)?;
        Ok(ratio_rows(&labor, &revenue, 100.0))
    }

    /// Labor cost per guest, compared against the benchmark period.
    pub fn labor_per_pax(
        &self,
        current: &DateRange,
        benchmark: Option<&DateRange>,
    ) -> Result<Vec<ComparisonRow>> {
        let (cur, bench) = for_ranges(current, benchmark, |range| {
            let labor = LaborQuery::new(self.warehouse, self.directory).costs(range)?;
            let pax = PaxQuery::new(self.warehouse, self.directory).totals(range)?;
            Ok(ratio_map(&labor, &pax))
        })?;
        Ok(compare(&cur, bench.as_ref(), SortOrder::KeyAsc))
    }
}

fn ratio(numerator: f64, denominator: f64, scale: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * scale
    } else {
        0.0
    }
}

/// One row per key of either map, sorted by key.
fn ratio_rows(numerators: &MetricMap, denominators: &MetricMap, scale: f64) -> Vec<RatioRow> {
    let mut keys: Vec<&String> = numerators.keys().chain(denominators.keys()).collect();
    keys.sort();
    keys.dedup();
    keys.into_iter()
        .map(|key| {
            let numerator = numerators.get(key).copied().unwrap_or(0.0);
            let denominator = denominators.get(key).copied().unwrap_or(0.0);
            RatioRow {
                key: key.clone(),
                numerator: round2(numerator),
                denominator: round2(denominator),
                ratio: round2(ratio(numerator, denominator, scale)),
            }
        })
        .collect()
}

fn ratio_map(numerators: &MetricMap, denominators: &MetricMap) -> MetricMap {
    ratio_rows(numerators, denominators, 1.0)
        .into_iter()
        .map(|row| (row.key, row.ratio))
        .collect()
}
