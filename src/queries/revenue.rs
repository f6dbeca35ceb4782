//! Point-of-sale revenue from the sales store.

use crate::comparison::{compare, MetricMap, SortOrder};
use crate::connection::ConnectionProvider;
use crate::dates::DateRange;
use crate::departments::DepartmentDirectory;
use crate::error::Result;
use crate::models::ComparisonRow;
use crate::queries::{fetch_metric_map, for_ranges};
use crate::sql_builder::SqlBuilder;

/// Sales type counted as revenue.
pub const POS_SALE: &str = "PosSale";

/// Item groups that are not revenue: gift cards, GiftUp vouchers and
/// complaint write-offs.
pub const EXCLUDED_ITEM_GROUPS: [&str; 3] = ["%Gavekort%", "%GiftUp%", "%Reklamationer%"];

pub struct RevenueQuery<'a> {
    sales: &'a dyn ConnectionProvider,
    directory: &'a DepartmentDirectory,
}

impl<'a> RevenueQuery<'a> {
    pub fn new(sales: &'a dyn ConnectionProvider, directory: &'a DepartmentDirectory) -> Self {
        Self { sales, directory }
    }

    /// Revenue excluding VAT per department, by name.
    pub fn by_department(
        &self,
        current: &DateRange,
        benchmark: Option<&DateRange>,
    ) -> Result<Vec<ComparisonRow>> {
        let (cur, bench) = for_ranges(current, benchmark, |range| self.totals(range))?;
        Ok(compare(&cur, bench.as_ref(), SortOrder::KeyAsc))
    }

    /// Revenue per canonical department name over one range.
    pub fn totals(&self, range: &DateRange) -> Result<MetricMap> {
        let mut qb = SqlBuilder::new("sales");
        qb.select(&[
            "department AS key",
            "CAST(SUM(COALESCE(TRY_CAST(total_excl_vat AS DOUBLE), 0)) AS DOUBLE) AS value",
        ])
        .where_date_between("sale_date", range)
        .where_eq("sales_type", POS_SALE);
        for pattern in EXCLUDED_ITEM_GROUPS {
            qb.where_not_like("item_group_text", pattern);
        }
        qb.group_by(&["department"]);
        fetch_metric_map(self.sales, self.directory, &qb)
    }
}
