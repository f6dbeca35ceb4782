//! Occupancy: confirmed bookings as a percentage of all bookings.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::coerce::{self, round2};
use crate::comparison::{compare, MetricMap, SortOrder};
use crate::connection::ConnectionProvider;
use crate::dates::DateRange;
use crate::departments::DepartmentDirectory;
use crate::error::Result;
use crate::models::{ComparisonRow, OccupancyCell};
use crate::queries::{for_ranges, number};
use crate::sql_builder::SqlBuilder;

/// Dayparts in display order, with their inclusive start/end hours.
/// Anything outside them falls into [`EVENING`].
pub const DAYPARTS: [(&str, u32, u32); 3] = [
    ("Formiddag", 8, 11),
    ("Tidlig eftermiddag", 12, 14),
    ("Eftermiddag", 15, 17),
];
pub const EVENING: &str = "Aften";

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub struct OccupancyQuery<'a> {
    warehouse: &'a dyn ConnectionProvider,
    directory: &'a DepartmentDirectory,
}

impl<'a> OccupancyQuery<'a> {
    pub fn new(warehouse: &'a dyn ConnectionProvider, directory: &'a DepartmentDirectory) -> Self {
        Self {
            warehouse,
            directory,
        }
    }

    /// Occupancy rate per department, highest first.
    pub fn by_department(
        &self,
        current: &DateRange,
        benchmark: Option<&DateRange>,
    ) -> Result<Vec<ComparisonRow>> {
        let (cur, bench) = for_ranges(current, benchmark, |range| self.rates(range))?;
        Ok(compare(&cur, bench.as_ref(), SortOrder::CurrentDesc))
    }

    /// Rates are computed from summed counts so departments reported under
    /// several aliases combine correctly.
    fn rates(&self, range: &DateRange) -> Result<MetricMap> {
        let mut qb = SqlBuilder::new("bookings b");
        qb.select(&[
            "r.name AS key",
            "SUM(CASE WHEN lower(CAST(b.status AS VARCHAR)) = 'confirmed' THEN 1 ELSE 0 END) AS confirmed",
            "COUNT(*) AS total",
        ])
        .join("LEFT JOIN restaurants r ON CAST(b.restaurant_id AS VARCHAR) = CAST(r.id AS VARCHAR)")
        .where_date_between("b.booked_at", range)
        .group_by(&["r.name"]);
        let (sql, params) = qb.build();
        let rows = self.warehouse.query(&sql, &params)?;

        let mut counts: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for row in &rows {
            let Some(key) = coerce::to_key(row.get("key")) else {
                continue;
            };
            let entry = counts
                .entry(self.directory.canonical_name(&key))
                .or_insert((0.0, 0.0));
            entry.0 += number(row, "confirmed");
            entry.1 += number(row, "total");
        }
        Ok(counts
            .into_iter()
            .map(|(key, (confirmed, total))| {
                let rate = if total > 0.0 { confirmed * 100.0 / total } else { 0.0 };
                (key, round2(rate))
            })
            .collect())
    }

    /// Chain-wide occupancy per daypart and weekday, ordered by daypart then
    /// Monday to Sunday.
    pub fn by_category(&self, range: &DateRange) -> Result<Vec<OccupancyCell>> {
        let mut category = String::from("CASE");
        for (name, from, to) in DAYPARTS {
            category.push_str(&format!(
                " WHEN hour(TRY_CAST(b.booked_at AS TIMESTAMP)) BETWEEN {} AND {} THEN '{}'",
                from, to, name
            ));
        }
        category.push_str(&format!(" ELSE '{}' END AS category", EVENING));

        let mut qb = SqlBuilder::new("bookings b");
        qb.select(&[
            category.as_str(),
            "strftime(TRY_CAST(b.booked_at AS TIMESTAMP), '%a') AS weekday",
            "CAST(SUM(CASE WHEN lower(CAST(b.status AS VARCHAR)) = 'confirmed' THEN 1 ELSE 0 END) AS DOUBLE) * 100.0 / COUNT(*) AS occupancy_rate",
        ])
        .where_date_between("b.booked_at", range)
        .group_by(&["category", "weekday"]);
        let (sql, params) = qb.build();
        let rows = self.warehouse.query(&sql, &params)?;

        let mut cells: Vec<OccupancyCell> = rows
            .iter()
            .filter_map(|row| {
                Some(OccupancyCell {
                    category: coerce::to_key(row.get("category"))?,
                    weekday: coerce::to_key(row.get("weekday"))?,
                    occupancy_rate: round2(number(row, "occupancy_rate")),
                })
            })
            .collect();
        cells.sort_by(cell_order);
        Ok(cells)
    }
}

fn daypart_rank(category: &str) -> usize {
    DAYPARTS
        .iter()
        .position(|(name, _, _)| *name == category)
        .unwrap_or(DAYPARTS.len())
}

fn weekday_rank(weekday: &str) -> usize {
    WEEKDAYS
        .iter()
        .position(|d| *d == weekday)
        .unwrap_or(WEEKDAYS.len())
}

fn cell_order(a: &OccupancyCell, b: &OccupancyCell) -> Ordering {
    daypart_rank(&a.category)
        .cmp(&daypart_rank(&b.category))
        .then_with(|| weekday_rank(&a.weekday).cmp(&weekday_rank(&b.weekday)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(category: &str, weekday: &str) -> OccupancyCell {
        OccupancyCell {
            category: category.into(),
            weekday: weekday.into(),
            occupancy_rate: 0.0,
        }
    }

    #[test]
    fn cells_sort_by_daypart_then_weekday() {
        let mut cells = vec![
            cell("Aften", "Mon"),
            cell("Formiddag", "Sun"),
            cell("Eftermiddag", "Tue"),
            cell("Formiddag", "Mon"),
            cell("Tidlig eftermiddag", "Fri"),
        ];
        cells.sort_by(cell_order);
        let order: Vec<(&str, &str)> = cells
            .iter()
            .map(|c| (c.category.as_str(), c.weekday.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Formiddag", "Mon"),
                ("Formiddag", "Sun"),
                ("Tidlig eftermiddag", "Fri"),
                ("Eftermiddag", "Tue"),
                ("Aften", "Mon"),
            ]
        );
    }
}
