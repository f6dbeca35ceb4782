//! Labor cost and hours from the warehouse shift and payroll relations.
//!
//! Cost of a shift is its length in hours times the payroll wage rate; a
//! shift without a payroll row costs nothing but still counts its hours.

use std::collections::BTreeMap;

use crate::coerce::{self, round2};
use crate::comparison::{compare, compare_scalar, MetricMap, SortOrder};
use crate::connection::ConnectionProvider;
use crate::dates::DateRange;
use crate::departments::DepartmentDirectory;
use crate::error::Result;
use crate::models::{LaborRow, LaborSummary};
use crate::queries::{for_ranges, number, single_row};
use crate::sql_builder::SqlBuilder;

const HOURS_EXPR: &str = "COALESCE((epoch(TRY_CAST(s.end_at AS TIMESTAMP)) - epoch(TRY_CAST(s.start_at AS TIMESTAMP))) / 3600.0, 0)";

fn cost_expr() -> String {
    format!(
        "CAST(SUM({} * COALESCE(TRY_CAST(p.wage_rate AS DOUBLE), 0)) AS DOUBLE)",
        HOURS_EXPR
    )
}

fn hours_expr() -> String {
    format!("CAST(SUM({}) AS DOUBLE)", HOURS_EXPR)
}

#[derive(Debug, Clone, Copy, Default)]
struct DepartmentLabor {
    cost: f64,
    hours: f64,
    employees: i64,
}

pub struct LaborQuery<'a> {
    warehouse: &'a dyn ConnectionProvider,
    directory: &'a DepartmentDirectory,
}

impl<'a> LaborQuery<'a> {
    pub fn new(warehouse: &'a dyn ConnectionProvider, directory: &'a DepartmentDirectory) -> Self {
        Self {
            warehouse,
            directory,
        }
    }

    /// Labor cost per department, by name, with hours and head count.
    pub fn by_department(
        &self,
        current: &DateRange,
        benchmark: Option<&DateRange>,
    ) -> Result<Vec<LaborRow>> {
        let (cur, bench) = for_ranges(current, benchmark, |range| self.department_stats(range))?;
        let cost_map = |stats: &BTreeMap<String, DepartmentLabor>| -> MetricMap {
            stats.iter().map(|(k, v)| (k.clone(), v.cost)).collect()
        };
        let bench_costs = bench.as_ref().map(cost_map);
        let rows = compare(&cost_map(&cur), bench_costs.as_ref(), SortOrder::KeyAsc);

        Ok(rows
            .into_iter()
            .map(|comparison| {
                let now = cur.get(&comparison.key).copied().unwrap_or_default();
                let then = bench
                    .as_ref()
                    .map(|b| b.get(&comparison.key).copied().unwrap_or_default());
                LaborRow {
                    current_hours: round2(now.hours),
                    benchmark_hours: then.map(|t| round2(t.hours)),
                    employee_count: now.employees,
                    benchmark_employee_count: then.map(|t| t.employees),
                    comparison,
                }
            })
            .collect())
    }

    /// Chain-wide labor cost and hours.
    pub fn summary(&self, current: &DateRange, benchmark: Option<&DateRange>) -> Result<LaborSummary> {
        let (cur, bench) = for_ranges(current, benchmark, |range| self.chain_totals(range))?;
        Ok(LaborSummary {
            cost: compare_scalar(cur.0, bench.map(|b| b.0)),
            current_hours: round2(cur.1),
            benchmark_hours: bench.map(|b| round2(b.1)),
        })
    }

    /// Labor cost per canonical department name over one range.
    pub fn costs(&self, range: &DateRange) -> Result<MetricMap> {
        Ok(self
            .department_stats(range)?
            .into_iter()
            .map(|(key, stats)| (key, stats.cost))
            .collect())
    }

    /// Cost, hours and distinct employees per canonical department name.
    /// Departments reported under several aliases are summed.
    fn department_stats(&self, range: &DateRange) -> Result<BTreeMap<String, DepartmentLabor>> {
        let cost = format!("{} AS cost", cost_expr());
        let hours = format!("{} AS hours", hours_expr());
        let mut qb = Self::shifts();
        qb.select(&[
            "d.name AS key",
            cost.as_str(),
            hours.as_str(),
            "COUNT(DISTINCT s.employee_id) AS employees",
        ])
        .join("LEFT JOIN departments d ON CAST(s.department_id AS VARCHAR) = CAST(d.id AS VARCHAR)")
        .where_date_between("s.start_at", range)
        .group_by(&["d.name"]);
        let (sql, params) = qb.build();
        let rows = self.warehouse.query(&sql, &params)?;

        let mut stats: BTreeMap<String, DepartmentLabor> = BTreeMap::new();
        for row in &rows {
            let Some(key) = coerce::to_key(row.get("key")) else {
                continue;
            };
            let entry = stats.entry(self.directory.canonical_name(&key)).or_default();
            entry.cost += number(row, "cost");
            entry.hours += number(row, "hours");
            entry.employees += number(row, "employees") as i64;
        }
        Ok(stats)
    }

    fn chain_totals(&self, range: &DateRange) -> Result<(f64, f64)> {
        let cost = format!("{} AS total_cost", cost_expr());
        let hours = format!("{} AS total_hours", hours_expr());
        let mut qb = Self::shifts();
        qb.select(&[cost.as_str(), hours.as_str()])
            .where_date_between("s.start_at", range);
        let (sql, params) = qb.build();
        let row = single_row(self.warehouse.query(&sql, &params)?);
        Ok((number(&row, "total_cost"), number(&row, "total_hours")))
    }

    fn shifts() -> SqlBuilder {
        let mut qb = SqlBuilder::new("shifts s");
        qb.join("LEFT JOIN payroll p ON CAST(s.id AS VARCHAR) = CAST(p.shift_id AS VARCHAR)");
        qb
    }
}
