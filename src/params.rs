//! Request parameters shared by the HTTP routes and CSV export replay.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{parse_date, DateRange};
use crate::error::{DashboardError, Result};

/// Raw date parameters as they arrive in a query string or export request.
/// Blank values count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub benchmark_start: Option<String>,
    pub benchmark_end: Option<String>,
    /// Single day for the live guest count.
    pub date: Option<String>,
}

/// Validated current period plus optional benchmark period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_end: Option<NaiveDate>,
}

impl Period {
    pub fn current(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn benchmark(&self) -> Option<DateRange> {
        match (self.benchmark_start, self.benchmark_end) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        }
    }

    /// Same current period, benchmark dropped. For endpoints that do not
    /// compare periods.
    pub fn without_benchmark(self) -> Self {
        Self {
            benchmark_start: None,
            benchmark_end: None,
            ..self
        }
    }

    fn from_ranges(current: DateRange, benchmark: Option<DateRange>) -> Self {
        Self {
            start_date: current.start,
            end_date: current.end,
            benchmark_start: benchmark.map(|b| b.start),
            benchmark_end: benchmark.map(|b| b.end),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RangeParams {
    /// Build from a loose string map (the `params` object of an export request).
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).cloned();
        Self {
            start_date: get("start_date"),
            end_date: get("end_date"),
            benchmark_start: get("benchmark_start"),
            benchmark_end: get("benchmark_end"),
            date: get("date"),
        }
    }

    /// Resolve the current and benchmark ranges.
    ///
    /// Missing current dates default to `today`. The benchmark needs both
    /// ends or neither; one without the other is an error.
    pub fn period(&self, today: NaiveDate) -> Result<Period> {
        let start = match present(&self.start_date) {
            Some(s) => parse_date(s)?,
            None => today,
        };
        let end = match present(&self.end_date) {
            Some(s) => parse_date(s)?,
            None => today,
        };
        let current = DateRange::new(start, end)?;

        let benchmark = match (present(&self.benchmark_start), present(&self.benchmark_end)) {
            (Some(s), Some(e)) => Some(DateRange::parse(s, e)?),
            (None, None) => None,
            _ => {
                return Err(DashboardError::InvalidArgument(
                    "benchmark_start and benchmark_end must be given together".into(),
                ))
            }
        };

        Ok(Period::from_ranges(current, benchmark))
    }

    /// The `date` parameter, defaulting to `today`.
    pub fn day(&self, today: NaiveDate) -> Result<NaiveDate> {
        match present(&self.date) {
            Some(s) => parse_date(s),
            None => Ok(today),
        }
    }
}
