//! Period comparison: merge a current-period and a benchmark-period result
//! set into one comparison table.
//!
//! The functions here are pure. Callers run both queries first and only
//! reach this module when both succeeded, so a failed query can never leave
//! a half-filled table behind.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::coerce::round2;
use crate::models::{ComparisonRow, MetricRow, ScalarComparison};

/// Grouped values of one query, keyed by canonical department name.
pub type MetricMap = BTreeMap<String, f64>;

/// Output ordering of a comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Largest current value first; ties broken by key ascending.
    /// Used for guest counts and occupancy.
    CurrentDesc,
    /// Lexicographic by key. Used for revenue and labor.
    KeyAsc,
}

/// Fold rows into a map, summing values that share a key and dropping
/// blank keys.
pub fn metric_map<I>(rows: I) -> MetricMap
where
    I: IntoIterator<Item = MetricRow>,
{
    let mut map = MetricMap::new();
    for row in rows {
        let key = row.key.trim();
        if key.is_empty() {
            continue;
        }
        *map.entry(key.to_string()).or_insert(0.0) += row.value;
    }
    map
}

/// Percentage change from `benchmark` to `current`, rounded to 2 decimals.
///
/// Zero when the benchmark is not positive.
pub fn change_percent(current: f64, benchmark: f64) -> f64 {
    if benchmark > 0.0 {
        round2((current - benchmark) / benchmark * 100.0)
    } else {
        0.0
    }
}

/// Build the comparison table over the union of keys of both maps.
///
/// A key missing on one side counts as 0 there. Without a benchmark the rows
/// only carry `current_value`.
pub fn compare(
    current: &MetricMap,
    benchmark: Option<&MetricMap>,
    order: SortOrder,
) -> Vec<ComparisonRow> {
    let mut keys: Vec<&String> = current.keys().collect();
    if let Some(bench) = benchmark {
        keys.extend(bench.keys().filter(|k| !current.contains_key(*k)));
    }

    let mut rows: Vec<ComparisonRow> = keys
        .into_iter()
        .map(|key| {
            let cur = current.get(key).copied().unwrap_or(0.0);
            let bench = benchmark.map(|b| b.get(key).copied().unwrap_or(0.0));
            let scalar = compare_scalar(cur, bench);
            ComparisonRow {
                key: key.clone(),
                current_value: scalar.current_value,
                benchmark_value: scalar.benchmark_value,
                change_percent: scalar.change_percent,
                change_absolute: scalar.change_absolute,
            }
        })
        .collect();

    sort_rows(&mut rows, order);
    rows
}

/// Compare a single total against an optional benchmark total.
pub fn compare_scalar(current: f64, benchmark: Option<f64>) -> ScalarComparison {
    match benchmark {
        Some(bench) => ScalarComparison {
            current_value: round2(current),
            benchmark_value: Some(round2(bench)),
            change_percent: Some(change_percent(current, bench)),
            change_absolute: Some(round2(current - bench)),
        },
        None => ScalarComparison {
            current_value: round2(current),
            benchmark_value: None,
            change_percent: None,
            change_absolute: None,
        },
    }
}

fn sort_rows(rows: &mut [ComparisonRow], order: SortOrder) {
    match order {
        SortOrder::KeyAsc => rows.sort_by(|a, b| a.key.cmp(&b.key)),
        SortOrder::CurrentDesc => rows.sort_by(|a, b| {
            b.current_value
                .partial_cmp(&a.current_value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        }),
    }
}
