use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetricRow — One grouped aggregate from a single query over one range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub key: String,
    pub value: f64,
}

impl MetricRow {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// ComparisonRow — Current period vs. benchmark period for one key
// ---------------------------------------------------------------------------

/// Benchmark fields are `None` when no benchmark range was requested, and
/// are then left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub key: String,
    pub current_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_absolute: Option<f64>,
}

// ---------------------------------------------------------------------------
// ScalarComparison — Chain-wide total vs. benchmark
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarComparison {
    pub current_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_absolute: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaxSummary {
    #[serde(flatten)]
    pub pax: ScalarComparison,
    pub current_bookings: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_bookings: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborSummary {
    #[serde(flatten)]
    pub cost: ScalarComparison,
    pub current_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_hours: Option<f64>,
}

/// Labor cost comparison for one department, with the hours worked and the
/// number of distinct employees behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborRow {
    #[serde(flatten)]
    pub comparison: ComparisonRow,
    pub current_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_hours: Option<f64>,
    pub employee_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_employee_count: Option<i64>,
}

// ---------------------------------------------------------------------------
// RatioRow — Cross-source ratio per department (revenue per guest, etc.)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub key: String,
    pub numerator: f64,
    pub denominator: f64,
    pub ratio: f64,
}

// ---------------------------------------------------------------------------
// OccupancyCell — One daypart × weekday heatmap cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyCell {
    pub category: String,
    pub weekday: String,
    pub occupancy_rate: f64,
}

// ---------------------------------------------------------------------------
// HealthStatus — Warehouse reachability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    /// Warehouse clock at the time of the check.
    pub timestamp: String,
}
