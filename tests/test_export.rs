//! CSV export through `Dashboard::export_csv` and endpoint replay via
//! `Dashboard::fetch`.

mod common;

use std::collections::BTreeMap;

use chain_dashboard::export::ExportRequest;
use chain_dashboard::params::RangeParams;
use chain_dashboard::{DashboardError, Endpoint};
use common::setup_dashboard;

fn request(endpoint: &str, params: &[(&str, &str)]) -> ExportRequest {
    ExportRequest {
        endpoint: endpoint.to_string(),
        params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn may_params() -> RangeParams {
    RangeParams {
        start_date: Some("2024-05-01".into()),
        end_date: Some("2024-05-31".into()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// fetch
// ---------------------------------------------------------------------------

#[test]
fn fetch_wraps_rows_with_count_and_period() {
    let (dashboard, _tmp) = setup_dashboard();

    let envelope = dashboard.fetch(Endpoint::PaxByDepartment, &may_params()).unwrap();
    assert_eq!(envelope.count, Some(3));

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["start_date"], "2024-05-01");
    assert_eq!(json["end_date"], "2024-05-31");
    assert!(json.get("benchmark_start").is_none());
    assert_eq!(json["data"][0]["key"], "Aarhus");
}

#[test]
fn fetch_rejects_half_a_benchmark() {
    let (dashboard, _tmp) = setup_dashboard();

    let params = RangeParams {
        benchmark_start: Some("2023-05-01".into()),
        ..may_params()
    };
    let err = dashboard.fetch(Endpoint::RevenueByDepartment, &params).unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn non_comparison_endpoints_drop_the_benchmark() {
    let (dashboard, _tmp) = setup_dashboard();

    let params = RangeParams {
        benchmark_start: Some("2023-05-01".into()),
        benchmark_end: Some("2023-05-31".into()),
        ..may_params()
    };
    let envelope = dashboard.fetch(Endpoint::OccupancyByCategory, &params).unwrap();
    let json = serde_json::to_value(&envelope).unwrap();
    assert!(json.get("benchmark_start").is_none());
    assert_eq!(json["data"][0]["category"], "Formiddag");
}

#[test]
fn summary_endpoints_have_no_count() {
    let (dashboard, _tmp) = setup_dashboard();

    let envelope = dashboard.fetch(Endpoint::LaborSummary, &may_params()).unwrap();
    assert_eq!(envelope.count, None);
    assert_eq!(envelope.data["current_hours"], 26.5);
}

#[test]
fn departments_endpoint_lists_names() {
    let (dashboard, _tmp) = setup_dashboard();

    let envelope = dashboard.fetch(Endpoint::Departments, &RangeParams::default()).unwrap();
    assert_eq!(envelope.count, Some(4));
    assert!(envelope.period.is_none());
}

// ---------------------------------------------------------------------------
// export_csv
// ---------------------------------------------------------------------------

#[test]
fn export_writes_header_and_one_line_per_row() {
    let (dashboard, _tmp) = setup_dashboard();

    let csv = dashboard
        .export_csv(&request(
            "/api/revenue/by-department",
            &[("start_date", "2024-05-01"), ("end_date", "2024-05-31")],
        ))
        .unwrap();
    let text = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "key,current_value");
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "Aarhus,1500.0");
}

#[test]
fn export_with_benchmark_includes_comparison_columns() {
    let (dashboard, _tmp) = setup_dashboard();

    let csv = dashboard
        .export_csv(&request(
            "/api/pax/by-department",
            &[
                ("start_date", "2024-05-01"),
                ("end_date", "2024-05-31"),
                ("benchmark_start", "2023-05-01"),
                ("benchmark_end", "2023-05-31"),
            ],
        ))
        .unwrap();
    let text = String::from_utf8(csv).unwrap();
    assert_eq!(
        text.lines().next().unwrap(),
        "key,current_value,benchmark_value,change_percent,change_absolute"
    );
}

#[test]
fn export_of_a_summary_is_a_single_line() {
    let (dashboard, _tmp) = setup_dashboard();

    let csv = dashboard
        .export_csv(&request(
            "/api/pax/summary",
            &[("start_date", "2024-05-01"), ("end_date", "2024-05-31")],
        ))
        .unwrap();
    let text = String::from_utf8(csv).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn unknown_endpoint_is_rejected() {
    let (dashboard, _tmp) = setup_dashboard();

    let err = dashboard
        .export_csv(&request("/api/nope", &[]))
        .unwrap_err();
    assert!(matches!(err, DashboardError::InvalidArgument(_)));
}

#[test]
fn live_endpoints_cannot_be_exported() {
    let (dashboard, _tmp) = setup_dashboard();

    let err = dashboard
        .export_csv(&request("/api/guests/live", &[]))
        .unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn export_errors_propagate_from_params() {
    let (dashboard, _tmp) = setup_dashboard();

    let err = dashboard
        .export_csv(&request("/api/labor/by-department", &[("start_date", "May 1st")]))
        .unwrap_err();
    assert!(matches!(err, DashboardError::InvalidDate { .. }));
}
