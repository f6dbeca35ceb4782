//! Guest counts (PAX) and the department list from the warehouse.

mod common;

use common::{may_2023, may_2024, setup_dashboard};

// ---------------------------------------------------------------------------
// by_department
// ---------------------------------------------------------------------------

#[test]
fn by_department_sums_pax_largest_first() {
    let (dashboard, _tmp) = setup_dashboard();

    let rows = dashboard.pax().by_department(&may_2024(), None).unwrap();
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Aarhus", "Vejle", "Odense"]);
    assert_eq!(rows[0].current_value, 12.0);
    assert_eq!(rows[1].current_value, 10.0);
    assert_eq!(rows[2].current_value, 8.0);
    assert!(rows.iter().all(|r| r.benchmark_value.is_none()));
}

#[test]
fn by_department_compares_against_benchmark() {
    let (dashboard, _tmp) = setup_dashboard();

    let rows = dashboard
        .pax()
        .by_department(&may_2024(), Some(&may_2023()))
        .unwrap();
    assert_eq!(rows.len(), 4);

    let aarhus = rows.iter().find(|r| r.key == "Aarhus").unwrap();
    assert_eq!(aarhus.benchmark_value, Some(10.0));
    assert_eq!(aarhus.change_percent, Some(20.0));
    assert_eq!(aarhus.change_absolute, Some(2.0));

    let odense = rows.iter().find(|r| r.key == "Odense").unwrap();
    assert_eq!(odense.change_percent, Some(-20.0));

    let vejle = rows.iter().find(|r| r.key == "Vejle").unwrap();
    assert_eq!(vejle.benchmark_value, Some(0.0));
    assert_eq!(vejle.change_percent, Some(0.0));

    // Only booked last year: still listed, with nothing this year
    let horsens = rows.last().unwrap();
    assert_eq!(horsens.key, "Horsens");
    assert_eq!(horsens.current_value, 0.0);
    assert_eq!(horsens.change_percent, Some(-100.0));
}

#[test]
fn bookings_without_a_restaurant_name_are_left_out_of_the_table() {
    let (dashboard, _tmp) = setup_dashboard();

    let rows = dashboard.pax().by_department(&may_2024(), None).unwrap();
    let total: f64 = rows.iter().map(|r| r.current_value).sum();
    assert_eq!(total, 30.0);
}

#[test]
fn empty_range_yields_no_rows() {
    let (dashboard, _tmp) = setup_dashboard();

    let range = chain_dashboard::dates::DateRange::parse("2020-01-01", "2020-01-31").unwrap();
    let rows = dashboard.pax().by_department(&range, None).unwrap();
    assert!(rows.is_empty());
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

#[test]
fn summary_counts_every_booking_in_range() {
    let (dashboard, _tmp) = setup_dashboard();

    let summary = dashboard.pax().summary(&may_2024(), Some(&may_2023())).unwrap();
    assert_eq!(summary.pax.current_value, 37.0);
    assert_eq!(summary.pax.benchmark_value, Some(25.0));
    assert_eq!(summary.pax.change_percent, Some(48.0));
    assert_eq!(summary.pax.change_absolute, Some(12.0));
    assert_eq!(summary.current_bookings, 7);
    assert_eq!(summary.benchmark_bookings, Some(4));
}

#[test]
fn summary_json_is_flat() {
    let (dashboard, _tmp) = setup_dashboard();

    let summary = dashboard.pax().summary(&may_2024(), None).unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["current_value"], 37.0);
    assert_eq!(json["current_bookings"], 7);
    assert!(json.get("benchmark_value").is_none());
    assert!(json.get("benchmark_bookings").is_none());
}

#[test]
fn summary_of_empty_range_is_zero() {
    let (dashboard, _tmp) = setup_dashboard();

    let range = chain_dashboard::dates::DateRange::parse("2020-01-01", "2020-01-01").unwrap();
    let summary = dashboard.pax().summary(&range, None).unwrap();
    assert_eq!(summary.pax.current_value, 0.0);
    assert_eq!(summary.current_bookings, 0);
}

// ---------------------------------------------------------------------------
// departments
// ---------------------------------------------------------------------------

#[test]
fn departments_are_distinct_and_sorted() {
    let (dashboard, _tmp) = setup_dashboard();

    let names = dashboard.departments().list().unwrap();
    assert_eq!(names, vec!["Aarhus", "Horsens", "Odense", "Vejle"]);
}
