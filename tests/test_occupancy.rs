//! Occupancy per department and per daypart/weekday cell.

mod common;

use common::{may_2023, may_2024, setup_dashboard};

// ---------------------------------------------------------------------------
// by_department
// ---------------------------------------------------------------------------

#[test]
fn rate_is_confirmed_share_of_all_bookings() {
    let (dashboard, _tmp) = setup_dashboard();

    let rows = dashboard.occupancy().by_department(&may_2024(), None).unwrap();
    let pairs: Vec<(&str, f64)> = rows
        .iter()
        .map(|r| (r.key.as_str(), r.current_value))
        .collect();
    assert_eq!(
        pairs,
        vec![("Vejle", 100.0), ("Aarhus", 66.67), ("Odense", 50.0)]
    );
}

#[test]
fn status_match_ignores_case() {
    let (dashboard, _tmp) = setup_dashboard();

    // Odense's only confirmed booking is spelled "confirmed"
    let rows = dashboard.occupancy().by_department(&may_2024(), None).unwrap();
    let odense = rows.iter().find(|r| r.key == "Odense").unwrap();
    assert_eq!(odense.current_value, 50.0);
}

#[test]
fn benchmark_rates_are_compared() {
    let (dashboard, _tmp) = setup_dashboard();

    let rows = dashboard
        .occupancy()
        .by_department(&may_2024(), Some(&may_2023()))
        .unwrap();
    let aarhus = rows.iter().find(|r| r.key == "Aarhus").unwrap();
    assert_eq!(aarhus.benchmark_value, Some(100.0));
    assert_eq!(aarhus.change_absolute, Some(-33.33));

    let horsens = rows.iter().find(|r| r.key == "Horsens").unwrap();
    assert_eq!(horsens.current_value, 0.0);
    assert_eq!(horsens.benchmark_value, Some(100.0));
}

// ---------------------------------------------------------------------------
// by_category
// ---------------------------------------------------------------------------

#[test]
fn cells_are_ordered_by_daypart_then_weekday() {
    let (dashboard, _tmp) = setup_dashboard();

    let cells = dashboard.occupancy().by_category(&may_2024()).unwrap();
    let layout: Vec<(&str, &str, f64)> = cells
        .iter()
        .map(|c| (c.category.as_str(), c.weekday.as_str(), c.occupancy_rate))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("Formiddag", "Sat", 0.0),
            ("Tidlig eftermiddag", "Mon", 0.0),
            ("Tidlig eftermiddag", "Fri", 100.0),
            ("Aften", "Thu", 100.0),
            ("Aften", "Fri", 100.0),
            ("Aften", "Sat", 100.0),
            ("Aften", "Sun", 100.0),
        ]
    );
}

#[test]
fn empty_range_has_no_cells() {
    let (dashboard, _tmp) = setup_dashboard();

    let range = chain_dashboard::dates::DateRange::parse("2022-01-01", "2022-01-31").unwrap();
    assert!(dashboard.occupancy().by_category(&range).unwrap().is_empty());
}
