//! Shared test fixtures: sample warehouse and sales tables materialized from
//! NDJSON, a scripted booking source, and settings that tie them together.
//!
//! Current period is May 2024, benchmark period May 2023.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chain_dashboard::booking::{BookingQuery, BookingSource};
use chain_dashboard::config::{DepartmentEntry, Settings};
use chain_dashboard::connection::{ConnectionProvider, DuckDbProvider, SqlConnection};
use chain_dashboard::dates::DateRange;
use chain_dashboard::models::{BookingPage, BookingStatus, LiveBookingRecord};
use chain_dashboard::{Dashboard, DashboardError, Result};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const PASSWORD: &str = "s3cret";

pub fn may_2024() -> DateRange {
    DateRange::parse("2024-05-01", "2024-05-31").unwrap()
}

pub fn may_2023() -> DateRange {
    DateRange::parse("2023-05-01", "2023-05-31").unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Write `rows` as newline-delimited JSON into `dir`.
fn write_ndjson(dir: &Path, table: &str, rows: &[Value]) -> std::path::PathBuf {
    let path = dir.join(format!("{}.ndjson", table));
    let body: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    std::fs::write(&path, body.join("\n")).unwrap();
    path
}

/// Warehouse provider over the sample relations. The files live in `dir`,
/// which must outlive the provider: every open re-reads them.
pub fn warehouse(dir: &Path) -> DuckDbProvider {
    let restaurants = write_ndjson(
        dir,
        "restaurants",
        &[
            json!({"id": 101, "name": "Aarhus"}),
            json!({"id": 102, "name": "Odense"}),
            json!({"id": 104, "name": "Vejle"}),
            json!({"id": 105, "name": null}),
            json!({"id": 106, "name": "Horsens"}),
        ],
    );
    let bookings = write_ndjson(
        dir,
        "bookings",
        &[
            json!({"restaurant_id": 101, "booked_at": "2024-05-03 18:30:00", "pax": 4, "status": "Confirmed"}),
            json!({"restaurant_id": 101, "booked_at": "2024-05-10 12:00:00", "pax": 6, "status": "Confirmed"}),
            json!({"restaurant_id": 101, "booked_at": "2024-05-11 09:15:00", "pax": 2, "status": "Cancelled"}),
            json!({"restaurant_id": 102, "booked_at": "2024-05-04 19:00:00", "pax": 3, "status": "confirmed"}),
            json!({"restaurant_id": 102, "booked_at": "2024-05-20 13:00:00", "pax": 5, "status": "Cancelled"}),
            json!({"restaurant_id": 104, "booked_at": "2024-05-30 20:00:00", "pax": 10, "status": "Confirmed"}),
            json!({"restaurant_id": 105, "booked_at": "2024-05-05 18:00:00", "pax": 7, "status": "Confirmed"}),
            json!({"restaurant_id": 101, "booked_at": "2024-06-01 18:00:00", "pax": 100, "status": "Confirmed"}),
            json!({"restaurant_id": 101, "booked_at": "2023-05-06 18:00:00", "pax": 10, "status": "Confirmed"}),
            json!({"restaurant_id": 102, "booked_at": "2023-05-07 18:00:00", "pax": 8, "status": "Confirmed"}),
            json!({"restaurant_id": 102, "booked_at": "2023-05-08 18:00:00", "pax": 2, "status": "Cancelled"}),
            json!({"restaurant_id": 106, "booked_at": "2023-05-09 18:00:00", "pax": 5, "status": "Confirmed"}),
        ],
    );
    let departments = write_ndjson(
        dir,
        "departments",
        &[
            json!({"id": 1, "name": "Aarhus"}),
            json!({"id": 2, "name": "Odense"}),
        ],
    );
    let shifts = write_ndjson(
        dir,
        "shifts",
        &[
            json!({"id": 1, "department_id": 1, "employee_id": 10, "start_at": "2024-05-03 10:00:00", "end_at": "2024-05-03 18:00:00"}),
            json!({"id": 2, "department_id": 1, "employee_id": 11, "start_at": "2024-05-04 16:00:00", "end_at": "2024-05-04 20:30:00"}),
            json!({"id": 3, "department_id": 2, "employee_id": 12, "start_at": "2024-05-05 12:00:00", "end_at": "2024-05-05 18:00:00"}),
            json!({"id": 4, "department_id": 2, "employee_id": 13, "start_at": "2024-05-06 09:00:00", "end_at": "2024-05-06 17:00:00"}),
            json!({"id": 5, "department_id": 1, "employee_id": 10, "start_at": "2023-05-03 10:00:00", "end_at": "2023-05-03 18:00:00"}),
        ],
    );
    let payroll = write_ndjson(
        dir,
        "payroll",
        &[
            json!({"shift_id": 1, "wage_rate": 150.0}),
            json!({"shift_id": 2, "wage_rate": 200.0}),
            json!({"shift_id": 4, "wage_rate": 100.0}),
            json!({"shift_id": 5, "wage_rate": 125.0}),
        ],
    );
    let guest_counts = write_ndjson(
        dir,
        "guest_counts",
        &[
            json!({"location_id": "101", "visit_date": "2024-05-02", "pax": 40, "bookings": 10}),
            json!({"location_id": "101", "visit_date": "2024-05-03", "pax": 20, "bookings": 5}),
            json!({"location_id": "102", "visit_date": "2024-05-02", "pax": 30, "bookings": 8}),
            json!({"location_id": "999", "visit_date": "2024-05-02", "pax": 5, "bookings": 1}),
            json!({"location_id": "101", "visit_date": "2023-05-02", "pax": 50, "bookings": 12}),
        ],
    );

    DuckDbProvider::in_memory("warehouse")
        .with_ndjson_table("restaurants", &restaurants)
        .with_ndjson_table("bookings", &bookings)
        .with_ndjson_table("departments", &departments)
        .with_ndjson_table("shifts", &shifts)
        .with_ndjson_table("payroll", &payroll)
        .with_ndjson_table("guest_counts", &guest_counts)
}

/// Sales provider. Department names drift: "CS Aarhus" and "Aarhus " are
/// both Aarhus, "Kolding" is not configured at all.
pub fn sales(dir: &Path) -> DuckDbProvider {
    let sales = write_ndjson(
        dir,
        "sales",
        &[
            json!({"department": "CS Aarhus", "sale_date": "2024-05-03", "total_excl_vat": 1000.0, "sales_type": "PosSale", "item_group_text": "Mad"}),
            json!({"department": "Aarhus ", "sale_date": "2024-05-04", "total_excl_vat": 500.0, "sales_type": "PosSale", "item_group_text": null}),
            json!({"department": "Aarhus", "sale_date": "2024-05-05", "total_excl_vat": 200.0, "sales_type": "PosSale", "item_group_text": "Gavekort 500"}),
            json!({"department": "Odense", "sale_date": "2024-05-06", "total_excl_vat": 800.0, "sales_type": "PosSale", "item_group_text": "Drikkevarer"}),
            json!({"department": "Odense", "sale_date": "2024-05-07", "total_excl_vat": 50.0, "sales_type": "PosSaleTotal", "item_group_text": "Mad"}),
            json!({"department": "Odense", "sale_date": "2024-05-08", "total_excl_vat": 90.0, "sales_type": "PosSale", "item_group_text": "GiftUp voucher"}),
            json!({"department": "Vejle", "sale_date": "2024-05-09", "total_excl_vat": 300.0, "sales_type": "PosSale", "item_group_text": "Reklamationer"}),
            json!({"department": "Kolding", "sale_date": "2024-05-10", "total_excl_vat": 400.0, "sales_type": "PosSale", "item_group_text": "Mad"}),
            json!({"department": "Aarhus", "sale_date": "2023-05-03", "total_excl_vat": 1200.0, "sales_type": "PosSale", "item_group_text": "Mad"}),
            json!({"department": "Odense", "sale_date": "2023-05-04", "total_excl_vat": 400.0, "sales_type": "PosSale", "item_group_text": "Mad"}),
        ],
    );
    DuckDbProvider::in_memory("sales").with_ndjson_table("sales", &sales)
}

/// Wraps a provider and refuses the `fail_on`-th open (1-based). Clones
/// share the open counter.
#[derive(Clone)]
pub struct FailingProvider {
    inner: DuckDbProvider,
    fail_on: usize,
    opens: Arc<AtomicUsize>,
}

impl FailingProvider {
    pub fn new(inner: DuckDbProvider, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl ConnectionProvider for FailingProvider {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn open(&self) -> Result<Box<dyn SqlConnection>> {
        let n = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            return Err(DashboardError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "warehouse unavailable",
            )));
        }
        self.inner.open()
    }
}

// ---------------------------------------------------------------------------
// Booking source
// ---------------------------------------------------------------------------

enum Script {
    Pages(Vec<BookingPage>),
    TimesOut,
}

/// Scripted booking API. Unscripted locations answer with an empty page.
/// Clones share the call log.
#[derive(Clone, Default)]
pub struct FakeBookingSource {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    calls: Arc<Mutex<Vec<(String, u32)>>>,
}

impl FakeBookingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// One page of current bookings on `day`, one booking per entry in `pax`.
    pub fn with_bookings(self, location_id: &str, day: NaiveDate, pax: &[i64]) -> Self {
        let bookings = pax
            .iter()
            .map(|&p| record(location_id, BookingStatus::Current, p, day))
            .collect();
        self.with_pages(location_id, vec![BookingPage { bookings, page_count: 1 }])
    }

    pub fn with_pages(self, location_id: &str, pages: Vec<BookingPage>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(location_id.to_string(), Script::Pages(pages));
        self
    }

    pub fn timing_out(self, location_id: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(location_id.to_string(), Script::TimesOut);
        self
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl BookingSource for FakeBookingSource {
    fn fetch_page(&self, location_id: &str, _query: &BookingQuery, page: u32) -> Result<BookingPage> {
        self.calls
            .lock()
            .unwrap()
            .push((location_id.to_string(), page));
        match self.scripts.lock().unwrap().get(location_id) {
            Some(Script::TimesOut) => Err(DashboardError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "operation timed out",
            ))),
            Some(Script::Pages(pages)) => Ok(pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or(BookingPage {
                    bookings: Vec::new(),
                    page_count: pages.len() as u32,
                })),
            None => Ok(BookingPage {
                bookings: Vec::new(),
                page_count: 1,
            }),
        }
    }
}

pub fn record(location_id: &str, status: BookingStatus, pax: i64, day: NaiveDate) -> LiveBookingRecord {
    LiveBookingRecord {
        restaurant_id: location_id.to_string(),
        status,
        pax,
        date: day,
    }
}

// ---------------------------------------------------------------------------
// Settings and dashboard
// ---------------------------------------------------------------------------

/// Three configured departments, no pacing delay, auth on.
pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.departments = vec![
        DepartmentEntry {
            id: "101".into(),
            name: "Aarhus".into(),
            aliases: vec!["CS Aarhus".into()],
        },
        DepartmentEntry {
            id: "102".into(),
            name: "Odense".into(),
            aliases: vec![],
        },
        DepartmentEntry {
            id: "104".into(),
            name: "Vejle".into(),
            aliases: vec![],
        },
    ];
    settings.booking_api.min_interval_ms = 0;
    settings.booking_api.max_live_range_days = 7;
    settings.auth.password = PASSWORD.to_string();
    settings
        .auth
        .users
        .insert("karl".to_string(), "admin".to_string());
    settings
        .auth
        .users
        .insert("anna".to_string(), "CS Aarhus".to_string());
    settings
}

/// Dashboard over the sample data with `source` as the booking API.
///
/// Returns the `TempDir` as well; keep it alive for the whole test.
pub fn setup_dashboard_with(settings: Settings, source: FakeBookingSource) -> (Dashboard, TempDir) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("static")).unwrap();
    std::fs::write(
        dir.path().join("static").join("index.html"),
        "<!doctype html><title>Dashboard</title>",
    )
    .unwrap();

    let mut settings = settings;
    settings.server.static_dir = dir.path().join("static");

    let dashboard = Dashboard::builder(settings)
        .warehouse(warehouse(dir.path()))
        .sales(sales(dir.path()))
        .booking_source(source)
        .build()
        .unwrap();
    (dashboard, dir)
}

pub fn setup_dashboard() -> (Dashboard, TempDir) {
    setup_dashboard_with(settings(), FakeBookingSource::new())
}
