use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::coerce;

// ---------------------------------------------------------------------------
// BookingStatus — Lifecycle state reported by the booking system
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Current,
    Waiting,
    Deleted,
    NoShow,
    PaymentError,
    Moved,
    Other(String),
}

impl BookingStatus {
    /// Parse a status label; case, spaces and dashes are ignored.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "current" => Self::Current,
            "waiting" => Self::Waiting,
            "deleted" => Self::Deleted,
            "no_show" | "noshow" => Self::NoShow,
            "payment_error" => Self::PaymentError,
            "moved" => Self::Moved,
            _ => Self::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Current => "current",
            Self::Waiting => "waiting",
            Self::Deleted => "deleted",
            Self::NoShow => "no_show",
            Self::PaymentError => "payment_error",
            Self::Moved => "moved",
            Self::Other(label) => label,
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// The API reports status either as a bare string or nested in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Label(String),
    Named { name: String },
    Nested { status: String },
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = match RawStatus::deserialize(deserializer)? {
            RawStatus::Label(s) | RawStatus::Named { name: s } | RawStatus::Nested { status: s } => s,
        };
        Ok(Self::from_label(&label))
    }
}

impl Serialize for BookingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LiveBookingRecord — One booking as returned by the upstream API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveBookingRecord {
    pub restaurant_id: String,
    pub status: BookingStatus,
    pub pax: i64,
    pub date: NaiveDate,
}

/// Wire shape of a booking; every field is optional so one malformed
/// booking never fails the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiBooking {
    #[serde(default, alias = "restaurant", alias = "location_id")]
    pub restaurant_id: Option<Value>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, alias = "persons", alias = "guests")]
    pub pax: Value,
    #[serde(default, alias = "date_time", alias = "booking_date", alias = "start")]
    pub date: Option<String>,
}

impl ApiBooking {
    /// Normalize into a record, falling back to `location_id` when the
    /// booking does not name its restaurant. `None` when the date is unusable.
    pub fn into_record(self, location_id: &str) -> Option<LiveBookingRecord> {
        let date = self.date.as_deref().and_then(leading_date)?;
        let restaurant_id =
            coerce::to_key(self.restaurant_id.as_ref()).unwrap_or_else(|| location_id.to_string());
        Some(LiveBookingRecord {
            restaurant_id,
            status: self.status,
            pax: coerce::to_i64(&self.pax),
            date,
        })
    }
}

/// Accepts `2024-05-01`, `2024-05-01T19:30:00` and `2024-05-01 19:30`.
fn leading_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// BookingPage — One page of the upstream listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default, alias = "last_page", alias = "pages", alias = "total_pages")]
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiBookingPage {
    #[serde(default, alias = "bookings", alias = "results")]
    pub data: Vec<ApiBooking>,
    #[serde(default)]
    pub meta: PageMeta,
    #[serde(default, alias = "last_page", alias = "pages", alias = "total_pages")]
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingPage {
    pub bookings: Vec<LiveBookingRecord>,
    /// Total number of pages reported by the API (at least 1).
    pub page_count: u32,
}

impl ApiBookingPage {
    pub fn into_page(self, location_id: &str) -> BookingPage {
        let page_count = self.page_count.or(self.meta.page_count).unwrap_or(1).max(1);
        BookingPage {
            bookings: self
                .data
                .into_iter()
                .filter_map(|b| b.into_record(location_id))
                .collect(),
            page_count,
        }
    }
}
