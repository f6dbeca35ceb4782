use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::Url;
use tracing::debug;

use crate::config::BookingApiSettings;
use crate::dates::{format_date, DateRange};
use crate::error::{DashboardError, Result};
use crate::models::{ApiBookingPage, BookingPage};

/// Which bookings to list for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingQuery {
    Day(NaiveDate),
    Range(DateRange),
}

impl BookingQuery {
    /// True when a booking dated `date` belongs to this query.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match self {
            BookingQuery::Day(day) => *day == date,
            BookingQuery::Range(range) => range.contains(date),
        }
    }

    pub fn range(&self) -> DateRange {
        match self {
            BookingQuery::Day(day) => DateRange::single(*day),
            BookingQuery::Range(range) => *range,
        }
    }

    fn query_pairs(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut pairs = match self {
            BookingQuery::Day(day) => vec![("date", format_date(*day))],
            BookingQuery::Range(range) => {
                let (from, to) = range.params();
                vec![("from", from), ("to", to)]
            }
        };
        pairs.push(("status", "current".to_string()));
        pairs.push(("page", page.to_string()));
        pairs
    }
}

/// One page of bookings for one location.
///
/// Implemented by [`BookingApiClient`]; tests plug in canned sources.
pub trait BookingSource: Send + Sync {
    fn fetch_page(&self, location_id: &str, query: &BookingQuery, page: u32) -> Result<BookingPage>;
}

// ---------------------------------------------------------------------------
// BookingApiClient
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the upstream booking system.
pub struct BookingApiClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl BookingApiClient {
    pub fn new(settings: &BookingApiSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            DashboardError::InvalidArgument(format!(
                "booking_api.base_url '{}': {}",
                settings.base_url, e
            ))
        })?;
        let client = Client::builder()
            .timeout(settings.timeout())
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("chain-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    /// `{base}/restaurants/{id}/bookings`, with the id percent-encoded as a
    /// single path segment.
    fn bookings_url(&self, location_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DashboardError::InvalidArgument(format!(
                    "booking_api.base_url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["restaurants", location_id, "bookings"]);
        Ok(url)
    }
}

impl BookingSource for BookingApiClient {
    fn fetch_page(&self, location_id: &str, query: &BookingQuery, page: u32) -> Result<BookingPage> {
        let url = self.bookings_url(location_id)?;
        debug!(location = location_id, page, "fetching bookings");

        let resp = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .query(&query.query_pairs(page))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: ApiBookingPage = resp.json()?;
        Ok(body.into_page(location_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BookingApiClient {
        let settings = BookingApiSettings {
            base_url: base.to_string(),
            ..Default::default()
        };
        BookingApiClient::new(&settings).unwrap()
    }

    #[test]
    fn bookings_url_appends_segments() {
        let c = client("https://api.example.com/api/v1/");
        assert_eq!(
            c.bookings_url("12").unwrap().as_str(),
            "https://api.example.com/api/v1/restaurants/12/bookings"
        );
    }

    #[test]
    fn location_id_is_encoded_as_one_segment() {
        let c = client("https://api.example.com/api/v1");
        assert_eq!(
            c.bookings_url("a/b").unwrap().as_str(),
            "https://api.example.com/api/v1/restaurants/a%2Fb/bookings"
        );
    }

    #[test]
    fn day_and_range_queries_use_different_params() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let pairs = BookingQuery::Day(day).query_pairs(2);
        assert_eq!(pairs[0], ("date", "2024-05-01".to_string()));
        assert_eq!(pairs[2], ("page", "2".to_string()));

        let range = DateRange::parse("2024-05-01", "2024-05-05").unwrap();
        let pairs = BookingQuery::Range(range).query_pairs(1);
        assert_eq!(pairs[0], ("from", "2024-05-01".to_string()));
        assert_eq!(pairs[1], ("to", "2024-05-05".to_string()));
        assert_eq!(pairs[2], ("status", "current".to_string()));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let settings = BookingApiSettings {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(BookingApiClient::new(&settings).is_err());
    }
}
