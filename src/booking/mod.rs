//! Upstream booking system: HTTP client, outbound pacing and the live
//! multi-location guest scan.

pub mod client;
pub mod pacer;
pub mod scanner;

pub use client::{BookingApiClient, BookingQuery, BookingSource};
pub use pacer::Pacer;
pub use scanner::LiveGuestScanner;
