pub mod booking;
pub mod guests;
pub mod metric;

pub use booking::*;
pub use guests::*;
pub use metric::*;
