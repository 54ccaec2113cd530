//! Common geospatial types shared by the Silvia crates and services.

pub mod bbox;
pub mod crs;
pub mod time;

pub use bbox::{BboxParseError, BoundingBox};
pub use crs::{CrsCode, CrsParseError};
pub use time::{parse_date, today_iso, TimeParseError, TimeWindow, DATE_FORMAT};
