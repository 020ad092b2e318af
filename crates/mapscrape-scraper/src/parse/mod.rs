//! Pure parsers for listing text, plus the hours widget reader.

pub mod address;
pub mod coords;
pub mod hours;

pub use address::parse_address_parts;
pub use coords::parse_coordinates;
pub use hours::{normalize_hours_text, parse_weekly_hours, week_hours_from_rows};
