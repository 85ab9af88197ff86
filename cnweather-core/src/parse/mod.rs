//! Pure parsers, one per provider endpoint shape. None of them perform I/O.

pub mod forecast;
pub mod hourly;
pub mod realtime;
mod script;

pub use forecast::{ForecastPage, parse_fifteen_day, parse_seven_day};
pub use hourly::{HourlyPage, parse_hourly};
pub use realtime::parse_real_time;
