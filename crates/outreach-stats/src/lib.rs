//! Aggregation pipeline for outreach history.
//!
//! Everything here is a pure function of the entry set it is handed (plus the
//! calendar offset used to decide which day, and so which week, an instant
//! falls in). Fetching lives in `outreach-source`, HTTP in `outreach-api`.

pub mod by_type;
pub mod chart;
pub mod compare;
pub mod csv;
pub mod error;
pub mod filter;
pub mod global;
pub mod paginate;
pub mod summary;
pub mod weekly;

pub use error::{Result, StatsError};

/// Percentage of `replied` over `total`, `0` for an empty group.
pub fn reply_rate(replied: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (replied as f64 / total as f64) * 100.0
}

/// Round to the single decimal shown on screen.
pub fn round_one(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(0.0)
}
