use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid metric '{0}'")]
    InvalidMetric(String),

    #[error("unknown quick period '{0}'")]
    UnknownPeriod(String),

    #[error("date out of supported range")]
    OutOfRange,
}

pub type Result<T> = std::result::Result<T, StatsError>;
