use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Caller contract violations rejected before any computation.
///
/// Data problems (empty series, malformed timestamps, flat series) are not
/// errors; they simply yield fewer or no anomalies.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("z threshold must be finite and positive, got {value}")]
    InvalidThreshold { value: f64 },
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    #[error("window start {start} is after window end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
