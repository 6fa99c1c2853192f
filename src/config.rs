use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::timestamp;

/// Threshold applied to `|score|` when the caller does not pick one.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Tunable constants of the detector.
///
/// The z threshold itself is a per-call argument, not part of the config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Changes closer than this to the previous change point get a stricter threshold.
    pub short_gap_secs: i64,
    pub short_gap_multiplier: f64,
    /// Leading fraction of the stream excluded from candidacy.
    pub warmup_fraction: f64,
    /// Cap on anomalies reported per series.
    pub max_anomalies: usize,
    /// Half-vs-half delta must exceed this many spreads to count as a trend.
    pub trend_spread_multiplier: f64,
    pub min_valid_timestamp: DateTime<Utc>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            short_gap_secs: 5 * 60,
            short_gap_multiplier: 1.5,
            warmup_fraction: 0.1,
            max_anomalies: 50,
            trend_spread_multiplier: 1.5,
            min_valid_timestamp: timestamp::default_min_valid(),
        }
    }
}

impl DetectorConfig {
    pub fn with_short_gap(mut self, secs: i64, multiplier: f64) -> Self {
        self.short_gap_secs = secs;
        self.short_gap_multiplier = multiplier;
        self
    }
    pub fn with_warmup_fraction(mut self, fraction: f64) -> Self {
        self.warmup_fraction = fraction;
        self
    }
    pub fn with_max_anomalies(mut self, max: usize) -> Self {
        self.max_anomalies = max;
        self
    }
    pub fn with_trend_spread_multiplier(mut self, multiplier: f64) -> Self {
        self.trend_spread_multiplier = multiplier;
        self
    }
    pub fn with_min_valid_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.min_valid_timestamp = ts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.short_gap_secs < 0 {
            return Err(invalid("short_gap_secs", "must not be negative"));
        }
        if !(self.short_gap_multiplier.is_finite() && self.short_gap_multiplier >= 1.0) {
            return Err(invalid("short_gap_multiplier", "must be finite and >= 1"));
        }
        if !(0.0..1.0).contains(&self.warmup_fraction) {
            return Err(invalid("warmup_fraction", "must be in [0, 1)"));
        }
        if self.max_anomalies == 0 {
            return Err(invalid("max_anomalies", "must be at least 1"));
        }
        if !(self.trend_spread_multiplier.is_finite() && self.trend_spread_multiplier >= 0.0) {
            return Err(invalid("trend_spread_multiplier", "must be finite and >= 0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> Error {
    Error::InvalidConfig {
        field,
        reason: reason.to_owned(),
    }
}

/// Reject thresholds that would make every or no change qualify.
pub fn validate_threshold(z_threshold: f64) -> Result<()> {
    if z_threshold.is_finite() && z_threshold > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidThreshold { value: z_threshold })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let config = DetectorConfig::default();
        assert_eq!(config.short_gap_secs, 300);
        assert_eq!(config.short_gap_multiplier, 1.5);
        assert_eq!(config.warmup_fraction, 0.1);
        assert_eq!(config.max_anomalies, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"max_anomalies": 10}"#).unwrap();
        assert_eq!(config.max_anomalies, 10);
        assert_eq!(config.short_gap_secs, 300);
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let bad = DetectorConfig::default().with_warmup_fraction(1.0);
        assert!(matches!(
            bad.validate(),
            Err(Error::InvalidConfig { field: "warmup_fraction", .. })
        ));
        let bad = DetectorConfig::default().with_short_gap(60, 0.5);
        assert!(bad.validate().is_err());
        let bad = DetectorConfig::default().with_max_anomalies(0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn threshold_must_be_positive_and_finite() {
        assert!(validate_threshold(3.0).is_ok());
        assert_eq!(validate_threshold(0.0), Err(Error::InvalidThreshold { value: 0.0 }));
        assert!(validate_threshold(f64::NAN).is_err());
        assert!(validate_threshold(f64::INFINITY).is_err());
    }
}
