//! Half-vs-half trend classification.
//!
//! The change-point sequence is split at its midpoint index and the centers
//! of the two halves are compared against a multiple of the series spread.

use serde::{Deserialize, Serialize};

use crate::math;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl Trend {
    /// Classify `delta` against the `±limit` band.
    pub fn from_delta(delta: f64, limit: f64) -> Self {
        if delta > limit {
            Trend::Increasing
        } else if delta < -limit {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

/// How the center of each half is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Center {
    /// Viewer counts: robust, paired with MAD as spread.
    Median,
    /// Chat rate: classical, paired with standard deviation as spread.
    Mean,
}

impl Center {
    fn of(self, values: &[f64]) -> f64 {
        match self {
            Center::Median => math::median(values),
            Center::Mean => math::mean(values),
        }
    }
}

/// Classify the direction of `change_values` (baseline first).
///
/// Fewer than two genuine changes after the baseline is always `Stable`.
pub fn classify(change_values: &[f64], center: Center, spread: f64, multiplier: f64) -> Trend {
    if change_values.len() < 3 {
        return Trend::Stable;
    }
    let (first, second) = change_values.split_at(change_values.len() / 2);
    let delta = center.of(second) - center.of(first);
    Trend::from_delta(delta, multiplier * spread)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_samples_are_stable() {
        assert_eq!(classify(&[50., 90.], Center::Median, 20., 1.5), Trend::Stable);
        assert_eq!(classify(&[], Center::Median, 0., 1.5), Trend::Stable);
    }

    #[test]
    fn rising_series() {
        // halves [100, 110] / [300, 320, 310]
        let values = [100., 110., 300., 320., 310.];
        assert_eq!(classify(&values, Center::Median, 10., 1.5), Trend::Increasing);
    }

    #[test]
    fn falling_series_with_mean() {
        let values = [40., 38., 10., 12.];
        assert_eq!(classify(&values, Center::Mean, 5., 1.5), Trend::Decreasing);
    }

    #[test]
    fn within_band_is_stable() {
        let values = [100., 102., 101., 103.];
        assert_eq!(classify(&values, Center::Median, 2., 1.5), Trend::Stable);
    }

    #[test]
    fn band_is_symmetric() {
        assert_eq!(Trend::from_delta(3.0, 3.0), Trend::Stable);
        assert_eq!(Trend::from_delta(-3.0, 3.0), Trend::Stable);
        assert_eq!(Trend::from_delta(3.1, 3.0), Trend::Increasing);
        assert_eq!(Trend::from_delta(-3.1, 3.0), Trend::Decreasing);
    }

    #[test]
    fn zero_spread_any_move_counts() {
        assert_eq!(classify(&[5., 5., 6.], Center::Median, 0., 1.5), Trend::Increasing);
    }
}
