//! Polling-artifact removal.
//!
//! Platforms cache viewer counts, so consecutive polls often repeat the same
//! reading. Only genuine value changes carry information about the stream.

use crate::sample::Sample;

/// Which readings count as valid for a metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Raw viewer counts: zero readings are platform glitches and dropped.
    Viewers,
    /// Chat messages per minute: zero is a legitimate quiet minute.
    ChatRate,
}

impl Metric {
    pub fn accepts(self, value: f64) -> bool {
        value.is_finite()
            && match self {
                Metric::Viewers => value > 0.0,
                Metric::ChatRate => value >= 0.0,
            }
    }
}

/// Output of the preprocessor for one metric.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    /// Every accepted sample, chronological.
    pub valid: Vec<Sample>,
    /// First accepted sample followed by each sample whose value differs
    /// from the previously retained one.
    pub change_points: Vec<Sample>,
}

impl Series {
    /// Filter and de-duplicate a chronologically ordered sample sequence.
    pub fn preprocess(samples: &[Sample], metric: Metric) -> Self {
        debug_assert!(
            samples.is_sorted_by_key(|s| s.timestamp),
            "samples must be sorted chronologically"
        );
        let valid: Vec<Sample> = samples
            .iter()
            .copied()
            .filter(|s| metric.accepts(s.value))
            .collect();
        let change_points = dedup(&valid);
        Self {
            valid,
            change_points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    pub fn valid_values(&self) -> Vec<f64> {
        self.valid.iter().map(|s| s.value).collect()
    }

    pub fn change_values(&self) -> Vec<f64> {
        self.change_points.iter().map(|s| s.value).collect()
    }

    /// Number of genuine changes, the baseline sample excluded.
    pub fn change_count(&self) -> usize {
        self.change_points.len().saturating_sub(1)
    }
}

pub fn dedup(samples: &[Sample]) -> Vec<Sample> {
    let mut retained: Vec<Sample> = Vec::with_capacity(samples.len());
    for sample in samples {
        match retained.last() {
            Some(last) if last.value == sample.value => {}
            _ => retained.push(*sample),
        }
    }
    retained
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn series(values: &[f64]) -> Vec<Sample> {
        let t0: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(t0 + TimeDelta::minutes(i as i64), *v))
            .collect()
    }

    #[test]
    fn collapses_repeated_polls() {
        let s = Series::preprocess(&series(&[10., 10., 10., 50., 50., 12., 12.]), Metric::Viewers);
        assert_eq!(s.valid.len(), 7);
        assert_eq!(s.change_values(), vec![10., 50., 12.]);
        assert_eq!(s.change_points[1].timestamp, series(&[0.; 4])[3].timestamp);
        assert_eq!(s.change_count(), 2);
    }

    #[test]
    fn zero_viewers_dropped_before_dedup() {
        // the 0 glitch must not split the run of 20s into two change points
        let s = Series::preprocess(&series(&[20., 0., 20., 30.]), Metric::Viewers);
        assert_eq!(s.valid_values(), vec![20., 20., 30.]);
        assert_eq!(s.change_values(), vec![20., 30.]);
    }

    #[test]
    fn zero_chat_rate_kept() {
        let s = Series::preprocess(&series(&[0., 0., 5., -1., f64::NAN]), Metric::ChatRate);
        assert_eq!(s.valid_values(), vec![0., 0., 5.]);
        assert_eq!(s.change_values(), vec![0., 5.]);
    }

    #[test]
    fn empty_after_filtering_is_empty() {
        let s = Series::preprocess(&series(&[0., 0.]), Metric::Viewers);
        assert!(s.is_empty());
        assert!(s.change_points.is_empty());
        assert_eq!(s.change_count(), 0);
    }

    #[test]
    #[should_panic(expected = "sorted chronologically")]
    #[cfg(debug_assertions)]
    fn unsorted_input_fails_loudly() {
        let mut samples = series(&[1., 2., 3.]);
        samples.reverse();
        Series::preprocess(&samples, Metric::Viewers);
    }
}
