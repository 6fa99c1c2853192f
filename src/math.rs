use serde::Serialize;
use statrs::statistics::Statistics;

/// Consistency constant of the Modified Z-Score (Iglewicz & Hoaglin).
pub const MODIFIED_Z_FACTOR: f64 = 0.6745;

/// Central tendency and spread of one series, robust and classical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RobustStats {
    pub median: f64,
    pub mad: f64,
    pub mean: f64,
    pub stddev: f64,
}

impl RobustStats {
    /// `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let median = median(values);
        Some(Self {
            median,
            mad: mad(values, median),
            mean: mean(values),
            stddev: sample_stddev(values),
        })
    }

    /// `0.6745 × (x − median) / mad`, or `None` on a flat series.
    pub fn modified_z_score(&self, x: f64) -> Option<f64> {
        (self.mad > 0.0).then(|| MODIFIED_Z_FACTOR * (x - self.median) / self.mad)
    }

    /// `(x − mean) / stddev`, or `None` on a flat series.
    pub fn z_score(&self, x: f64) -> Option<f64> {
        (self.stddev > 0.0).then(|| (x - self.mean) / self.stddev)
    }
}

/// Middle of the sorted values; mean of the two middles for even length.
///
/// Panics on an empty slice.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        // midpoint without overflowing on values near f64::MAX
        sorted[mid - 1] + (sorted[mid] - sorted[mid - 1]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median of absolute deviations from `center`.
pub fn mad(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Sample standard deviation (`n − 1` denominator); `0` for a single value.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().std_dev()
}
