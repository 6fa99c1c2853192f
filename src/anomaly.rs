//! Change-point anomaly classification.
//!
//! A single forward pass over the de-duplicated series scores every change
//! against the global statistics of its metric:
//!
//! 1. **threshold** – `|score| ≥ z`, tightened by `short_gap_multiplier`
//!    when the change follows the previous one within `short_gap_secs`
//! 2. **warm-up** – changes in the leading `warmup_fraction` of the stream
//!    are never candidates (ramp-up is expected)
//! 3. **ranking** – the strongest `max_anomalies` by `|score|` are kept and
//!    returned in chronological order
//!
//! A flat series (zero spread) yields no anomalies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use crate::config::DetectorConfig;
use crate::math::RobustStats;
use crate::phase::StreamPhase;
use crate::sample::{ClosedBounds, Sample, secs};

/// One qualifying change, immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub previous_value: f64,
    pub change_amount: f64,
    /// Percent change from the previous value; `None` when that was zero.
    pub change_rate: Option<f64>,
    pub modified_z_score: f64,
    pub is_positive: bool,
    pub minutes_from_stream_start: i64,
    pub stream_phase: StreamPhase,
}

/// Statistic a change is standardized with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scoring {
    /// `0.6745 × (x − median) / mad`
    Robust,
    /// `(x − mean) / stddev`
    Classical,
}

impl Scoring {
    fn score(self, stats: &RobustStats, x: f64) -> Option<f64> {
        let score = match self {
            Scoring::Robust => stats.modified_z_score(x),
            Scoring::Classical => stats.z_score(x),
        };
        score.filter(|z| z.is_finite())
    }

    fn spread(self, stats: &RobustStats) -> f64 {
        match self {
            Scoring::Robust => stats.mad,
            Scoring::Classical => stats.stddev,
        }
    }
}

/// Scans change points and emits ranked, annotated anomaly records.
#[derive(Clone, Copy, Debug)]
pub struct Classifier<'a> {
    stats: &'a RobustStats,
    scoring: Scoring,
    bounds: &'a ClosedBounds,
    z_threshold: f64,
    config: &'a DetectorConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(
        stats: &'a RobustStats,
        scoring: Scoring,
        bounds: &'a ClosedBounds,
        z_threshold: f64,
        config: &'a DetectorConfig,
    ) -> Self {
        Self {
            stats,
            scoring,
            bounds,
            z_threshold,
            config,
        }
    }

    /// Threshold for a change arriving `gap_secs` after the previous one.
    pub fn effective_threshold(&self, gap_secs: f64) -> f64 {
        if gap_secs < self.config.short_gap_secs as f64 {
            self.z_threshold * self.config.short_gap_multiplier
        } else {
            self.z_threshold
        }
    }

    fn in_warmup(&self, ts: DateTime<Utc>) -> bool {
        let warmup = secs(self.bounds.duration()) * self.config.warmup_fraction;
        self.bounds.elapsed_secs(ts) < warmup
    }

    pub fn classify(&self, change_points: &[Sample]) -> Vec<AnomalyRecord> {
        if self.scoring.spread(self.stats) <= 0.0 {
            return Vec::new();
        }
        let mut anomalies: Vec<AnomalyRecord> = change_points
            .windows(2)
            .filter_map(|pair| self.evaluate(&pair[0], &pair[1]))
            .collect();
        rank_and_truncate(&mut anomalies, self.config.max_anomalies);
        anomalies
    }

    fn evaluate(&self, prev: &Sample, cur: &Sample) -> Option<AnomalyRecord> {
        if self.in_warmup(cur.timestamp) {
            return None;
        }
        let score = self.scoring.score(self.stats, cur.value)?;
        let threshold = self.effective_threshold(secs(cur.timestamp - prev.timestamp));
        if !(score.abs() >= threshold) {
            return None;
        }
        let change_amount = cur.value - prev.value;
        let change_rate = (prev.value != 0.0).then(|| change_amount / prev.value * 100.0);
        trace!(
            timestamp = %cur.timestamp,
            value = cur.value,
            score,
            threshold,
            "change point qualifies"
        );
        Some(AnomalyRecord {
            timestamp: cur.timestamp,
            value: cur.value,
            previous_value: prev.value,
            change_amount,
            change_rate,
            modified_z_score: score,
            is_positive: change_amount > 0.0,
            minutes_from_stream_start: self.bounds.minutes_from_start(cur.timestamp),
            stream_phase: StreamPhase::at(self.bounds, cur.timestamp),
        })
    }
}

/// Keep the `max` strongest by `|score|`, then restore chronological order.
///
/// Ties on `|score|` keep the earlier anomaly.
pub fn rank_and_truncate(anomalies: &mut Vec<AnomalyRecord>, max: usize) {
    if anomalies.len() > max {
        anomalies.sort_by(|a, b| {
            let (a, b) = (a.modified_z_score.abs(), b.modified_z_score.abs());
            b.total_cmp(&a)
        });
        anomalies.truncate(max);
        anomalies.sort_by_key(|a| a.timestamp);
    }
}
