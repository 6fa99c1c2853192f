//! Request boundary of the engine.
//!
//! [`AnomalyDetector::detect`] pulls records for a channel (or one of its
//! streams) from a [`SeriesSource`], and [`analyze`] runs the pure pipeline:
//!
//! 1. **preprocess** – drop invalid readings, collapse repeated polls
//! 2. **statistics** – median/MAD over viewer change points, mean/stddev
//!    over all valid chat samples
//! 3. **classify** – score and rank change points of both metrics
//! 4. **trend** – half-vs-half comparison of the change points
//! 5. **assemble** – merge into one [`Report`]
//!
//! ```rust
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use stream_anomaly::{AnomalyDetector, DetectQuery, MemorySource, StatsRecord, StreamBounds};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
//! let records = (0..7).map(|i| {
//!     let viewers = [10., 10., 10., 50., 50., 12., 12.][i];
//!     let ts = (t0 + TimeDelta::minutes(i as i64)).to_rfc3339();
//!     StatsRecord::new(ts, Some(viewers), Some(3.))
//! });
//! let source = MemorySource::new().with_stream(1, 7, StreamBounds::new(t0, None), records);
//!
//! let query = DetectQuery::new(1, t0, t0 + TimeDelta::hours(1)).with_stream(7);
//! let report = AnomalyDetector::default().detect(&source, &query).unwrap();
//! assert_eq!(report.viewer_anomalies.len(), 1);
//! assert!(report.chat_anomalies.is_empty());
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::anomaly::{Classifier, Scoring};
use crate::config::{DEFAULT_Z_THRESHOLD, DetectorConfig, validate_threshold};
use crate::error::{Error, Result};
use crate::math::RobustStats;
use crate::report::{Report, TrendStats};
use crate::sample::{ParallelSeries, Sample, StreamBounds, TimeWindow};
use crate::series::{Metric, Series};
use crate::source::{ChannelId, SeriesSource, StreamId};
use crate::trend::{self, Center};

/// Parameters of one detection request.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectQuery {
    pub channel_id: ChannelId,
    /// Restrict to one session instead of aggregating the channel.
    pub stream_id: Option<StreamId>,
    pub window: TimeWindow,
    pub z_threshold: f64,
}

impl DetectQuery {
    pub fn new(channel_id: ChannelId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            channel_id,
            stream_id: None,
            window: TimeWindow::new(start, end),
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
    pub fn with_stream(mut self, stream_id: StreamId) -> Self {
        self.stream_id = Some(stream_id);
        self
    }
    pub fn with_z_threshold(mut self, z_threshold: f64) -> Self {
        self.z_threshold = z_threshold;
        self
    }
}

/// Stateless detector holding only its validated configuration.
#[derive(Clone, Debug, Default)]
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn detect<S>(&self, source: &S, query: &DetectQuery) -> Result<Report>
    where
        S: SeriesSource + ?Sized,
    {
        validate_threshold(query.z_threshold)?;
        if query.window.start > query.window.end {
            return Err(Error::InvalidWindow {
                start: query.window.start,
                end: query.window.end,
            });
        }
        let records = source.stats(query.channel_id, query.stream_id);
        let series =
            ParallelSeries::from_records(&records, &query.window, self.config.min_valid_timestamp);
        let bounds = query
            .stream_id
            .and_then(|id| source.stream_bounds(query.channel_id, id));
        debug!(
            channel_id = query.channel_id,
            stream_id = ?query.stream_id,
            records = records.len(),
            malformed = series.malformed,
            viewer_samples = series.viewers.len(),
            chat_samples = series.chat.len(),
            "detecting anomalies"
        );
        analyze(
            &series.viewers,
            &series.chat,
            bounds,
            query.z_threshold,
            &self.config,
        )
    }
}

/// Run the full pipeline over chronologically ordered series.
///
/// Without `bounds` the stream is taken to span the first to the last valid
/// sample; an open end is closed at the last valid sample.
pub fn analyze(
    viewers: &[Sample],
    chat: &[Sample],
    bounds: Option<StreamBounds>,
    z_threshold: f64,
    config: &DetectorConfig,
) -> Result<Report> {
    validate_threshold(z_threshold)?;
    config.validate()?;

    let viewers = Series::preprocess(viewers, Metric::Viewers);
    let chat = Series::preprocess(chat, Metric::ChatRate);

    let first = earliest(&viewers, &chat);
    let last = latest(&viewers, &chat);
    let (Some(first), Some(last)) = (first, last) else {
        return Ok(Report::default());
    };
    let bounds = bounds
        .unwrap_or(StreamBounds::new(first, Some(last)))
        .closed(last);

    let viewer_stats = RobustStats::from_values(&viewers.change_values());
    let chat_stats = RobustStats::from_values(&chat.valid_values());
    debug!(
        viewer_change_points = viewers.change_points.len(),
        chat_change_points = chat.change_points.len(),
        viewer_mad = viewer_stats.map(|s| s.mad),
        chat_stddev = chat_stats.map(|s| s.stddev),
        "series preprocessed"
    );

    let classify = |stats: Option<&RobustStats>, scoring, series: &Series| {
        stats
            .map(|stats| {
                Classifier::new(stats, scoring, &bounds, z_threshold, config)
                    .classify(&series.change_points)
            })
            .unwrap_or_default()
    };
    let viewer_anomalies = classify(viewer_stats.as_ref(), Scoring::Robust, &viewers);
    let chat_anomalies = classify(chat_stats.as_ref(), Scoring::Classical, &chat);

    let viewer_trend = trend::classify(
        &viewers.change_values(),
        Center::Median,
        viewer_stats.map_or(0.0, |s| s.mad),
        config.trend_spread_multiplier,
    );
    let chat_trend = trend::classify(
        &chat.change_values(),
        Center::Mean,
        chat_stats.map_or(0.0, |s| s.stddev),
        config.trend_spread_multiplier,
    );

    Ok(Report::assemble(
        viewer_anomalies,
        chat_anomalies,
        TrendStats::new(
            viewer_stats.as_ref(),
            viewer_trend,
            chat_stats.as_ref(),
            chat_trend,
        ),
    ))
}

fn earliest(a: &Series, b: &Series) -> Option<DateTime<Utc>> {
    let first = |s: &Series| s.valid.first().map(|s| s.timestamp);
    match (first(a), first(b)) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

fn latest(a: &Series, b: &Series) -> Option<DateTime<Utc>> {
    let last = |s: &Series| s.valid.last().map(|s| s.timestamp);
    match (last(a), last(b)) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    }
}
