//! Anomaly and trend detection over live-stream viewer and chat series.
//!
//! The engine is a pure function over in-memory time series: it removes
//! repeated polls, computes robust statistics, flags significant spikes and
//! drops with stream context, and classifies the overall direction of each
//! metric. See [`detector`] for the pipeline.

pub mod anomaly;
pub mod config;
pub mod detector;
pub mod error;
pub mod math;
pub mod phase;
pub mod report;
pub mod sample;
pub mod series;
pub mod source;
pub mod timestamp;
pub mod trend;

pub use anomaly::AnomalyRecord;
pub use config::{DEFAULT_Z_THRESHOLD, DetectorConfig};
pub use detector::{AnomalyDetector, DetectQuery, analyze};
pub use error::{Error, Result};
pub use math::RobustStats;
pub use phase::StreamPhase;
pub use report::{Report, TrendStats};
pub use sample::{Sample, StatsRecord, StreamBounds, TimeWindow};
pub use source::{MemorySource, SeriesSource};
pub use trend::Trend;
