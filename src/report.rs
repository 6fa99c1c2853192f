use serde::Serialize;
use tracing::debug;

use crate::anomaly::AnomalyRecord;
use crate::math::RobustStats;
use crate::trend::Trend;

/// Summary statistics and directions of both metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendStats {
    pub viewer_median: f64,
    pub viewer_mad: f64,
    pub viewer_avg: f64,
    pub viewer_trend: Trend,
    pub chat_avg: f64,
    pub chat_std_dev: f64,
    pub chat_trend: Trend,
}

impl TrendStats {
    /// Combine per-metric statistics; a missing metric reports zeros.
    pub fn new(
        viewer: Option<&RobustStats>,
        viewer_trend: Trend,
        chat: Option<&RobustStats>,
        chat_trend: Trend,
    ) -> Self {
        let viewer = viewer.copied().unwrap_or_default();
        let chat = chat.copied().unwrap_or_default();
        Self {
            viewer_median: viewer.median,
            viewer_mad: viewer.mad,
            viewer_avg: viewer.mean,
            viewer_trend,
            chat_avg: chat.mean,
            chat_std_dev: chat.stddev,
            chat_trend,
        }
    }
}

/// Everything the engine returns for one request.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub viewer_anomalies: Vec<AnomalyRecord>,
    pub chat_anomalies: Vec<AnomalyRecord>,
    pub trend_stats: TrendStats,
}

impl Report {
    pub fn assemble(
        viewer_anomalies: Vec<AnomalyRecord>,
        chat_anomalies: Vec<AnomalyRecord>,
        trend_stats: TrendStats,
    ) -> Self {
        debug!(
            viewer_anomalies = viewer_anomalies.len(),
            chat_anomalies = chat_anomalies.len(),
            viewer_trend = %trend_stats.viewer_trend,
            chat_trend = %trend_stats.chat_trend,
            "report assembled"
        );
        Self {
            viewer_anomalies,
            chat_anomalies,
            trend_stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.viewer_anomalies.is_empty() && self.chat_anomalies.is_empty()
    }
}
