use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// One validated reading on the numeric time axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A row as a time-series store supplies it: one poll carrying both the
/// viewer count and the chat rate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub collected_at: String,
    pub viewer_count: Option<f64>,
    pub chat_rate: Option<f64>,
}

impl StatsRecord {
    pub fn new(
        collected_at: impl Into<String>,
        viewer_count: Option<f64>,
        chat_rate: Option<f64>,
    ) -> Self {
        Self {
            collected_at: collected_at.into(),
            viewer_count,
            chat_rate,
        }
    }
}

/// Viewer and chat series split out of a batch of records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParallelSeries {
    pub viewers: Vec<Sample>,
    pub chat: Vec<Sample>,
    /// Records dropped for an unparseable or too-early timestamp.
    pub malformed: usize,
}

impl ParallelSeries {
    /// Parse `records`, keep those inside `window`, and sort chronologically.
    ///
    /// Values are carried through untouched (nulls become absent samples);
    /// value-level filtering belongs to the preprocessor.
    pub fn from_records(
        records: &[StatsRecord],
        window: &TimeWindow,
        min_valid: DateTime<Utc>,
    ) -> Self {
        let mut series = Self::default();
        let mut parsed: Vec<(DateTime<Utc>, &StatsRecord)> = Vec::with_capacity(records.len());
        for record in records {
            match timestamp::parse_valid(&record.collected_at, min_valid) {
                Some(ts) if window.contains(ts) => parsed.push((ts, record)),
                Some(_) => {}
                None => series.malformed += 1,
            }
        }
        parsed.sort_by_key(|(ts, _)| *ts);
        for (ts, record) in parsed {
            if let Some(v) = record.viewer_count {
                series.viewers.push(Sample::new(ts, v));
            }
            if let Some(v) = record.chat_rate {
                series.chat.push(Sample::new(ts, v));
            }
        }
        series
    }
}

/// Inclusive time range that bounds which samples are considered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Start and (possibly open) end of a broadcast session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamBounds {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl StreamBounds {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Close an open end at `last_seen`, the latest observed sample.
    pub fn closed(self, last_seen: DateTime<Utc>) -> ClosedBounds {
        let end = self.end.unwrap_or(last_seen).max(self.start);
        ClosedBounds {
            start: self.start,
            end,
        }
    }
}

/// Stream bounds with a concrete end, as used for relative positioning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosedBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ClosedBounds {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Seconds elapsed since stream start (negative before it).
    pub fn elapsed_secs(&self, ts: DateTime<Utc>) -> f64 {
        secs(ts - self.start)
    }

    /// Position of `ts` within the stream, clamped to `[0, 1]`.
    ///
    /// A zero-length stream places every instant at `0`.
    pub fn relative_position(&self, ts: DateTime<Utc>) -> f64 {
        let total = secs(self.duration());
        if total <= 0.0 {
            return 0.0;
        }
        (self.elapsed_secs(ts) / total).clamp(0.0, 1.0)
    }

    /// Whole minutes since stream start, floored.
    pub fn minutes_from_start(&self, ts: DateTime<Utc>) -> i64 {
        (self.elapsed_secs(ts) / 60.0).floor() as i64
    }
}

pub(crate) fn secs(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(min: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + TimeDelta::minutes(min)
    }

    #[test]
    fn records_split_sorted_and_windowed() {
        let records = vec![
            StatsRecord::new("2024-05-01 12:02:00", Some(30.0), Some(4.0)),
            StatsRecord::new("2024-05-01 12:00:00", Some(10.0), None),
            StatsRecord::new("not a time", Some(99.0), Some(99.0)),
            StatsRecord::new("2024-05-01 13:00:00", Some(50.0), Some(1.0)),
        ];
        let window = TimeWindow::new(at(0), at(10));
        let min_valid = crate::timestamp::default_min_valid();
        let series = ParallelSeries::from_records(&records, &window, min_valid);
        assert_eq!(series.malformed, 1);
        assert_eq!(
            series.viewers,
            vec![Sample::new(at(0), 10.0), Sample::new(at(2), 30.0)]
        );
        assert_eq!(series.chat, vec![Sample::new(at(2), 4.0)]);
    }

    #[test]
    fn open_end_closes_at_last_seen() {
        let bounds = StreamBounds::new(at(0), None).closed(at(30));
        assert_eq!(bounds.end, at(30));
        assert_eq!(bounds.relative_position(at(15)), 0.5);
        assert_eq!(bounds.relative_position(at(60)), 1.0);
        assert_eq!(bounds.relative_position(at(-5)), 0.0);
    }

    #[test]
    fn zero_length_stream_is_position_zero() {
        let bounds = StreamBounds::new(at(5), Some(at(5))).closed(at(5));
        assert_eq!(bounds.relative_position(at(5)), 0.0);
    }

    #[test]
    fn minutes_are_floored() {
        let bounds = StreamBounds::new(at(0), Some(at(10))).closed(at(10));
        assert_eq!(bounds.minutes_from_start(at(3) + TimeDelta::seconds(59)), 3);
        assert_eq!(bounds.minutes_from_start(at(-1) + TimeDelta::seconds(30)), -1);
    }
}
