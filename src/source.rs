use std::collections::BTreeMap;

use crate::sample::{StatsRecord, StreamBounds};

pub type ChannelId = i64;
pub type StreamId = i64;

/// Time-series store the detector reads from.
///
/// Implementations only look records up; window filtering, timestamp
/// validation and ordering are done by the detector.
pub trait SeriesSource {
    /// Records of one stream, or of every stream of the channel when
    /// `stream_id` is `None`. Unknown ids yield an empty list.
    fn stats(&self, channel_id: ChannelId, stream_id: Option<StreamId>) -> Vec<StatsRecord>;

    /// Session bounds for a single stream, if the store knows them.
    fn stream_bounds(&self, channel_id: ChannelId, stream_id: StreamId) -> Option<StreamBounds>;
}

#[derive(Clone, Debug)]
struct StoredStream {
    bounds: StreamBounds,
    records: Vec<StatsRecord>,
}

/// In-memory store keyed by channel and stream.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    streams: BTreeMap<(ChannelId, StreamId), StoredStream>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_stream(
        &mut self,
        channel_id: ChannelId,
        stream_id: StreamId,
        bounds: StreamBounds,
    ) {
        self.streams
            .entry((channel_id, stream_id))
            .and_modify(|s| s.bounds = bounds)
            .or_insert(StoredStream {
                bounds,
                records: Vec::new(),
            });
    }

    /// Append records to a stream previously registered with `insert_stream`.
    /// Returns `false` when the stream is unknown.
    pub fn push_records<I>(
        &mut self,
        channel_id: ChannelId,
        stream_id: StreamId,
        records: I,
    ) -> bool
    where
        I: IntoIterator<Item = StatsRecord>,
    {
        match self.streams.get_mut(&(channel_id, stream_id)) {
            Some(stream) => {
                stream.records.extend(records);
                true
            }
            None => false,
        }
    }

    pub fn with_stream<I>(
        mut self,
        channel_id: ChannelId,
        stream_id: StreamId,
        bounds: StreamBounds,
        records: I,
    ) -> Self
    where
        I: IntoIterator<Item = StatsRecord>,
    {
        self.insert_stream(channel_id, stream_id, bounds);
        self.push_records(channel_id, stream_id, records);
        self
    }
}

impl SeriesSource for MemorySource {
    fn stats(&self, channel_id: ChannelId, stream_id: Option<StreamId>) -> Vec<StatsRecord> {
        self.streams
            .iter()
            .filter(|((c, s), _)| *c == channel_id && stream_id.is_none_or(|id| id == *s))
            .flat_map(|(_, stream)| stream.records.iter().cloned())
            .collect()
    }

    fn stream_bounds(&self, channel_id: ChannelId, stream_id: StreamId) -> Option<StreamBounds> {
        self.streams.get(&(channel_id, stream_id)).map(|s| s.bounds)
    }
}
