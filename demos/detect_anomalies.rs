use chrono::{DateTime, Utc};
use stream_anomaly::{
    AnomalyDetector, DetectQuery, MemorySource, StatsRecord, StreamBounds, timestamp,
};
use tracing_subscriber::EnvFilter;

const CHANNEL: i64 = 1;
const STREAM: i64 = 1;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let file = std::fs::File::open("demos/data/sample_stream.json")?;
    let records: Vec<StatsRecord> = serde_json::from_reader(file)?;
    let started_at: DateTime<Utc> = records
        .iter()
        .find_map(|r| timestamp::parse(&r.collected_at))
        .ok_or_else(|| anyhow::anyhow!("no parseable timestamps in sample data"))?;

    let source = MemorySource::new().with_stream(
        CHANNEL,
        STREAM,
        StreamBounds::new(started_at, None),
        records,
    );
    let z_threshold = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<f64>())
        .transpose()?
        .unwrap_or(stream_anomaly::DEFAULT_Z_THRESHOLD);
    let query = DetectQuery::new(CHANNEL, started_at, started_at + chrono::TimeDelta::days(1))
        .with_stream(STREAM)
        .with_z_threshold(z_threshold);

    let report = AnomalyDetector::default().detect(&source, &query)?;
    for (label, anomalies) in [
        ("viewers", &report.viewer_anomalies),
        ("chat", &report.chat_anomalies),
    ] {
        for a in anomalies {
            println!(
                "{label:>7} {:>4}m {:<5} {:>8.0} -> {:<8.0} z={:+.2}",
                a.minutes_from_stream_start,
                a.stream_phase.as_str(),
                a.previous_value,
                a.value,
                a.modified_z_score,
            );
        }
    }
    println!("{}", serde_json::to_string_pretty(&report.trend_stats)?);
    Ok(())
}
