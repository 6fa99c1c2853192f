use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sample::ClosedBounds;

/// Which third of the stream a timestamp falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamPhase {
    Early,
    Mid,
    Late,
}

impl StreamPhase {
    pub fn from_position(relative_position: f64) -> Self {
        if relative_position < 1.0 / 3.0 {
            StreamPhase::Early
        } else if relative_position < 2.0 / 3.0 {
            StreamPhase::Mid
        } else {
            StreamPhase::Late
        }
    }

    pub fn at(bounds: &ClosedBounds, ts: DateTime<Utc>) -> Self {
        Self::from_position(bounds.relative_position(ts))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamPhase::Early => "early",
            StreamPhase::Mid => "mid",
            StreamPhase::Late => "late",
        }
    }
}

impl std::fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
