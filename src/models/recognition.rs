use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CropLabel, HealthStatus};

/// One sampled recognition result. Entries are only ever appended to a
/// flight log, never edited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionEvent {
    /// 1-based position in the flight log.
    pub sequence: usize,
    pub crop: CropLabel,
    pub status: HealthStatus,
    /// Milliseconds since the flight started.
    pub offset_ms: u64,
    pub recorded_at: DateTime<Utc>,
}
