use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp, fmt, time::Duration};
use tokio::time::Instant;

use crate::models::{CropLabel, HealthStatus, RecognitionEvent};

pub const DEFAULT_DURATION_MS: u64 = 10_000;
pub const DEFAULT_INTERVAL_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum FlightStatus {
    #[default]
    Idle,
    Running,
}

/// What the recogniser currently reports: nothing yet, or the last crop seen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", content = "crop", rename_all = "camelCase")]
pub enum Prediction {
    #[default]
    Awaiting,
    Crop(CropLabel),
}

impl Prediction {
    pub fn crop(&self) -> Option<CropLabel> {
        match self {
            Prediction::Awaiting => None,
            Prediction::Crop(label) => Some(*label),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Awaiting => f.write_str("Awaiting..."),
            Prediction::Crop(label) => f.write_str(label.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The flight duration ran out.
    Elapsed,
    /// `stop` was called before the duration ran out.
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightTiming {
    pub duration_ms: u64,
    pub interval_ms: u64,
}

impl Default for FlightTiming {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl FlightTiming {
    pub fn new(duration_ms: u64, interval_ms: u64) -> Self {
        Self {
            duration_ms,
            interval_ms,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_ms == 0 {
            bail!("duration_ms must be greater than zero");
        }
        if self.interval_ms == 0 {
            bail!("interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightState {
    pub status: FlightStatus,
    pub flight_id: Option<String>,
    pub prediction: Prediction,
    pub log: Vec<RecognitionEvent>,
    pub timing: FlightTiming,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub stop_reason: Option<StopReason>,
    /// Monotonic start of the current run; log offsets are measured from it.
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl Default for FlightState {
    fn default() -> Self {
        Self {
            status: FlightStatus::Idle,
            flight_id: None,
            prediction: Prediction::Awaiting,
            log: Vec::new(),
            timing: FlightTiming::default(),
            started_at: None,
            stopped_at: None,
            stop_reason: None,
            running_anchor: None,
        }
    }
}

impl FlightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == FlightStatus::Running
    }

    /// True while `flight_id` is the run in progress. Driver tasks use this
    /// to drop work that belongs to a run that has already ended.
    pub fn is_running_flight(&self, flight_id: &str) -> bool {
        self.is_running() && self.flight_id.as_deref() == Some(flight_id)
    }

    pub fn elapsed_ms(&self) -> u64 {
        match (self.status, self.running_anchor) {
            (FlightStatus::Running, Some(anchor)) => anchor.elapsed().as_millis() as u64,
            _ => 0,
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        match self.status {
            FlightStatus::Idle => 0,
            FlightStatus::Running => {
                let remaining = self.timing.duration_ms as i64 - self.elapsed_ms() as i64;
                cmp::max(remaining, 0) as u64
            }
        }
    }

    pub fn begin_flight(
        &mut self,
        flight_id: String,
        timing: FlightTiming,
        start_at: DateTime<Utc>,
        now: Instant,
    ) {
        *self = Self {
            status: FlightStatus::Running,
            flight_id: Some(flight_id),
            prediction: Prediction::Awaiting,
            log: Vec::new(),
            timing,
            started_at: Some(start_at),
            stopped_at: None,
            stop_reason: None,
            running_anchor: Some(now),
        };
    }

    /// Appends a sampled recognition and makes its crop the current
    /// prediction. Returns `None` when no flight is running.
    pub fn record(
        &mut self,
        crop: CropLabel,
        status: HealthStatus,
        now: Instant,
    ) -> Option<RecognitionEvent> {
        if !self.is_running() {
            return None;
        }

        let offset_ms = self
            .running_anchor
            .map(|anchor| now.saturating_duration_since(anchor).as_millis() as u64)
            .unwrap_or(0);

        let event = RecognitionEvent {
            sequence: self.log.len() + 1,
            crop,
            status,
            offset_ms,
            recorded_at: Utc::now(),
        };
        self.log.push(event);
        self.prediction = Prediction::Crop(crop);
        Some(event)
    }

    /// Moves back to idle. Prediction and log keep their last values.
    pub fn finish(&mut self, reason: StopReason, stopped_at: DateTime<Utc>) {
        self.status = FlightStatus::Idle;
        self.stopped_at = Some(stopped_at);
        self.stop_reason = Some(reason);
        self.running_anchor = None;
    }
}
