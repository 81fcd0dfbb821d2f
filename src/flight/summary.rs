use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CropLabel, RecognitionEvent};

use super::{FlightState, StopReason};

/// Totals over one flight log, sent along with the completion event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    pub flight_id: Option<String>,
    pub reason: Option<StopReason>,
    pub total: usize,
    pub infected: usize,
    pub by_crop: BTreeMap<CropLabel, usize>,
}

impl FlightSummary {
    pub fn from_log(log: &[RecognitionEvent]) -> Self {
        let mut by_crop = BTreeMap::new();
        let mut infected = 0;
        for event in log {
            *by_crop.entry(event.crop).or_insert(0) += 1;
            if event.status.is_infected() {
                infected += 1;
            }
        }

        Self {
            flight_id: None,
            reason: None,
            total: log.len(),
            infected,
            by_crop,
        }
    }

    pub fn healthy(&self) -> usize {
        self.total - self.infected
    }
}

impl From<&FlightState> for FlightSummary {
    fn from(state: &FlightState) -> Self {
        Self {
            flight_id: state.flight_id.clone(),
            reason: state.stop_reason,
            ..Self::from_log(&state.log)
        }
    }
}
