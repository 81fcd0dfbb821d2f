use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CropLabel {
    Wheat,
    Corn,
    Rice,
    Barley,
    Soy,
}

impl CropLabel {
    /// Every recognisable crop, in the order the view lists them.
    pub const ALL: [CropLabel; 5] = [
        CropLabel::Wheat,
        CropLabel::Corn,
        CropLabel::Rice,
        CropLabel::Barley,
        CropLabel::Soy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropLabel::Wheat => "Wheat",
            CropLabel::Corn => "Corn",
            CropLabel::Rice => "Rice",
            CropLabel::Barley => "Barley",
            CropLabel::Soy => "Soy",
        }
    }
}

impl fmt::Display for CropLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropLabel {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        CropLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| anyhow!("unknown crop label: {value}"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum HealthStatus {
    Healthy,
    Infected,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 2] = [HealthStatus::Healthy, HealthStatus::Infected];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Infected => "Infected",
        }
    }

    pub fn is_infected(&self) -> bool {
        matches!(self, HealthStatus::Infected)
    }

    /// Cell colour the results table uses for this status.
    pub fn color(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "green",
            HealthStatus::Infected => "red",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("wheat".parse::<CropLabel>().unwrap(), CropLabel::Wheat);
        assert_eq!(" BARLEY ".parse::<CropLabel>().unwrap(), CropLabel::Barley);
        assert!("oats".parse::<CropLabel>().is_err());
    }

    #[test]
    fn serializes_as_camel_case() {
        let json = serde_json::to_string(&CropLabel::Soy).unwrap();
        assert_eq!(json, "\"soy\"");
        let status: HealthStatus = serde_json::from_str("\"infected\"").unwrap();
        assert!(status.is_infected());
        assert_eq!(status.color(), "red");
    }
}
