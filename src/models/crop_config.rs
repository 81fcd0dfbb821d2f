use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CropLabel;

/// Which crops the recogniser is allowed to report.
///
/// Labels missing from the map count as disabled, so an empty config is a
/// valid "nothing enabled" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropConfig {
    flags: BTreeMap<CropLabel, bool>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self::from_enabled([CropLabel::Wheat, CropLabel::Corn, CropLabel::Barley])
    }
}

impl CropConfig {
    /// Every crop present and disabled.
    pub fn none() -> Self {
        Self {
            flags: CropLabel::ALL.into_iter().map(|label| (label, false)).collect(),
        }
    }

    pub fn all() -> Self {
        Self::from_enabled(CropLabel::ALL)
    }

    pub fn from_enabled(enabled: impl IntoIterator<Item = CropLabel>) -> Self {
        let mut config = Self::none();
        for label in enabled {
            config.set(label, true);
        }
        config
    }

    pub fn is_enabled(&self, label: CropLabel) -> bool {
        self.flags.get(&label).copied().unwrap_or(false)
    }

    pub fn set(&mut self, label: CropLabel, enabled: bool) {
        self.flags.insert(label, enabled);
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&mut self, label: CropLabel) -> bool {
        let enabled = !self.is_enabled(label);
        self.set(label, enabled);
        enabled
    }

    /// Enabled crops in canonical order.
    pub fn enabled(&self) -> Vec<CropLabel> {
        CropLabel::ALL
            .into_iter()
            .filter(|label| self.is_enabled(*label))
            .collect()
    }

    pub fn has_enabled(&self) -> bool {
        self.flags.values().any(|enabled| *enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CropLabel, bool)> + '_ {
        CropLabel::ALL
            .into_iter()
            .map(move |label| (label, self.is_enabled(label)))
    }
}

impl FromIterator<(CropLabel, bool)> for CropConfig {
    fn from_iter<T: IntoIterator<Item = (CropLabel, bool)>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}
