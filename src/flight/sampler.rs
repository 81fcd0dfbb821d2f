use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::{CropConfig, CropLabel, HealthStatus};

/// Stand-in for the on-board recogniser: draws a crop uniformly from the
/// enabled set and a status uniformly from all statuses.
pub struct RecognitionSampler {
    rng: StdRng,
}

impl RecognitionSampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `None` when the config has nothing enabled.
    pub fn sample(&mut self, config: &CropConfig) -> Option<(CropLabel, HealthStatus)> {
        let enabled = config.enabled();
        let crop = *enabled.choose(&mut self.rng)?;
        let status = *HealthStatus::ALL.choose(&mut self.rng)?;
        Some((crop, status))
    }
}

impl Default for RecognitionSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn samples_only_enabled_crops() {
        let mut sampler = RecognitionSampler::seeded(7);
        let config = CropConfig::from_enabled([CropLabel::Rice, CropLabel::Soy]);

        let mut crops = HashSet::new();
        let mut statuses = HashSet::new();
        for _ in 0..200 {
            let (crop, status) = sampler.sample(&config).unwrap();
            crops.insert(crop);
            statuses.insert(status);
        }

        assert_eq!(crops, HashSet::from([CropLabel::Rice, CropLabel::Soy]));
        assert_eq!(statuses.len(), HealthStatus::ALL.len());
    }

    #[test]
    fn empty_config_yields_nothing() {
        let mut sampler = RecognitionSampler::seeded(1);
        assert!(sampler.sample(&CropConfig::none()).is_none());
    }

    #[test]
    fn seeded_samplers_repeat() {
        let config = CropConfig::all();
        let mut a = RecognitionSampler::seeded(42);
        let mut b = RecognitionSampler::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.sample(&config), b.sample(&config));
        }
    }
}
