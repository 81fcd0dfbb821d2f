use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::flight::FlightTiming;
use crate::models::{CropConfig, CropLabel};
use crate::routes::DEFAULT_ROUTE_ID;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub dark_mode: bool,
    pub fpv_mode: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            fpv_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub flight: FlightTiming,
    pub crops: CropConfig,
    pub route_id: String,
    pub display: DisplaySettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            flight: FlightTiming::default(),
            crops: CropConfig::default(),
            route_id: DEFAULT_ROUTE_ID.into(),
            display: DisplaySettings::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring malformed settings in {}: {}",
                    path.display(),
                    err
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> UserSettings {
        self.read().clone()
    }

    pub fn flight_timing(&self) -> FlightTiming {
        self.read().flight
    }

    pub fn crops(&self) -> CropConfig {
        self.read().crops.clone()
    }

    pub fn route_id(&self) -> String {
        self.read().route_id.clone()
    }

    pub fn display(&self) -> DisplaySettings {
        self.read().display
    }

    pub fn update_crops(&self, crops: CropConfig) -> Result<()> {
        self.update(|data| data.crops = crops)
    }

    pub fn set_crop_enabled(&self, label: CropLabel, enabled: bool) -> Result<()> {
        self.update(|data| data.crops.set(label, enabled))
    }

    pub fn update_route(&self, route_id: String) -> Result<()> {
        self.update(|data| data.route_id = route_id)
    }

    pub fn update_display(&self, display: DisplaySettings) -> Result<()> {
        self.update(|data| data.display = display)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut UserSettings)) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_settings_path() -> PathBuf {
        std::env::temp_dir().join(format!("cropscan-settings-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(temp_settings_path()).unwrap();
        let settings = store.snapshot();
        assert_eq!(settings, UserSettings::default());
        assert_eq!(store.flight_timing(), FlightTiming::new(10_000, 2_000));
        assert!(store.display().dark_mode);
    }

    #[test]
    fn updates_persist_and_reload() {
        let path = temp_settings_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        store.set_crop_enabled(CropLabel::Soy, true).unwrap();
        store.update_route("route2".into()).unwrap();
        store
            .update_display(DisplaySettings {
                dark_mode: false,
                fpv_mode: true,
            })
            .unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap();
        assert!(reloaded.crops().is_enabled(CropLabel::Soy));
        assert_eq!(reloaded.route_id(), "route2");
        assert!(reloaded.display().fpv_mode);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_settings_path();
        fs::write(&path, r#"{"flight": {"durationMs": 4000}}"#).unwrap();

        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.flight_timing(), FlightTiming::new(4_000, 2_000));
        assert_eq!(store.crops(), CropConfig::default());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = temp_settings_path();
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.route_id(), DEFAULT_ROUTE_ID);

        fs::remove_file(path).unwrap();
    }
}
