use crate::{
    flight::FlightSnapshot,
    models::{CropConfig, CropLabel},
    AppState,
};

pub fn get_flight_state(state: &AppState) -> Result<FlightSnapshot, String> {
    Ok(state.flight.snapshot())
}

/// Starts a flight with the live crop selection and the configured timing.
pub async fn start_flight(state: &AppState) -> Result<FlightSnapshot, String> {
    let crops = state.flight.crop_config().await;
    state
        .flight
        .start_flight(crops, Some(state.settings.flight_timing()))
        .await
        .map_err(|e| e.to_string())
}

pub async fn stop_flight(state: &AppState) -> Result<FlightSnapshot, String> {
    state.flight.stop_flight().await.map_err(|e| e.to_string())
}

pub async fn get_crop_config(state: &AppState) -> Result<CropConfig, String> {
    Ok(state.flight.crop_config().await)
}

pub async fn toggle_crop(state: &AppState, crop: String) -> Result<bool, String> {
    let label: CropLabel = crop.parse().map_err(|e: anyhow::Error| e.to_string())?;
    let enabled = state.flight.toggle_crop(label).await;
    state
        .settings
        .set_crop_enabled(label, enabled)
        .map_err(|e| e.to_string())?;
    Ok(enabled)
}

pub async fn set_crop_enabled(state: &AppState, crop: String, enabled: bool) -> Result<(), String> {
    let label: CropLabel = crop.parse().map_err(|e: anyhow::Error| e.to_string())?;
    state.flight.set_crop_enabled(label, enabled).await;
    state
        .settings
        .set_crop_enabled(label, enabled)
        .map_err(|e| e.to_string())
}
