pub mod flight;
pub mod models;
pub mod routes;
pub mod settings;
mod utils;
mod view;

use std::{env, path::PathBuf};

use anyhow::Context;
use flight::FlightController;
use routes::{Route, RouteCatalog};
use settings::{DisplaySettings, SettingsStore};

pub struct AppState {
    pub flight: FlightController,
    pub settings: SettingsStore,
    pub routes: RouteCatalog,
}

impl AppState {
    pub fn new(settings: SettingsStore) -> Self {
        let flight = FlightController::new(settings.flight_timing(), settings.crops());
        Self {
            flight,
            settings,
            routes: RouteCatalog::presets(),
        }
    }
}

pub fn get_routes(state: &AppState) -> Vec<Route> {
    state.routes.list().to_vec()
}

pub fn get_selected_route(state: &AppState) -> Result<Route, String> {
    state
        .routes
        .get(&state.settings.route_id())
        .cloned()
        .map_err(|e| e.to_string())
}

pub fn select_route(state: &AppState, route_id: String) -> Result<Route, String> {
    let route = state
        .routes
        .get(&route_id)
        .cloned()
        .map_err(|e| e.to_string())?;
    state
        .settings
        .update_route(route.id.clone())
        .map_err(|e| e.to_string())?;
    Ok(route)
}

pub fn get_display_settings(state: &AppState) -> DisplaySettings {
    state.settings.display()
}

pub fn toggle_dark_mode(state: &AppState) -> Result<bool, String> {
    let mut display = state.settings.display();
    display.dark_mode = !display.dark_mode;
    state
        .settings
        .update_display(display)
        .map_err(|e| e.to_string())?;
    Ok(display.dark_mode)
}

pub fn toggle_fpv_mode(state: &AppState) -> Result<bool, String> {
    let mut display = state.settings.display();
    display.fpv_mode = !display.fpv_mode;
    state
        .settings
        .update_display(display)
        .map_err(|e| e.to_string())?;
    Ok(display.fpv_mode)
}

pub fn run() -> anyhow::Result<()> {
    let debug_mode = env::var("CROPSCAN_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    log::info!("cropscan starting up...");

    let settings_path = env::var("CROPSCAN_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cropscan.json"));
    let settings = SettingsStore::new(settings_path)?;
    let route_arg = env::args().nth(1);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(view::fly_once(AppState::new(settings), route_arg))
}
