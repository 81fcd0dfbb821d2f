//! Terminal rendering of a single flight: the route being flown, one table
//! row per recognition, and a summary once the flight ends. Ctrl-C stops the
//! flight early.

use anyhow::{anyhow, Result};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    flight::{commands, FlightEvent, FlightSummary},
    models::CropLabel,
    routes::{Route, DEFAULT_ROUTE_ID},
    AppState,
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub(crate) async fn fly_once(state: AppState, route_arg: Option<String>) -> Result<()> {
    let route = match route_arg {
        Some(route_id) => state.routes.get(&route_id)?.clone(),
        None => match crate::get_selected_route(&state) {
            Ok(route) => route,
            Err(err) => {
                log_warn!("{}; falling back to {}", err, DEFAULT_ROUTE_ID);
                state.routes.get(DEFAULT_ROUTE_ID)?.clone()
            }
        },
    };
    render_route(&state, &route);

    let crops = commands::get_crop_config(&state).await.map_err(|e| anyhow!(e))?;
    let enabled: Vec<&str> = crops.enabled().iter().map(CropLabel::as_str).collect();
    log_info!(
        "Recognising: {}",
        if enabled.is_empty() { "nothing".to_string() } else { enabled.join(", ") }
    );

    let mut events = state.flight.events();
    let snapshot = commands::start_flight(&state).await.map_err(|e| anyhow!(e))?;
    log_info!(
        "Flying... current prediction: {} ({}ms left)",
        snapshot.prediction(),
        snapshot.remaining_ms
    );

    println!("{:<4} {:<8} {:<9} {:>8}", "#", "Crop", "Status", "At");
    let mut interrupted = false;
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(FlightEvent::Started { .. }) => {}
                Ok(FlightEvent::Recognized { event, .. }) => {
                    println!(
                        "{:<4} {:<8} {:<9} {:>7}s",
                        event.sequence,
                        event.crop,
                        event.status,
                        event.offset_ms as f64 / 1000.0
                    );
                }
                Ok(FlightEvent::Completed { summary }) => {
                    render_summary(&summary);
                    break;
                }
                Err(RecvError::Lagged(skipped)) => {
                    log_warn!("view fell behind; {} flight events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            signal = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                if let Err(err) = signal {
                    log_error!("failed to listen for ctrl-c: {}", err);
                    continue;
                }
                log_info!("Interrupted; landing early");
                commands::stop_flight(&state).await.map_err(|e| anyhow!(e))?;
            }
        }
    }

    let finished = commands::get_flight_state(&state).map_err(|e| anyhow!(e))?;
    log_info!("Last prediction: {}", finished.prediction());
    Ok(())
}

fn render_route(state: &AppState, route: &Route) {
    let display = crate::get_display_settings(state);
    log_info!(
        "{} ({} waypoints, {:.2} km, {} line, {} theme)",
        route.label,
        route.waypoints.len(),
        route.total_distance_m() / 1000.0,
        Route::line_color(display.fpv_mode),
        if display.dark_mode { "dark" } else { "light" }
    );
    if let Some(center) = state.routes.map_center() {
        log_info!("Map centred on {:.4}, {:.4}", center.lat, center.lon);
    }
}

fn render_summary(summary: &FlightSummary) {
    println!(
        "-- {} recognitions: {} healthy, {} infected",
        summary.total,
        summary.healthy(),
        summary.infected
    );
    for (crop, count) in &summary.by_crop {
        println!("   {:<8} {}", crop, count);
    }
}
