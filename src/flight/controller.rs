use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::{CropConfig, CropLabel, RecognitionEvent};

use super::{FlightState, FlightSummary, FlightTiming, Prediction, RecognitionSampler, StopReason};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlightSnapshot {
    pub running: bool,
    pub remaining_ms: u64,
    pub state: FlightState,
}

impl FlightSnapshot {
    pub fn prediction(&self) -> Prediction {
        self.state.prediction
    }

    pub fn log(&self) -> &[RecognitionEvent] {
        &self.state.log
    }
}

impl From<FlightState> for FlightSnapshot {
    fn from(state: FlightState) -> Self {
        Self {
            running: state.is_running(),
            remaining_ms: state.remaining_ms(),
            state,
        }
    }
}

/// Notifications for the view, in the order the changes happened.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FlightEvent {
    Started {
        flight_id: String,
        timing: FlightTiming,
    },
    Recognized {
        flight_id: String,
        event: RecognitionEvent,
    },
    Completed {
        summary: FlightSummary,
    },
}

/// Shared pieces the driver task needs. Cloned into every spawned driver.
#[derive(Clone)]
struct FlightContext {
    state: Arc<Mutex<FlightState>>,
    crops: Arc<Mutex<CropConfig>>,
    sampler: Arc<Mutex<RecognitionSampler>>,
    publisher: Arc<watch::Sender<FlightState>>,
    events: broadcast::Sender<FlightEvent>,
}

impl FlightContext {
    fn publish(&self, state: &FlightState) {
        self.publisher.send_replace(state.clone());
    }

    fn emit(&self, event: FlightEvent) {
        // No subscribers is fine; the watch channel still carries the state.
        let _ = self.events.send(event);
    }

    /// One sampling cycle. Returns false once `flight_id` is no longer the
    /// running flight, which tells the driver to exit.
    async fn tick(&self, flight_id: &str) -> bool {
        // The enabled set is read fresh every tick so toggles apply to the
        // next sample.
        let config = self.crops.lock().await.clone();

        let mut state = self.state.lock().await;
        if !state.is_running_flight(flight_id) {
            return false;
        }

        let sample = self.sampler.lock().await.sample(&config);
        let Some((crop, status)) = sample else {
            log_warn!("flight {}: no crops enabled, skipping sample", flight_id);
            return true;
        };

        if let Some(event) = state.record(crop, status, Instant::now()) {
            self.publish(&state);
            log_debug!(
                "flight {}: #{} {} ({}) at +{}ms",
                flight_id,
                event.sequence,
                event.crop,
                event.status,
                event.offset_ms
            );
            self.emit(FlightEvent::Recognized {
                flight_id: flight_id.to_string(),
                event,
            });
        }
        true
    }

    async fn complete(&self, flight_id: &str) {
        let summary = {
            let mut state = self.state.lock().await;
            if !state.is_running_flight(flight_id) {
                return;
            }
            state.finish(StopReason::Elapsed, Utc::now());
            self.publish(&state);
            FlightSummary::from(&*state)
        };

        log_info!(
            "flight {} completed: {} recognitions, {} infected",
            flight_id,
            summary.total,
            summary.infected
        );
        self.emit(FlightEvent::Completed { summary });
    }
}

struct FlightDriver {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

#[derive(Clone)]
pub struct FlightController {
    ctx: FlightContext,
    published: watch::Receiver<FlightState>,
    driver: Arc<Mutex<Option<FlightDriver>>>,
    default_timing: FlightTiming,
}

impl FlightController {
    pub fn new(default_timing: FlightTiming, crops: CropConfig) -> Self {
        Self::with_sampler(default_timing, crops, RecognitionSampler::new())
    }

    pub fn with_sampler(
        default_timing: FlightTiming,
        crops: CropConfig,
        sampler: RecognitionSampler,
    ) -> Self {
        let (publisher, published) = watch::channel(FlightState::new());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            ctx: FlightContext {
                state: Arc::new(Mutex::new(FlightState::new())),
                crops: Arc::new(Mutex::new(crops)),
                sampler: Arc::new(Mutex::new(sampler)),
                publisher: Arc::new(publisher),
                events,
            },
            published,
            driver: Arc::new(Mutex::new(None)),
            default_timing,
        }
    }

    pub fn default_timing(&self) -> FlightTiming {
        self.default_timing
    }

    /// Latest published state. Never waits on the session locks.
    pub fn snapshot(&self) -> FlightSnapshot {
        FlightSnapshot::from(self.published.borrow().clone())
    }

    /// Receiver that is marked changed after every start, tick and stop.
    pub fn subscribe(&self) -> watch::Receiver<FlightState> {
        self.ctx.publisher.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<FlightEvent> {
        self.ctx.events.subscribe()
    }

    pub async fn crop_config(&self) -> CropConfig {
        self.ctx.crops.lock().await.clone()
    }

    pub async fn set_crop_config(&self, config: CropConfig) {
        *self.ctx.crops.lock().await = config;
    }

    pub async fn set_crop_enabled(&self, label: CropLabel, enabled: bool) {
        self.ctx.crops.lock().await.set(label, enabled);
    }

    pub async fn toggle_crop(&self, label: CropLabel) -> bool {
        let enabled = self.ctx.crops.lock().await.toggle(label);
        log_debug!("crop {} recognition {}", label, if enabled { "enabled" } else { "disabled" });
        enabled
    }

    /// Starts a flight with `config` as the crop selection. Uses the
    /// controller's default timing when `timing` is `None`.
    ///
    /// Starting while a flight is running leaves it untouched and returns its
    /// current snapshot.
    pub async fn start_flight(
        &self,
        config: CropConfig,
        timing: Option<FlightTiming>,
    ) -> Result<FlightSnapshot> {
        let timing = timing.unwrap_or(self.default_timing);
        timing.validate()?;

        let mut driver_guard = self.driver.lock().await;

        let flight_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        {
            let mut state = self.ctx.state.lock().await;
            if state.is_running() {
                log_info!(
                    "flight {} already running; ignoring start",
                    state.flight_id.as_deref().unwrap_or("?")
                );
                return Ok(self.snapshot());
            }

            if !config.has_enabled() {
                log_warn!("starting flight {} with no crops enabled", flight_id);
            }
            *self.ctx.crops.lock().await = config;
            state.begin_flight(flight_id.clone(), timing, Utc::now(), started);
            self.ctx.publish(&state);
        }

        // A finished flight leaves its driver handle behind.
        if let Some(previous) = driver_guard.take() {
            previous.cancel_token.cancel();
            previous.handle.abort();
        }

        self.ctx.emit(FlightEvent::Started {
            flight_id: flight_id.clone(),
            timing,
        });

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(flight_loop(
            self.ctx.clone(),
            flight_id.clone(),
            timing,
            started,
            cancel_token.clone(),
        ));
        *driver_guard = Some(FlightDriver {
            handle,
            cancel_token,
        });

        log_info!(
            "flight {} started: {}ms, sampling every {}ms",
            flight_id,
            timing.duration_ms,
            timing.interval_ms
        );

        Ok(self.snapshot())
    }

    /// Ends the running flight early. No tick lands after this returns.
    /// Stopping while idle is a no-op.
    pub async fn stop_flight(&self) -> Result<FlightSnapshot> {
        let mut driver_guard = self.driver.lock().await;

        let summary = {
            let mut state = self.ctx.state.lock().await;
            if !state.is_running() {
                log_debug!("stop requested while idle");
                return Ok(self.snapshot());
            }
            state.finish(StopReason::Manual, Utc::now());
            self.ctx.publish(&state);
            FlightSummary::from(&*state)
        };

        if let Some(driver) = driver_guard.take() {
            driver.cancel_token.cancel();
            driver
                .handle
                .await
                .context("flight driver task failed to join")?;
        }

        log_info!(
            "flight {} stopped: {} recognitions, {} infected",
            summary.flight_id.as_deref().unwrap_or("?"),
            summary.total,
            summary.infected
        );
        self.ctx.emit(FlightEvent::Completed { summary });

        Ok(self.snapshot())
    }
}

/// Owns both timers of one flight: the sampling interval and the duration
/// deadline. Ticks start one interval after `started`. The deadline is
/// polled before the interval, so a tick due at the same instant as the
/// deadline never fires.
async fn flight_loop(
    ctx: FlightContext,
    flight_id: String,
    timing: FlightTiming,
    started: Instant,
    cancel_token: CancellationToken,
) {
    let deadline = time::sleep_until(started + timing.duration());
    tokio::pin!(deadline);

    let mut ticker = time::interval_at(started + timing.interval(), timing.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_debug!("flight {} driver cancelled", flight_id);
                break;
            }
            _ = &mut deadline => {
                ctx.complete(&flight_id).await;
                break;
            }
            _ = ticker.tick() => {
                if !ctx.tick(&flight_id).await {
                    break;
                }
            }
        }
    }
}
