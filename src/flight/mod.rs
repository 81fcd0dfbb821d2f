pub mod commands;
pub mod controller;
pub mod sampler;
pub mod state;
pub mod summary;

pub use controller::{FlightController, FlightEvent, FlightSnapshot};
pub use sampler::RecognitionSampler;
pub use state::{FlightState, FlightStatus, FlightTiming, Prediction, StopReason};
pub use summary::FlightSummary;
