pub mod crop;
pub mod crop_config;
pub mod recognition;

pub use crop::{CropLabel, HealthStatus};
pub use crop_config::CropConfig;
pub use recognition::RecognitionEvent;
