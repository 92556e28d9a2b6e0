//! Text line detection around a DBNet-style segmentation model
//!
//! An image is resized, padded and normalized into a planar tensor, the
//! model turns it into a text probability map, and the map is thresholded,
//! traced into candidate boxes and grouped into one rectangle per text line.

pub mod config;
pub mod detector;
pub mod engine;
pub mod engines;
pub mod error;
pub mod postprocessing;
pub mod preprocessing;
pub mod render;
pub mod server;
pub mod types;

pub use config::DetectionConfig;
pub use detector::{Detection, Detector};
pub use engine::{InferenceBackend, ModelCache};
pub use error::DetectError;
pub use types::{lines_to_json, LineRect};
