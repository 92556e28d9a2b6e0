//! Image preparation for the detection model
//!
//! Turns an arbitrary image into the padded, normalized tensor the model
//! expects, together with the scale plan needed to map results back.

pub mod pipeline;
pub mod steps;

pub use pipeline::{prepare, PreparedInput, StepTiming};
