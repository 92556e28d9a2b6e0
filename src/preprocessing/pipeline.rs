use crate::config::DetectionConfig;
use crate::error::DetectError;
use crate::types::{InputTensor, ScalePlan};
use image::{DynamicImage, RgbImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Timing information for a single pipeline step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Run `step_fn`, recording how long it took under `name`
pub(crate) fn run_step<T, F>(name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> T
where
    F: FnOnce() -> T,
{
    let step_start = Instant::now();
    let result = step_fn();
    timings.push(StepTiming {
        name: name.to_string(),
        time_ms: step_start.elapsed().as_millis() as u64,
    });
    result
}

/// Model input plus everything needed to interpret the model output
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub tensor: InputTensor,
    pub plan: ScalePlan,
    pub steps: Vec<StepTiming>,
}

/// Resize, pad and normalize an image according to `config`
pub fn prepare(image: &DynamicImage, config: &DetectionConfig) -> Result<PreparedInput, DetectError> {
    let plan = ScalePlan::compute(
        image.width(),
        image.height(),
        config.max_side,
        config.alignment,
    )?;

    tracing::debug!(
        "Scale plan: scale={:.4}, resized={}x{}, padded={}x{}",
        plan.scale,
        plan.resized_width,
        plan.resized_height,
        plan.padded_width,
        plan.padded_height
    );

    let mut timings = Vec::new();
    let rgb: RgbImage = image.to_rgb8();

    let resized = run_step("resize", &mut timings, || {
        steps::resize::resize_area(&rgb, plan.resized_width, plan.resized_height)
    })?;
    let canvas = run_step("pad", &mut timings, || {
        steps::pad::pad_to(&resized, plan.padded_width, plan.padded_height)
    });
    let tensor = run_step("normalize", &mut timings, || {
        steps::normalize::to_tensor(&canvas)
    });

    Ok(PreparedInput {
        tensor,
        plan,
        steps: timings,
    })
}
