//! Records passed between the detection stages

use serde::{Deserialize, Serialize};

/// How the source image is scaled and padded before inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalePlan {
    /// Resize factor in `(0, 1]`; never upscales
    pub scale: f64,
    pub resized_width: u32,
    pub resized_height: u32,
    /// Smallest multiple of the alignment that fits `resized_width`
    pub padded_width: u32,
    /// Smallest multiple of the alignment that fits `resized_height`
    pub padded_height: u32,
}

/// Normalized input tensor, logically shaped `[1, 3, height, width]`
///
/// Channel-planar: every red value, then every green value, then every blue
/// value, each plane row-major.
#[derive(Debug, Clone)]
pub struct InputTensor {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl InputTensor {
    pub fn shape(&self) -> [usize; 4] {
        [1, 3, self.height as usize, self.width as usize]
    }
}

/// Row-major text probability map produced by the model
#[derive(Debug, Clone)]
pub struct ProbabilityMap {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

/// Candidate rectangle, first in map pixels and after rescaling in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl RawBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn vertical_center(&self) -> f64 {
        self.y as f64 + self.h as f64 / 2.0
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
}

/// A detected text line in original image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Serialize lines as a flat JSON list of `{x, y, w, h}` records
pub fn lines_to_json(lines: &[LineRect]) -> serde_json::Result<String> {
    serde_json::to_string(lines)
}
