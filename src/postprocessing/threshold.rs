use crate::error::DetectError;
use crate::types::ProbabilityMap;
use image::GrayImage;

const PIXEL_MAX_VALUE: f32 = 255.0;
const FOREGROUND: u8 = 255;

/// Binarize a probability map
///
/// A pixel is foreground (255) iff `probability * 255 >= threshold * 255`,
/// so a probability exactly at the threshold counts as text.
pub fn binarize(map: &ProbabilityMap, threshold: f32) -> Result<GrayImage, DetectError> {
    if map.width == 0 || map.height == 0 {
        return Err(DetectError::InvalidInput(format!(
            "Invalid dimensions: width={}, height={}",
            map.width, map.height
        )));
    }
    if map.data.is_empty() {
        return Err(DetectError::InvalidInput(
            "Invalid probability map: map must not be empty".to_string(),
        ));
    }
    let expected = map.width as usize * map.height as usize;
    if map.data.len() != expected {
        return Err(DetectError::InvalidInput(format!(
            "Probability map has {} values, expected {}x{}={}",
            map.data.len(),
            map.width,
            map.height,
            expected
        )));
    }

    let cutoff = threshold * PIXEL_MAX_VALUE;
    let pixels = map
        .data
        .iter()
        .map(|&p| if p * PIXEL_MAX_VALUE >= cutoff { FOREGROUND } else { 0 })
        .collect();

    GrayImage::from_raw(map.width, map.height, pixels)
        .ok_or_else(|| DetectError::Internal("Failed to build binary mask".to_string()))
}
