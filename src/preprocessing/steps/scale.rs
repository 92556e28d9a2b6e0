use crate::error::DetectError;
use crate::types::ScalePlan;

impl ScalePlan {
    /// Plan the resize and padding for an image of the given size
    ///
    /// The longest side is brought down to at most `max_side` (images are
    /// never enlarged) and both resized dimensions are rounded up to the next
    /// multiple of `alignment`.
    pub fn compute(
        width: u32,
        height: u32,
        max_side: u32,
        alignment: u32,
    ) -> Result<Self, DetectError> {
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidInput(format!(
                "image must have positive dimensions, got {}x{}",
                width, height
            )));
        }
        if max_side == 0 || alignment == 0 {
            return Err(DetectError::InvalidInput(format!(
                "max_side and alignment must be positive, got {} and {}",
                max_side, alignment
            )));
        }

        let scale = (max_side as f64 / width.max(height) as f64).min(1.0);
        let resized_width = scaled_dimension(width, scale);
        let resized_height = scaled_dimension(height, scale);

        Ok(Self {
            scale,
            resized_width,
            resized_height,
            padded_width: resized_width.div_ceil(alignment) * alignment,
            padded_height: resized_height.div_ceil(alignment) * alignment,
        })
    }
}

fn scaled_dimension(original: u32, scale: f64) -> u32 {
    ((original as f64 * scale).round() as u32).max(1)
}
