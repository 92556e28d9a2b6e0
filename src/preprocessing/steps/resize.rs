use crate::error::DetectError;
use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbImage;

/// Resize with box-filter averaging
///
/// Each destination pixel averages the source pixels under its footprint.
/// Same-size resizes return a copy of the input.
pub fn resize_area(image: &RgbImage, width: u32, height: u32) -> Result<RgbImage, DetectError> {
    let (src_width, src_height) = image.dimensions();
    if (src_width, src_height) == (width, height) {
        return Ok(image.clone());
    }

    let src = ImageRef::new(src_width, src_height, image.as_raw(), PixelType::U8x3)
        .map_err(|e| DetectError::Internal(format!("Invalid resize source: {}", e)))?;
    let mut dst = Image::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box));
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| DetectError::Internal(format!("Resize failed: {}", e)))?;

    RgbImage::from_raw(width, height, dst.into_vec())
        .ok_or_else(|| DetectError::Internal("Resized buffer has the wrong size".to_string()))
}
