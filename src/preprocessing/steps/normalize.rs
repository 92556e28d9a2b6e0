use crate::types::InputTensor;
use image::RgbImage;

/// Per-channel mean (R, G, B) of the detector's training data
pub const NORMALIZATION_MEAN: [f64; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviation (R, G, B)
pub const NORMALIZATION_STD: [f64; 3] = [0.229, 0.224, 0.225];

const PIXEL_MAX_VALUE: f64 = 255.0;

/// Build the planar `[1, 3, H, W]` input tensor from a padded RGB canvas
///
/// Every pixel is scaled to `[0, 1]` and normalized with
/// `(value - mean[c]) / std[c]`. Padding pixels are black, so they carry the
/// normalized value of zero rather than being skipped.
pub fn to_tensor(canvas: &RgbImage) -> InputTensor {
    let (width, height) = canvas.dimensions();
    let plane = width as usize * height as usize;
    let mut data = vec![0f32; 3 * plane];

    for (x, y, pixel) in canvas.enumerate_pixels() {
        let offset = y as usize * width as usize + x as usize;
        for c in 0..3 {
            let value = pixel.0[c] as f64 / PIXEL_MAX_VALUE;
            data[c * plane + offset] =
                ((value - NORMALIZATION_MEAN[c]) / NORMALIZATION_STD[c]) as f32;
        }
    }

    InputTensor {
        data,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn normalized(byte: u8, c: usize) -> f32 {
        ((byte as f64 / 255.0 - NORMALIZATION_MEAN[c]) / NORMALIZATION_STD[c]) as f32
    }

    #[test]
    fn test_layout_is_channel_planar() {
        let mut canvas = RgbImage::new(4, 2);
        canvas.put_pixel(3, 1, Rgb([255, 128, 0]));
        let tensor = to_tensor(&canvas);

        assert_eq!(tensor.shape(), [1, 3, 2, 4]);
        assert_eq!(tensor.data.len(), 24);

        let plane = 8;
        let offset = 4 + 3;
        assert_eq!(tensor.data[offset], normalized(255, 0));
        assert_eq!(tensor.data[plane + offset], normalized(128, 1));
        assert_eq!(tensor.data[2 * plane + offset], normalized(0, 2));
    }

    #[test]
    fn test_black_padding_is_normalized() {
        let tensor = to_tensor(&RgbImage::new(2, 2));
        for c in 0..3 {
            let expected = (-NORMALIZATION_MEAN[c] / NORMALIZATION_STD[c]) as f32;
            for i in 0..4 {
                assert_eq!(tensor.data[c * 4 + i], expected);
            }
        }
        assert!((tensor.data[0] - (-2.117_904_1)).abs() < 1e-5);
    }

    #[test]
    fn test_white_pixel_values() {
        let tensor = to_tensor(&RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])));
        assert!((tensor.data[0] - 2.248_908_3).abs() < 1e-5);
        assert!((tensor.data[1] - 2.428_571_4).abs() < 1e-5);
        assert!((tensor.data[2] - 2.64).abs() < 1e-5);
    }
}
