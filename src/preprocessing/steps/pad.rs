use image::{imageops, RgbImage};

/// Place `image` at the top-left of a black canvas of the given size
///
/// The canvas must be at least as large as the image in both directions.
pub fn pad_to(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    debug_assert!(image.width() <= width && image.height() <= height);
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, image, 0, 0);
    canvas
}
