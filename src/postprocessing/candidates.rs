use crate::error::DetectError;
use crate::types::RawBox;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};

/// Bounding boxes of the outermost foreground regions of a mask
///
/// Holes and regions nested inside holes are not reported separately; they
/// are covered by the box of the region that encloses them.
pub fn extract_candidates(mask: &GrayImage) -> Vec<RawBox> {
    find_contours::<u32>(mask)
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(bounding_box)
        .collect()
}

/// Inclusive bounding rectangle of a contour's points
fn bounding_box(contour: &Contour<u32>) -> Option<RawBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(RawBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Drop boxes smaller than the minimum size and map the rest back to image space
///
/// Sizes are checked in map pixels, before rescaling. Every coordinate is
/// divided by `scale` and rounded, undoing the forward resize.
pub fn filter_and_rescale(
    boxes: &[RawBox],
    min_width: u32,
    min_height: u32,
    scale: f64,
) -> Result<Vec<RawBox>, DetectError> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(DetectError::InvalidInput(format!(
            "Invalid scale: {} must be positive",
            scale
        )));
    }

    Ok(boxes
        .iter()
        .filter(|b| b.w >= min_width && b.h >= min_height)
        .map(|b| rescale_box(b, scale))
        .collect())
}

pub(crate) fn rescale_box(b: &RawBox, scale: f64) -> RawBox {
    let back = |v: u32| (v as f64 / scale).round() as u32;
    RawBox::new(back(b.x), back(b.y), back(b.w), back(b.h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn fill(mask: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                mask.put_pixel(xx, yy, Luma([255]));
            }
        }
    }

    #[test]
    fn test_extracts_filled_rectangles() {
        let mut mask = GrayImage::new(100, 60);
        fill(&mut mask, 10, 10, 30, 10);
        fill(&mut mask, 50, 40, 7, 5);

        let mut boxes = extract_candidates(&mask);
        boxes.sort_by_key(|b| (b.y, b.x));
        assert_eq!(
            boxes,
            vec![RawBox::new(10, 10, 30, 10), RawBox::new(50, 40, 7, 5)]
        );
    }

    #[test]
    fn test_nested_regions_are_not_reported() {
        let mut mask = GrayImage::new(40, 40);
        // Ring with a blob inside its hole
        fill(&mut mask, 5, 5, 30, 30);
        for yy in 8..32 {
            for xx in 8..32 {
                mask.put_pixel(xx, yy, Luma([0]));
            }
        }
        fill(&mut mask, 15, 15, 6, 6);

        let boxes = extract_candidates(&mask);
        assert_eq!(boxes, vec![RawBox::new(5, 5, 30, 30)]);
    }

    #[test]
    fn test_empty_mask_has_no_candidates() {
        assert!(extract_candidates(&GrayImage::new(16, 16)).is_empty());
    }

    #[test]
    fn test_small_box_filter() {
        let boxes = [
            RawBox::new(0, 0, 4, 50),
            RawBox::new(0, 0, 50, 4),
            RawBox::new(0, 0, 5, 5),
        ];
        let kept = filter_and_rescale(&boxes, 5, 5, 1.0).unwrap();
        assert_eq!(kept, vec![RawBox::new(0, 0, 5, 5)]);
    }

    #[test]
    fn test_rescale_divides_by_scale() {
        let kept = filter_and_rescale(&[RawBox::new(10, 21, 30, 7)], 5, 5, 0.5).unwrap();
        assert_eq!(kept, vec![RawBox::new(20, 42, 60, 14)]);

        let unchanged = filter_and_rescale(&[RawBox::new(10, 21, 30, 7)], 5, 5, 1.0).unwrap();
        assert_eq!(unchanged, vec![RawBox::new(10, 21, 30, 7)]);
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(matches!(
            filter_and_rescale(&[], 5, 5, 0.0),
            Err(DetectError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rescale_round_trip_within_one_pixel() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let scale: f64 = rng.gen_range(0.01..=1.0);
            let b = RawBox::new(
                rng.gen_range(0..2000),
                rng.gen_range(0..2000),
                rng.gen_range(1..500),
                rng.gen_range(1..500),
            );
            let up = rescale_box(&b, scale);
            let down = |v: u32| (v as f64 * scale).round() as i64;
            for (orig, back) in [
                (b.x, down(up.x)),
                (b.y, down(up.y)),
                (b.w, down(up.w)),
                (b.h, down(up.h)),
            ] {
                assert!(
                    (orig as i64 - back).abs() <= 1,
                    "{:?} at scale {} came back as {}",
                    b,
                    scale,
                    back
                );
            }
        }
    }
}
