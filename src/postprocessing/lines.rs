use crate::types::{LineRect, RawBox};

/// Group boxes into text lines and merge each line into one rectangle
///
/// Boxes are ordered by vertical center (stable, so ties keep their input
/// order) and swept once. A box joins the current line when its center is
/// within `tol_factor * average_height` of the center of the last box added
/// to that line; otherwise the line is closed and a new one starts. Comparing
/// against the last box rather than the line's centroid lets a line drift
/// slowly across many boxes.
///
/// Lines are returned top to bottom, each padded by `padding` on every side
/// (clamped at zero on the top and left edges only).
pub fn group_into_lines(boxes: &[RawBox], tol_factor: f64, padding: u32) -> Vec<LineRect> {
    if boxes.is_empty() {
        return Vec::new();
    }

    let mut sorted = boxes.to_vec();
    sorted.sort_by(|a, b| a.vertical_center().total_cmp(&b.vertical_center()));

    let average_height = sorted.iter().map(|b| b.h as f64).sum::<f64>() / sorted.len() as f64;
    let tolerance = tol_factor * average_height;

    let mut lines = Vec::new();
    let mut current: Vec<RawBox> = vec![sorted[0]];

    for &candidate in &sorted[1..] {
        let last = current[current.len() - 1];
        let distance = (candidate.vertical_center() - last.vertical_center()).abs();

        if distance <= tolerance {
            current.push(candidate);
        } else {
            lines.push(close_line(&mut current, padding));
            current.push(candidate);
        }
    }
    lines.push(close_line(&mut current, padding));

    tracing::debug!(
        "Grouped {} boxes into {} lines (tolerance {:.2})",
        boxes.len(),
        lines.len(),
        tolerance
    );

    lines
}

/// Sort a finished line left to right, merge it and leave `line` empty
fn close_line(line: &mut Vec<RawBox>, padding: u32) -> LineRect {
    line.sort_by_key(|b| b.x);
    let merged = merge_line(line, padding);
    line.clear();
    merged
}

/// Union of the boxes of one line, padded outward
///
/// # Panics
///
/// Panics if `boxes` is empty. Grouping always closes lines with at least
/// one box, so an empty line means the grouping logic is broken.
pub fn merge_line(boxes: &[RawBox], padding: u32) -> LineRect {
    let Some((first, rest)) = boxes.split_first() else {
        panic!("cannot merge an empty line");
    };

    let (left, top, right, bottom) = rest.iter().fold(
        (first.x, first.y, first.right(), first.bottom()),
        |(left, top, right, bottom), b| {
            (left.min(b.x), top.min(b.y), right.max(b.right()), bottom.max(b.bottom()))
        },
    );

    let left = left.saturating_sub(padding);
    let top = top.saturating_sub(padding);
    let right = right.saturating_add(padding);
    let bottom = bottom.saturating_add(padding);

    LineRect {
        x: left,
        y: top,
        w: right - left,
        h: bottom - top,
    }
}
