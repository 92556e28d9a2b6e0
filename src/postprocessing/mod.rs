//! Probability map to text lines
//!
//! Thresholds the model output, extracts candidate boxes from the resulting
//! mask and groups them into lines.

pub mod candidates;
pub mod lines;
pub mod threshold;

pub use candidates::{extract_candidates, filter_and_rescale};
pub use lines::{group_into_lines, merge_line};
pub use threshold::binarize;
