//! End-to-end text line detection
//!
//! Runs the stages in order: prepare the tensor, infer the probability map,
//! threshold it, extract and rescale candidate boxes, then group them into
//! lines. Each stage consumes the previous stage's output by value.

use crate::config::DetectionConfig;
use crate::engine::{self, InferenceBackend, ModelCache};
use crate::error::DetectError;
use crate::postprocessing;
use crate::preprocessing::{self, pipeline::run_step, StepTiming};
use crate::types::{LineRect, ScalePlan};
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Lines found in one image plus how they were obtained
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub lines: Vec<LineRect>,
    pub plan: ScalePlan,
    /// Candidate boxes that survived the size filter
    pub candidates: usize,
    pub total_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// Detection pipeline with its lazily loaded model
pub struct Detector {
    model: ModelCache,
    config: DetectionConfig,
}

impl Detector {
    pub fn new(model: ModelCache, config: DetectionConfig) -> Result<Self, DetectError> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Name of the loaded backend, loading it if needed
    pub fn backend_name(&self) -> Result<&'static str, DetectError> {
        Ok(self.model.get()?.name())
    }

    /// The backend if the model is already loaded
    pub fn loaded_backend(&self) -> Option<Arc<dyn InferenceBackend>> {
        self.model.loaded()
    }

    /// Detect text lines with the detector's own configuration
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<LineRect>, DetectError> {
        Ok(self.detect_with(image, &self.config)?.lines)
    }

    /// Detect text lines with an explicit configuration
    pub fn detect_with(
        &self,
        image: &DynamicImage,
        config: &DetectionConfig,
    ) -> Result<Detection, DetectError> {
        config.validate()?;
        let start = Instant::now();

        let prepared = preprocessing::prepare(image, config)?;
        let plan = prepared.plan;
        let mut timings = prepared.steps;

        let backend = self.model.get()?;
        let map = run_step("inference", &mut timings, || {
            engine::infer(backend.as_ref(), &prepared.tensor)
        })?;
        drop(prepared.tensor);

        tracing::debug!(
            "Probability map {}x{} for tensor {}x{}",
            map.width,
            map.height,
            plan.padded_width,
            plan.padded_height
        );

        let mask = run_step("threshold", &mut timings, || {
            postprocessing::binarize(&map, config.threshold)
        })?;

        let candidates = run_step("contours", &mut timings, || {
            let raw = postprocessing::extract_candidates(&mask);
            tracing::debug!("Found {} raw candidate boxes", raw.len());
            postprocessing::filter_and_rescale(
                &raw,
                config.min_box_width,
                config.min_box_height,
                plan.scale,
            )
        })?;

        let lines = run_step("group", &mut timings, || {
            postprocessing::group_into_lines(
                &candidates,
                config.merge_tol_factor,
                config.merge_padding,
            )
        });

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Detected {} lines from {} candidates in {}ms",
            lines.len(),
            candidates.len(),
            total_time_ms
        );

        Ok(Detection {
            lines,
            plan,
            candidates: candidates.len(),
            total_time_ms,
            steps: timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NamedOutputs, OutputTensor, PREFERRED_OUTPUT};
    use crate::types::InputTensor;
    use image::RgbImage;

    /// Marks fixed rectangles (in map pixels) as text
    struct RectBackend {
        rects: Vec<(u32, u32, u32, u32)>,
    }

    impl InferenceBackend for RectBackend {
        fn name(&self) -> &'static str {
            "rects"
        }

        fn description(&self) -> &'static str {
            "fixed rectangles"
        }

        fn run(&self, input_name: &str, tensor: &InputTensor) -> Result<NamedOutputs, DetectError> {
            if input_name != "x" {
                return Err(DetectError::ModelError("unexpected input".to_string()));
            }
            let (w, h) = (tensor.width as usize, tensor.height as usize);
            let mut data = vec![0.05f32; w * h];
            for &(x, y, rw, rh) in &self.rects {
                for yy in y as usize..(y + rh) as usize {
                    for xx in x as usize..(x + rw) as usize {
                        data[yy * w + xx] = 0.9;
                    }
                }
            }
            Ok(vec![(
                PREFERRED_OUTPUT.to_string(),
                OutputTensor {
                    shape: vec![1, 1, h, w],
                    data: Some(data),
                },
            )])
        }
    }

    fn detector(rects: Vec<(u32, u32, u32, u32)>) -> Detector {
        let backend: Arc<dyn InferenceBackend> = Arc::new(RectBackend { rects });
        Detector::new(ModelCache::preloaded(backend), DetectionConfig::default()).unwrap()
    }

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    #[test]
    fn test_detects_and_groups_lines() {
        let det = detector(vec![
            (10, 10, 30, 10),
            (50, 11, 30, 10),
            (10, 60, 40, 10),
            (150, 80, 4, 10),
        ]);
        let lines = det.detect(&blank(200, 100)).unwrap();
        assert_eq!(
            lines,
            vec![
                LineRect { x: 6, y: 6, w: 78, h: 19 },
                LineRect { x: 6, y: 56, w: 48, h: 18 },
            ]
        );
    }

    #[test]
    fn test_lines_are_in_original_coordinates() {
        let det = detector(vec![(100, 50, 20, 10)]);
        let detection = det
            .detect_with(&blank(1920, 960), &DetectionConfig::default())
            .unwrap();
        assert_eq!(detection.plan.scale, 0.5);
        assert_eq!(detection.candidates, 1);
        assert_eq!(detection.lines, vec![LineRect { x: 196, y: 96, w: 48, h: 28 }]);

        let names: Vec<&str> = detection.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["resize", "pad", "normalize", "inference", "threshold", "contours", "group"]
        );
    }

    #[test]
    fn test_no_text_gives_no_lines() {
        let det = detector(vec![]);
        assert!(det.detect(&blank(64, 64)).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let det = detector(vec![]);
        let config = DetectionConfig {
            threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            det.detect_with(&blank(64, 64), &config),
            Err(DetectError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oversized_tunables_are_rejected() {
        let det = detector(vec![(10, 10, 30, 10)]);
        let configs = [
            DetectionConfig { merge_padding: u32::MAX, ..Default::default() },
            DetectionConfig { alignment: 65536, ..Default::default() },
            DetectionConfig { max_side: u32::MAX, ..Default::default() },
        ];
        for config in &configs {
            assert!(matches!(
                det.detect_with(&blank(64, 64), config),
                Err(DetectError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_loaded_backend_does_not_load() {
        let loads = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = loads.clone();
        let cache = ModelCache::new(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(DetectError::ModelError("model file missing".to_string()))
        });
        let det = Detector::new(cache, DetectionConfig::default()).unwrap();

        assert!(det.loaded_backend().is_none());
        assert!(det.loaded_backend().is_none());
        assert_eq!(loads.load(std::sync::atomic::Ordering::SeqCst), 0);

        let det = detector(vec![]);
        assert_eq!(det.loaded_backend().map(|b| b.description()), Some("fixed rectangles"));
    }

    #[test]
    fn test_model_load_failure_surfaces() {
        let cache = ModelCache::new(|| Err(DetectError::ModelError("model file missing".to_string())));
        let det = Detector::new(cache, DetectionConfig::default()).unwrap();
        assert!(matches!(
            det.detect(&blank(64, 64)),
            Err(DetectError::ModelError(_))
        ));
    }
}
