//! rten backend implementation
//!
//! Pure Rust inference using the rten runtime. No system dependencies
//! required. Models must be in `.rten` format (convert ONNX exports with
//! `rten-convert`).

use crate::engine::{InferenceBackend, NamedOutputs, OutputTensor};
use crate::error::DetectError;
use crate::types::InputTensor;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::{NdTensor, Tensor};
use std::path::Path;

/// Inference backend wrapping an rten model
pub struct RtenBackend {
    model: Model,
}

impl RtenBackend {
    pub fn load(path: &Path) -> Result<Self, DetectError> {
        let model = Model::load_file(path).map_err(|e| {
            DetectError::ModelError(format!("Failed to load detection model: {}", e))
        })?;

        tracing::info!(
            "rten model loaded: inputs [{}], outputs [{}]",
            node_names(&model, model.input_ids()).join(", "),
            node_names(&model, model.output_ids()).join(", ")
        );

        Ok(Self { model })
    }
}

fn node_name(model: &Model, id: rten::NodeId) -> String {
    model
        .node_info(id)
        .and_then(|info| info.name().map(str::to_string))
        .unwrap_or_else(|| format!("#{:?}", id))
}

fn node_names(model: &Model, ids: &[rten::NodeId]) -> Vec<String> {
    ids.iter().map(|&id| node_name(model, id)).collect()
}

impl InferenceBackend for RtenBackend {
    fn name(&self) -> &'static str {
        "rten"
    }

    fn description(&self) -> &'static str {
        "Pure Rust model runtime - no system dependencies required"
    }

    fn run(&self, input_name: &str, tensor: &InputTensor) -> Result<NamedOutputs, DetectError> {
        let input_id = self.model.find_node(input_name).ok_or_else(|| {
            DetectError::ModelError(format!("Model has no input named '{}'", input_name))
        })?;

        let input = NdTensor::from_data(tensor.shape(), tensor.data.clone());
        let output_ids = self.model.output_ids().to_vec();

        let outputs = self
            .model
            .run(vec![(input_id, input.view().into())], &output_ids, None)
            .map_err(|e| DetectError::ModelError(format!("Inference failed: {}", e)))?;

        Ok(output_ids
            .iter()
            .zip(outputs)
            .map(|(&id, output)| {
                let named = match Tensor::<f32>::try_from(output) {
                    Ok(t) => OutputTensor {
                        shape: t.shape().to_vec(),
                        data: Some(t.to_vec()),
                    },
                    Err(_) => OutputTensor {
                        shape: Vec::new(),
                        data: None,
                    },
                };
                (node_name(&self.model, id), named)
            })
            .collect())
    }
}
