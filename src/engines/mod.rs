//! Inference backend implementations
//!
//! This module contains implementations of the InferenceBackend trait for
//! different runtimes. Backends are conditionally compiled based on feature
//! flags.

#[cfg(feature = "backend-rten")]
pub mod rten;

use crate::engine::InferenceBackend;
use crate::error::DetectError;
use std::path::Path;
use std::sync::Arc;

/// Load the detection model with the first backend compiled in
pub fn load_backend(model_path: &Path) -> Result<Arc<dyn InferenceBackend>, DetectError> {
    if !model_path.exists() {
        return Err(DetectError::ModelError(format!(
            "Model file not found: {}",
            model_path.display()
        )));
    }

    #[cfg(feature = "backend-rten")]
    let backend: Result<Arc<dyn InferenceBackend>, DetectError> = {
        tracing::info!("Initializing rten backend from {}...", model_path.display());
        rten::RtenBackend::load(model_path).map(|b| Arc::new(b) as Arc<dyn InferenceBackend>)
    };

    #[cfg(not(feature = "backend-rten"))]
    let backend: Result<Arc<dyn InferenceBackend>, DetectError> = Err(DetectError::ModelError(
        "No inference backends available. Build with --features backend-rten".to_string(),
    ));

    backend
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_a_model_error() {
        let result = load_backend(Path::new("/nonexistent/det_model.rten"));
        match result {
            Err(DetectError::ModelError(message)) => {
                assert!(message.contains("/nonexistent/det_model.rten"))
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected an error"),
        }
    }
}
