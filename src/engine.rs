use crate::error::DetectError;
use crate::types::{InputTensor, ProbabilityMap};
use std::sync::{Arc, Mutex, OnceLock};

/// Output key the reference detection model uses for its probability map
pub const PREFERRED_OUTPUT: &str = "fetch_name_0";

/// A model output as reported by a backend
#[derive(Debug, Clone)]
pub struct OutputTensor {
    pub shape: Vec<usize>,
    /// `None` when the output is not an f32 tensor
    pub data: Option<Vec<f32>>,
}

/// Model outputs keyed by name, in the order the model declares them
pub type NamedOutputs = Vec<(String, OutputTensor)>;

/// Trait that all inference backends must implement
pub trait InferenceBackend: Send + Sync {
    /// Returns the backend identifier (e.g., "rten")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the backend
    fn description(&self) -> &'static str;

    /// Run the model with `tensor` bound to the input called `input_name`
    ///
    /// Must fail if the model has no such input or rejects the tensor.
    fn run(&self, input_name: &str, tensor: &InputTensor) -> Result<NamedOutputs, DetectError>;
}

/// Input names tried in order when feeding the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    /// `x`, used by PaddleOCR exports
    Primary,
    /// `images`, used by some re-exported models
    Alternate,
}

impl InputBinding {
    pub const FALLBACK_ORDER: [InputBinding; 2] = [InputBinding::Primary, InputBinding::Alternate];

    pub fn input_name(&self) -> &'static str {
        match self {
            InputBinding::Primary => "x",
            InputBinding::Alternate => "images",
        }
    }
}

/// Run the model and extract its probability map
///
/// Input bindings are tried in [`InputBinding::FALLBACK_ORDER`]; the first
/// one the backend accepts wins. The map's size is read from the output's
/// own shape rather than assumed from the input.
pub fn infer(backend: &dyn InferenceBackend, tensor: &InputTensor) -> Result<ProbabilityMap, DetectError> {
    if tensor.data.len() != tensor.shape().iter().product::<usize>() {
        return Err(DetectError::InvalidInput(format!(
            "Tensor has {} values but shape {:?}",
            tensor.data.len(),
            tensor.shape()
        )));
    }

    let mut first_error: Option<DetectError> = None;
    for binding in InputBinding::FALLBACK_ORDER {
        match backend.run(binding.input_name(), tensor) {
            Ok(outputs) => {
                if binding != InputBinding::Primary {
                    tracing::debug!("Model accepted fallback input '{}'", binding.input_name());
                }
                return select_output(outputs);
            }
            Err(e) => {
                tracing::debug!("Input '{}' rejected: {}", binding.input_name(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    let names: Vec<String> = InputBinding::FALLBACK_ORDER
        .iter()
        .map(|b| format!("'{}'", b.input_name()))
        .collect();
    Err(DetectError::ModelError(format!(
        "Failed to run inference with inputs {}. Original error: {}",
        names.join(" and "),
        first_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Pick the probability map from the model outputs
///
/// Uses [`PREFERRED_OUTPUT`] when present, otherwise the first output. Fails
/// with the list of available keys when the chosen output is not a usable
/// f32 map.
pub fn select_output(outputs: NamedOutputs) -> Result<ProbabilityMap, DetectError> {
    let available = || {
        outputs
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let invalid = || {
        DetectError::ModelError(format!(
            "Invalid output tensor. Available keys: {}",
            available()
        ))
    };

    let (_, output) = outputs
        .iter()
        .find(|(name, _)| name == PREFERRED_OUTPUT)
        .or_else(|| outputs.first())
        .ok_or_else(invalid)?;

    let data = output.data.as_ref().ok_or_else(invalid)?;
    let &[.., height, width] = output.shape.as_slice() else {
        return Err(invalid());
    };
    if width == 0 || height == 0 || data.len() != width * height {
        return Err(invalid());
    }

    Ok(ProbabilityMap {
        data: data.clone(),
        width: width as u32,
        height: height as u32,
    })
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn InferenceBackend>, DetectError> + Send + Sync>;

/// Lazily loaded, shared inference backend
///
/// The loader runs at most once successfully; concurrent first calls wait on
/// the same initialization. A failed load is not cached, so the next call
/// tries again.
pub struct ModelCache {
    loader: Loader,
    slot: OnceLock<Arc<dyn InferenceBackend>>,
    init: Mutex<()>,
}

impl ModelCache {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn InferenceBackend>, DetectError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            slot: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// A cache that already holds `backend`
    pub fn preloaded(backend: Arc<dyn InferenceBackend>) -> Self {
        let cache = Self::new({
            let backend = backend.clone();
            move || Ok(backend.clone())
        });
        let _ = cache.slot.set(backend);
        cache
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The backend if it is already loaded; never triggers a load
    pub fn loaded(&self) -> Option<Arc<dyn InferenceBackend>> {
        self.slot.get().cloned()
    }

    /// Get the backend, loading it on first use
    pub fn get(&self) -> Result<Arc<dyn InferenceBackend>, DetectError> {
        if let Some(backend) = self.slot.get() {
            return Ok(backend.clone());
        }

        let _guard = self
            .init
            .lock()
            .map_err(|_| DetectError::Internal("Model loader lock poisoned".to_string()))?;
        if let Some(backend) = self.slot.get() {
            return Ok(backend.clone());
        }

        tracing::info!("Loading detection model...");
        let backend = (self.loader)()?;
        tracing::info!("{} backend loaded", backend.name());
        let _ = self.slot.set(backend.clone());
        Ok(backend)
    }
}
