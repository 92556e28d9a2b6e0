use crate::config::{Config, DetectionConfig, DetectionOverrides};
use crate::detector::Detector;
use crate::engine::{InputBinding, ModelCache, PREFERRED_OUTPUT};
use crate::engines;
use crate::error::DetectError;
use crate::preprocessing::StepTiming;
use crate::types::LineRect;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<Detector>,
    pub config: Arc<Config>,
}

/// Detection response
#[derive(Serialize)]
pub struct DetectResponse {
    pub lines: Vec<LineRect>,
    pub image_width: u32,
    pub image_height: u32,
    pub processing_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    /// `None` until the model has been loaded
    pub backend: Option<String>,
    pub backend_description: Option<String>,
    pub input_bindings: Vec<String>,
    pub preferred_output: String,
    pub max_file_size_bytes: usize,
    pub defaults: DetectionConfig,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let model_path = config.model_path.clone();
    let model = ModelCache::new(move || engines::load_backend(&model_path));
    let detector = Detector::new(model, config.detection)?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        detector: Arc::new(detector),
        config: Arc::new(config),
    };

    // Load the model up front so the first request does not pay for it
    let warmup = state.detector.clone();
    match tokio::task::spawn_blocking(move || warmup.backend_name()).await? {
        Ok(name) => tracing::info!("Using {} backend", name),
        Err(e) => tracing::warn!("Model not loaded yet: {}", e),
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/detect", post(handle_detect))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle detection requests
async fn handle_detect(
    State(state): State<AppState>,
    Query(overrides): Query<DetectionOverrides>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, DetectError> {
    let start = Instant::now();
    let config = state.detector.config().with_overrides(&overrides)?;

    let mut file_data: Option<Bytes> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DetectError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() == Some("file") {
            file_data = Some(field.bytes().await.map_err(|e| {
                DetectError::InvalidRequest(format!("Failed to read file data: {}", e))
            })?);
        }
    }

    // Validate file was provided
    let data = file_data.ok_or(DetectError::MissingFile)?;

    // Check file size
    if data.len() > state.config.max_file_size {
        return Err(DetectError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    // Decode and detect off the async runtime
    let detector = state.detector.clone();
    let (detection, dimensions) = tokio::task::spawn_blocking(move || {
        let image = image::load_from_memory(&data)
            .map_err(|e| DetectError::InvalidInput(format!("Failed to decode image: {}", e)))?;
        let dimensions = (image.width(), image.height());
        detector
            .detect_with(&image, &config)
            .map(|detection| (detection, dimensions))
    })
    .await
    .map_err(|e| DetectError::Internal(format!("Detection task failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Detection completed in {}ms, {}x{} image, {} lines",
        processing_time_ms,
        dimensions.0,
        dimensions.1,
        detection.lines.len()
    );

    Ok(Json(DetectResponse {
        lines: detection.lines,
        image_width: dimensions.0,
        image_height: dimensions.1,
        processing_time_ms,
        steps: detection.steps,
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.detector.loaded_backend();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: backend.as_ref().map(|b| b.name().to_string()),
        backend_description: backend.as_ref().map(|b| b.description().to_string()),
        input_bindings: InputBinding::FALLBACK_ORDER
            .iter()
            .map(|b| b.input_name().to_string())
            .collect(),
        preferred_output: PREFERRED_OUTPUT.to_string(),
        max_file_size_bytes: state.config.max_file_size,
        defaults: *state.detector.config(),
    })
}
