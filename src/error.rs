use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DetectError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            DetectError::InvalidInput(_) => "INVALID_INPUT",
            DetectError::ModelError(_) => "MODEL_ERROR",
            DetectError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            DetectError::MissingFile => "MISSING_FILE",
            DetectError::InvalidRequest(_) => "INVALID_REQUEST",
            DetectError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            DetectError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DetectError::ModelError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DetectError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            DetectError::MissingFile => StatusCode::BAD_REQUEST,
            DetectError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DetectError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        let err = DetectError::InvalidInput("width=0".to_string());
        assert_eq!(err.code(), "INVALID_INPUT");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = DetectError::ModelError("no outputs".to_string());
        assert_eq!(err.code(), "MODEL_ERROR");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = DetectError::ImageTooLarge { size: 10, max: 5 };
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "Image too large: 10 bytes (max: 5 bytes)");
    }

    #[test]
    fn test_into_response_status() {
        let response = DetectError::MissingFile.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
