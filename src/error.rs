use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request bytes could not be decoded into the model input shape.
    #[error("invalid image format: {0}")]
    InvalidImage(#[from] image::ImageError),

    /// Multipart request carried no usable `file` part.
    #[error("no file uploaded")]
    MissingFile,

    #[error("malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),

    /// Downloading the image from the supplied URL failed.
    #[error("failed to download image: {0}")]
    ImageFetch(#[from] reqwest::Error),

    #[error("model not loaded")]
    ModelUnavailable,
}

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidImage(_)
            | ServiceError::MissingFile
            | ServiceError::Multipart(_) => StatusCode::BAD_REQUEST,
            ServiceError::ImageFetch(_) => StatusCode::BAD_GATEWAY,
            ServiceError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        let decode_failure = ServiceError::InvalidImage(image::ImageError::IoError(
            std::io::Error::new(std::io::ErrorKind::InvalidData, "not an image"),
        ));
        assert_eq!(
            decode_failure.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::MissingFile.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_model_maps_to_503() {
        assert_eq!(
            ServiceError::ModelUnavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
