use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use vellum_index::IndexError;
use vellum_sdk::SdkError;
use vellum_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Sdk(#[from] SdkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Sdk(SdkError::NotFound(_))
            | Self::Sdk(SdkError::Store(StoreError::NotFound(_)))
            | Self::Sdk(SdkError::Index(IndexError::NoResults)) => StatusCode::NOT_FOUND,
            Self::Sdk(SdkError::Store(StoreError::ContentMismatch { .. })) => {
                StatusCode::FORBIDDEN
            }
            Self::Sdk(SdkError::Index(IndexError::Query(_))) => StatusCode::BAD_REQUEST,
            Self::Sdk(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        Self::Sdk(e.into())
    }
}

impl From<IndexError> for ServerError {
    fn from(e: IndexError) -> Self {
        Self::Sdk(e.into())
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
