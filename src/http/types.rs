use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self { Self { status, message: message.into() } }

    pub fn not_found() -> Self { Self::new(StatusCode::NOT_FOUND, "Not found") }

    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        let message = format!("{e:#}");
        tracing::error!(error = %message, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response { (self.status, axum::Json(self)).into_response() }
}
