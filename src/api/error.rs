use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::WanderError;

/// Error body sent to the browser: `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map a planner error onto a response.
    ///
    /// Client mistakes keep their message; everything else is logged with
    /// the provider payload and answered with `generic`.
    pub fn from_error(err: WanderError, generic: &str) -> Self {
        if err.is_client_error() {
            tracing::debug!("Rejected request: {}", err);
            return Self::bad_request(err.user_message());
        }

        match err.payload() {
            Some(payload) => tracing::error!(%payload, "{}", err),
            None => tracing::error!("{}", err),
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: generic.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
