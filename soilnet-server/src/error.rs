use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use soilnet::service::ServiceError;

/// An error response in the `{"error": ...}` shape the front-end expects.
///
/// Client faults keep their message; server faults answer with a generic
/// one and the detail stays in the log.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::from("Inference failed"),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MissingInput => Self::bad_request("No image uploaded"),
            err if err.is_client_error() => {
                log::warn!("rejected request: {err}");
                Self::bad_request(err.to_string())
            }
            err => {
                log::error!("inference failed: {err}");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
        }

        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
