//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sensorhub_domain::error::SensorHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors an API handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by the coordinator or the facade.
    Core(SensorHubError),
    /// The request could not be turned into a core call (bad path segment…).
    BadRequest(String),
}

impl From<SensorHubError> for ApiError {
    fn from(err: SensorHubError) -> Self {
        Self::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Core(SensorHubError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Core(SensorHubError::DuplicateSensor { .. }) => StatusCode::CONFLICT,
            Self::Core(SensorHubError::SensorNotFound(_) | SensorHubError::TelemetryNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Core(
                SensorHubError::AttributesWriteFailed { .. }
                | SensorHubError::StoreUnavailable(_)
                | SensorHubError::Interrupted,
            ) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message) => message,
            Self::Core(err) if err.is_client_error() => err.to_string(),
            Self::Core(err) => {
                match std::error::Error::source(&err) {
                    Some(source) => tracing::error!(error = %err, %source, "store failure"),
                    None => tracing::error!(error = %err, "store failure"),
                }
                err.to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
