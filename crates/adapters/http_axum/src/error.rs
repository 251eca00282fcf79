//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gardenhub_domain::error::GardenError;

/// JSON error body for every failure except validation, which returns the
/// structured `{code, message, errors}` failure as is.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GardenError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(GardenError);

impl From<GardenError> for ApiError {
    fn from(err: GardenError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            GardenError::Validation(failure) => {
                return (StatusCode::BAD_REQUEST, Json(failure)).into_response();
            }
            GardenError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            GardenError::Conflict(err) => {
                tracing::warn!(error = %err, "rejected stale write");
                (StatusCode::CONFLICT, err.to_string())
            }
            GardenError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "request cancelled".to_string(),
            ),
            GardenError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            GardenError::Transport(err) => {
                tracing::error!(error = %err, "message transport error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use gardenhub_domain::error::{ConflictError, ErrorCode, NotFoundError, ValidationFailure};

    use super::*;

    fn status_of(err: GardenError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn should_map_each_error_kind_to_its_status() {
        let validation = ValidationFailure::single(
            ErrorCode::GardenValidationFailed,
            "bad garden",
            "name",
            "Name is required.",
        );
        assert_eq!(status_of(validation.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(
                NotFoundError {
                    entity: "Garden",
                    id: "x".to_string(),
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                ConflictError {
                    entity: "Garden",
                    id: "x".to_string(),
                    expected_version: 3,
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(GardenError::Cancelled),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(GardenError::Storage("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GardenError::Transport("broker down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
