use crate::domain::error::AuditError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype so the domain error can be returned from axum handlers.
pub struct ApiError(pub AuditError);

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            AuditError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
            ),
            AuditError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_input", msg.clone())
            }
            AuditError::QueueFull(_) | AuditError::QueueClosed(_) => {
                tracing::warn!("audit queue unavailable: {}", self.0);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "queue_unavailable",
                    "audit queue unavailable, retry later".to_string(),
                )
            }
            // Remote bodies and driver messages are for the logs only.
            other => {
                tracing::error!("internal error: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
