use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::AuditError, log_record::LogSubmission, task::QueueClass},
    },
    axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
    },
    chrono::{DateTime, Utc},
    serde::Deserialize,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/audit-logs", post(enqueue_log))
        .route("/revocations", post(revoke_token))
        .route("/revocations/{jti}", get(revocation_status))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    #[serde(default)]
    pub queue: Option<QueueClass>,
    #[serde(flatten)]
    pub submission: LogSubmission,
}

pub async fn enqueue_log(
    State(state): State<AppState>,
    Json(req): Json<EnqueueRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if req.submission.message.trim().is_empty() {
        return Err(AuditError::Validation("message must not be empty".into()).into());
    }

    let queue = req.queue.unwrap_or(QueueClass::Short);
    let action = req.submission.action.clone();
    let task_id = state.queue.submit(queue, req.submission)?;
    tracing::info!(%task_id, %queue, action = %action, "audit log accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "accepted", "task_id": task_id})),
    ))
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn revoke_token(
    State(state): State<AppState>,
    Json(req): Json<RevokeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.jti.is_empty() {
        return Err(AuditError::Validation("jti must not be empty".into()).into());
    }
    state.revocations.revoke(req.jti.clone(), req.expires_at).await;
    Ok(Json(serde_json::json!({"status": "revoked", "jti": req.jti})))
}

pub async fn revocation_status(
    State(state): State<AppState>,
    Path(jti): Path<String>,
) -> Json<serde_json::Value> {
    let revoked = state.revocations.is_revoked(&jti).await;
    Json(serde_json::json!({"jti": jti, "revoked": revoked}))
}
