use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::check_auth;
use crate::errors::AppError;
use crate::models::TaskRecord;
use crate::state::AppState;
use crate::tasks::sms::{SendSmsArgs, SEND_SMS};

#[derive(Serialize)]
pub struct EnqueueResponse {
    pub task_id: String,
    pub task: String,
}

// POST /api/tasks/:name
pub async fn enqueue_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(args): Json<Value>,
) -> Result<(StatusCode, Json<EnqueueResponse>), AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let id = state.queue.enqueue(&name, args)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            task_id: id.to_string(),
            task: name,
        }),
    ))
}

// POST /api/sms
pub async fn enqueue_sms(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SendSmsArgs>,
) -> Result<(StatusCode, Json<EnqueueResponse>), AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let args = serde_json::to_value(&payload).map_err(|e| AppError::Internal(e.to_string()))?;
    let id = state.queue.enqueue(SEND_SMS, args)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            task_id: id.to_string(),
            task: SEND_SMS.to_string(),
        }),
    ))
}

// GET /api/results/:id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TaskRecord>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    state
        .queue
        .result(&id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))
}
