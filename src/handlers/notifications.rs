use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::Notification;
use crate::services::notifications;
use crate::state::AppState;

// GET /api/notifications
pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(notifications::list(&state.store)?))
}

// POST /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    notifications::mark_read(&state.store, &id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
