// handler/notification_handler.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::commissiondtos::SendNotificationDto,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notification_handler() -> Router {
    Router::new()
        .route("/", get(get_inbox))
        .route("/:notification_id/read", patch(mark_read))
}

pub fn admin_notification_handler() -> Router {
    Router::new().route("/", post(send_notification))
}

pub async fn get_inbox(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let notifications = app_state.notification_service.inbox(auth.user.id).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": notifications,
    })))
}

pub async fn mark_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let notification = app_state
        .notification_service
        .mark_read(notification_id, auth.user.id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": notification,
    })))
}

pub async fn send_notification(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SendNotificationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    app_state
        .db_client
        .get_user(Some(body.user_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let notification = app_state
        .notification_service
        .notify(body.user_id, &body.subject, &body.message)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": notification,
    })))
}
