// handler/users.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    utils::referral_code::generate_referral_link,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/commission-rate", get(get_my_commission_rate))
        .route("/me/referrals", get(get_referral_stats))
        .route("/me/referrals/tree", get(get_my_referral_tree))
}

pub fn admin_users_handler() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:user_id/referrals/tree", get(get_user_referral_tree))
        .route(
            "/by-code/:referral_code/referrals/tree",
            get(get_user_referral_tree_by_code),
        )
        .route("/:user_id/role", patch(update_user_role))
}

/// Profile endpoint. The cached referral metrics and rank are refreshed
/// here when they drift from the traversal-computed values, so the dashboard
/// numbers stay honest without a background job.
pub async fn get_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let mut user = auth.user;

    let (referral_count, team_size) = app_state
        .referral_service
        .compute_referral_metrics(user.id)
        .await?;

    if user.referral_count != referral_count || user.team_size != team_size {
        user = app_state
            .ledger_service
            .refresh_team_metrics(user.id, referral_count, team_size)
            .await?;
    }

    let rank = app_state
        .commission_service
        .rank_for(referral_count, team_size)
        .await?
        .unwrap_or_else(|| "Newcomer".to_string());
    if user.rank != rank {
        user = app_state
            .db_client
            .update_user_rank(user.id, &rank)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
    }

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn get_referral_stats(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state
        .referral_service
        .get_referral_stats(auth.user.id)
        .await?;

    let referral_link =
        generate_referral_link(&app_state.env.app_url, &auth.user.referral_code);

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": stats,
        "referral_link": referral_link,
    })))
}

pub async fn get_my_commission_rate(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let rate = app_state.commission_service.rate_for(&auth.user).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "rate": rate,
            "rank": auth.user.rank,
        },
    })))
}

pub async fn get_my_referral_tree(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let tree = app_state
        .referral_service
        .build_referral_tree(auth.user.id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": tree,
    })))
}

pub async fn get_user_referral_tree(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let tree = app_state
        .referral_service
        .build_referral_tree(user_id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": tree,
    })))
}

pub async fn get_user_referral_tree_by_code(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(referral_code): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let tree = app_state
        .referral_service
        .build_referral_tree_by_code(&referral_code)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": tree,
    })))
}

pub async fn update_user_role(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<RoleUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_user(Some(user_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let user = app_state
        .db_client
        .update_user_role(user_id, body.role)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn list_users(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let users = app_state
        .db_client
        .get_users()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered = FilterUserDto::filter_users(&users);

    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        results: filtered.len(),
        users: filtered,
    }))
}
