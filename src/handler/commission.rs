// handler/commission.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::commissiondtos::*,
    error::HttpError,
    AppState,
};

pub fn admin_commission_handler() -> Router {
    Router::new()
        .route("/rules", get(list_rules).post(create_rule))
        .route("/rules/:rule_id", get(get_rule).put(update_rule))
}

pub async fn get_rule(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(rule_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let rule = app_state.commission_service.get_rule(rule_id).await?;

    let response: CommissionRuleResponseDto = rule.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn list_rules(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let rules = app_state.commission_service.list_rules().await?;

    let response: Vec<CommissionRuleResponseDto> = rules.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn create_rule(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CommissionRuleDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let rule = app_state
        .commission_service
        .create_rule(
            &body.rank,
            body.rate,
            body.minimum_referrals,
            body.minimum_team_size,
        )
        .await?;

    let response: CommissionRuleResponseDto = rule.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn update_rule(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(rule_id): Path<Uuid>,
    Json(body): Json<CommissionRuleDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let rule = app_state
        .commission_service
        .update_rule(
            rule_id,
            &body.rank,
            body.rate,
            body.minimum_referrals,
            body.minimum_team_size,
        )
        .await?;

    let response: CommissionRuleResponseDto = rule.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}
