// handler/wallet.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{ledgerdb::LedgerExt, userdb::UserExt},
    dtos::{userdtos::FilterUserDto, walletdtos::*},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn wallet_handler() -> Router {
    Router::new()
        .route("/summary", get(get_wallet_summary))
        .route("/withdrawals", get(get_withdrawals).post(create_withdrawal))
        .route("/payments", get(get_payments).post(create_payment))
}

pub fn admin_wallet_handler() -> Router {
    Router::new()
        .route("/withdrawals", get(list_all_withdrawals))
        .route("/withdrawals/:withdrawal_id/complete", post(complete_withdrawal))
        .route("/payments", get(list_all_payments))
        .route("/payments/:payment_id/resolve", post(resolve_payment))
        .route("/commissions/credit", post(credit_commission))
}

pub async fn get_wallet_summary(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = app_state
        .db_client
        .get_wallet_summary(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: WalletSummaryDto = summary.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn get_withdrawals(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let withdrawals = app_state
        .db_client
        .get_withdrawal_requests(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: Vec<WithdrawalResponseDto> =
        withdrawals.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn create_withdrawal(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateWithdrawalDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;
    body.validate_upi_id()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let withdrawal = app_state
        .ledger_service
        .request_withdrawal(auth.user.id, body.amount_paise(), &body.upi_id)
        .await?;

    let response: WithdrawalResponseDto = withdrawal.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn list_all_withdrawals(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let withdrawals = app_state
        .db_client
        .get_all_withdrawal_requests()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: Vec<WithdrawalResponseDto> =
        withdrawals.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn complete_withdrawal(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(withdrawal_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let withdrawal = app_state
        .ledger_service
        .complete_withdrawal(withdrawal_id)
        .await?;

    let response: WithdrawalResponseDto = withdrawal.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn get_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state
        .db_client
        .get_payment_requests(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: Vec<PaymentResponseDto> = payments.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn create_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreatePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .ledger_service
        .request_payment(auth.user.id, body.amount_paise(), &body.description)
        .await?;

    let response: PaymentResponseDto = payment.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn list_all_payments(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state
        .db_client
        .get_all_payment_requests()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: Vec<PaymentResponseDto> = payments.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn resolve_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<ResolvePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .ledger_service
        .resolve_payment(payment_id, body.decision)
        .await?;

    let response: PaymentResponseDto = payment.into();
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response,
    })))
}

pub async fn credit_commission(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreditCommissionDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // The target user must exist before the ledger call so a typoed id
    // reads as 404 rather than a failed transaction.
    app_state
        .db_client
        .get_user(Some(body.user_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let user = app_state
        .ledger_service
        .credit_commission(&body.transaction_id, body.user_id, body.base_amount_paise())
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": FilterUserDto::filter_user(&user),
    })))
}
