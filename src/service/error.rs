use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Withdrawal request {0} not found")]
    WithdrawalNotFound(Uuid),

    #[error("Payment request {0} not found")]
    PaymentNotFound(Uuid),

    #[error("Commission rule {0} not found")]
    RuleNotFound(Uuid),

    #[error("Referral code {0} does not resolve to any user")]
    InvalidReferralCode(String),

    #[error("Referral graph contains a cycle through user {0}")]
    CyclicReferralGraph(Uuid),

    #[error("A commission rule for rank {0} already exists")]
    DuplicateRank(String),

    #[error("Commission rate must be between 0 and 1, got {0}")]
    InvalidRate(f64),

    #[error("Commission rule breaks rank monotonicity: {0}")]
    InvalidMonotonicity(String),

    #[error("Insufficient balance: requested {requested} paise, available {available} paise")]
    InsufficientBalance { available: i64, requested: i64 },

    #[error("Amount {requested} paise is below the minimum of {minimum} paise")]
    BelowMinimum { minimum: i64, requested: i64 },

    #[error("Withdrawal request {0} has already been completed")]
    AlreadyCompleted(Uuid),

    #[error("Payment request {0} has already been processed")]
    AlreadyProcessed(Uuid),

    #[error("Transaction {0} has already been credited")]
    AlreadyCredited(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::UserNotFound(_)
            | ServiceError::WithdrawalNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::RuleNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidReferralCode(_)
            | ServiceError::InvalidRate(_)
            | ServiceError::BelowMinimum { .. }
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,

            ServiceError::CyclicReferralGraph(_)
            | ServiceError::DuplicateRank(_)
            | ServiceError::InvalidMonotonicity(_)
            | ServiceError::AlreadyCompleted(_)
            | ServiceError::AlreadyProcessed(_)
            | ServiceError::AlreadyCredited(_) => StatusCode::CONFLICT,

            ServiceError::Database(_) | ServiceError::Notification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}
