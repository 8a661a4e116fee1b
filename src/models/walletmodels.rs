use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "withdrawal_status", rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
}

impl WithdrawalStatus {
    pub fn to_str(&self) -> &str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Rejected,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Rejected => "rejected",
        }
    }

    /// `pending` is the only state with outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct WithdrawalRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub upi_id: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct PaymentRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub description: String,
    pub status: PaymentStatus,
    pub commission_earned: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Idempotence record for commission credits. One row per source
/// transaction; the unique constraint on `transaction_id` is what stops a
/// retry from crediting twice.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct CommissionCredit {
    pub id: Uuid,
    pub transaction_id: String,
    pub user_id: Uuid,
    pub base_amount: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Aggregate view of a user's wallet, assembled from SQL aggregates.
#[derive(Debug, Deserialize, Serialize)]
pub struct WalletSummary {
    pub balance: i64,
    pub total_payout: i64,
    pub total_commission_earned: i64,
    pub pending_withdrawals: i64,
    pub pending_withdrawal_count: i64,
}
