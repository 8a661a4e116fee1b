use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    models::walletmodels::{PaymentRequest, WalletSummary, WithdrawalRequest},
    service::ledger_service::PaymentDecision,
    utils::currency::{paise_to_rupees, rupees_to_paise},
};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateWithdrawalDto {
    /// Amount in rupees; converted to paise at the service boundary.
    #[validate(range(min = 0.01, message = "Amount must be positive"))]
    pub amount: f64,

    #[validate(length(min = 1, message = "UPI id is required"))]
    pub upi_id: String,
}

impl CreateWithdrawalDto {
    pub fn amount_paise(&self) -> i64 {
        rupees_to_paise(self.amount)
    }

    pub fn validate_upi_id(&self) -> Result<(), ValidationError> {
        // handle@provider, e.g. name.surname@okhdfcbank
        let upi_regex = regex::Regex::new(r"^[a-zA-Z0-9.\-_]{2,256}@[a-zA-Z]{2,64}$")
            .map_err(|_| ValidationError::new("Invalid UPI regex"))?;

        if !upi_regex.is_match(&self.upi_id) {
            let mut error = ValidationError::new("invalid_upi_id");
            error.message = Some(Cow::from("UPI id must be in the form handle@provider"));
            return Err(error);
        }
        Ok(())
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreatePaymentDto {
    #[validate(range(min = 0.01, message = "Amount must be positive"))]
    pub amount: f64,

    #[validate(length(min = 1, max = 500, message = "Description must be between 1-500 characters"))]
    pub description: String,
}

impl CreatePaymentDto {
    pub fn amount_paise(&self) -> i64 {
        rupees_to_paise(self.amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvePaymentDto {
    pub decision: PaymentDecision,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawalResponseDto {
    pub id: String,
    pub amount: f64,
    pub upi_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<WithdrawalRequest> for WithdrawalResponseDto {
    fn from(w: WithdrawalRequest) -> Self {
        WithdrawalResponseDto {
            id: w.id.to_string(),
            amount: paise_to_rupees(w.amount),
            upi_id: w.upi_id,
            status: w.status.to_str().to_string(),
            created_at: w.created_at,
            completed_at: w.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponseDto {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub status: String,
    pub commission_earned: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<PaymentRequest> for PaymentResponseDto {
    fn from(p: PaymentRequest) -> Self {
        PaymentResponseDto {
            id: p.id.to_string(),
            amount: paise_to_rupees(p.amount),
            description: p.description,
            status: p.status.to_str().to_string(),
            commission_earned: p.commission_earned.map(paise_to_rupees),
            created_at: p.created_at,
            resolved_at: p.resolved_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletSummaryDto {
    pub balance: f64,
    pub total_payout: f64,
    pub total_commission_earned: f64,
    pub pending_withdrawals: f64,
    pub pending_withdrawal_count: i64,
}

impl From<WalletSummary> for WalletSummaryDto {
    fn from(s: WalletSummary) -> Self {
        WalletSummaryDto {
            balance: paise_to_rupees(s.balance),
            total_payout: paise_to_rupees(s.total_payout),
            total_commission_earned: paise_to_rupees(s.total_commission_earned),
            pending_withdrawals: paise_to_rupees(s.pending_withdrawals),
            pending_withdrawal_count: s.pending_withdrawal_count,
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreditCommissionDto {
    #[validate(length(min = 1, message = "Transaction id is required"))]
    pub transaction_id: String,

    pub user_id: uuid::Uuid,

    /// Base amount in rupees.
    #[validate(range(min = 0.01, message = "Base amount must be positive"))]
    pub base_amount: f64,
}

impl CreditCommissionDto {
    pub fn base_amount_paise(&self) -> i64 {
        rupees_to_paise(self.base_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upi_validation() {
        let mut dto = CreateWithdrawalDto {
            amount: 1000.0,
            upi_id: "ravi.kumar@okaxis".to_string(),
        };
        assert!(dto.validate_upi_id().is_ok());

        dto.upi_id = "not a upi id".to_string();
        assert!(dto.validate_upi_id().is_err());

        dto.upi_id = "@okaxis".to_string();
        assert!(dto.validate_upi_id().is_err());
    }

    #[test]
    fn test_amount_paise_conversion() {
        let dto = CreateWithdrawalDto {
            amount: 1000.0,
            upi_id: "ravi@okaxis".to_string(),
        };
        assert_eq!(dto.amount_paise(), 100_000);
    }
}
