// db/ledgerdb.rs
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::Row;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::walletmodels::*;
use crate::utils::decimal::BigDecimalHelpers;

#[async_trait]
pub trait LedgerExt {
    // Withdrawal requests
    async fn get_withdrawal_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WithdrawalRequest>, sqlx::Error>;

    async fn get_all_withdrawal_requests(&self) -> Result<Vec<WithdrawalRequest>, sqlx::Error>;

    // Payment requests
    async fn get_payment_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentRequest>, sqlx::Error>;

    async fn get_all_payment_requests(&self) -> Result<Vec<PaymentRequest>, sqlx::Error>;

    async fn insert_payment_request(
        &self,
        user_id: Uuid,
        amount: i64,
        description: String,
    ) -> Result<PaymentRequest, sqlx::Error>;

    // Commission credits (idempotence records)
    async fn get_commission_credit(
        &self,
        transaction_id: &str,
    ) -> Result<Option<CommissionCredit>, sqlx::Error>;

    // Aggregates
    async fn get_wallet_summary(&self, user_id: Uuid) -> Result<WalletSummary, sqlx::Error>;
}

#[async_trait]
impl LedgerExt for DBClient {
    async fn get_withdrawal_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WithdrawalRequest>, sqlx::Error> {
        sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            SELECT id, user_id, amount, upi_id, status, created_at, completed_at
            FROM withdrawal_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_all_withdrawal_requests(&self) -> Result<Vec<WithdrawalRequest>, sqlx::Error> {
        sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            SELECT id, user_id, amount, upi_id, status, created_at, completed_at
            FROM withdrawal_requests
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_payment_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentRequest>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRequest>(
            r#"
            SELECT id, user_id, amount, description, status, commission_earned,
                   created_at, resolved_at
            FROM payment_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_all_payment_requests(&self) -> Result<Vec<PaymentRequest>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRequest>(
            r#"
            SELECT id, user_id, amount, description, status, commission_earned,
                   created_at, resolved_at
            FROM payment_requests
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn insert_payment_request(
        &self,
        user_id: Uuid,
        amount: i64,
        description: String,
    ) -> Result<PaymentRequest, sqlx::Error> {
        sqlx::query_as::<_, PaymentRequest>(
            r#"
            INSERT INTO payment_requests (user_id, amount, description, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, user_id, amount, description, status, commission_earned,
                      created_at, resolved_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_commission_credit(
        &self,
        transaction_id: &str,
    ) -> Result<Option<CommissionCredit>, sqlx::Error> {
        sqlx::query_as::<_, CommissionCredit>(
            r#"
            SELECT id, transaction_id, user_id, base_amount, amount, created_at
            FROM commission_credits
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_wallet_summary(&self, user_id: Uuid) -> Result<WalletSummary, sqlx::Error> {
        let user_row = sqlx::query(
            "SELECT balance, total_payout, total_commission_earned FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let pending_row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) AS pending_total, COUNT(*) AS pending_count
            FROM withdrawal_requests
            WHERE user_id = $1 AND status = 'pending'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        // SUM over BIGINT comes back as NUMERIC
        let pending_total: Option<BigDecimal> = pending_row.get("pending_total");

        Ok(WalletSummary {
            balance: user_row.get("balance"),
            total_payout: user_row.get("total_payout"),
            total_commission_earned: user_row.get("total_commission_earned"),
            pending_withdrawals: pending_total.to_i64_or_zero(),
            pending_withdrawal_count: pending_row.get("pending_count"),
        })
    }
}
