// services/ledger_service.rs
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, ledgerdb::LedgerExt, userdb::UserExt},
    models::{
        commissionmodel::CommissionRate,
        usermodel::User,
        walletmodels::{PaymentRequest, WithdrawalRequest, WithdrawalStatus},
    },
    service::{
        commission_service::{compute_commission, rate_for_metrics},
        error::ServiceError,
        notification_service::NotificationService,
    },
    utils::currency::format_paise_as_rupees,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDecision {
    Approve,
    Reject,
}

/// Sole writer of the balance columns on user rows. Every flow that moves
/// money runs inside a single database transaction with the user row locked,
/// so two concurrent requests cannot both spend the same balance.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    minimum_withdrawal: i64,
}

impl LedgerService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        minimum_withdrawal: i64,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            minimum_withdrawal,
        }
    }

    pub fn minimum_withdrawal(&self) -> i64 {
        self.minimum_withdrawal
    }

    /// Registration-time referral edge. Resolves the referral code to an
    /// existing user or fails; no money moves here.
    pub async fn resolve_referrer(&self, referral_code: &str) -> Result<User, ServiceError> {
        self.db_client
            .get_user_by_referral_code(referral_code)
            .await?
            .ok_or_else(|| ServiceError::InvalidReferralCode(referral_code.to_string()))
    }

    /// Called after the referee row exists. Bumps the referrer's cached
    /// direct-referral count and tells them about their new team member.
    pub async fn record_referral(
        &self,
        referrer: &User,
        referee: &User,
    ) -> Result<(), ServiceError> {
        self.db_client.increment_referral_count(referrer.id).await?;

        tracing::info!(
            "referral recorded: {} referred {}",
            referrer.username,
            referee.username
        );

        self.notify_silent(
            referrer.id,
            "New Team Member",
            &format!("{} just joined your team using your referral code.", referee.name),
        )
        .await;

        Ok(())
    }

    /// Reserve funds and open a pending withdrawal in one transaction.
    /// The balance decrement happens at request time, not completion time,
    /// so the same funds cannot be requested twice.
    pub async fn request_withdrawal(
        &self,
        user_id: Uuid,
        amount: i64,
        upi_id: &str,
    ) -> Result<WithdrawalRequest, ServiceError> {
        if amount < self.minimum_withdrawal {
            return Err(ServiceError::BelowMinimum {
                minimum: self.minimum_withdrawal,
                requested: amount,
            });
        }

        let mut tx = self.db_client.pool.begin().await?;

        let row = sqlx::query("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let balance: i64 = row.get("balance");
        if balance < amount {
            // Dropping the transaction rolls everything back; no partial row.
            return Err(ServiceError::InsufficientBalance {
                available: balance,
                requested: amount,
            });
        }

        sqlx::query("UPDATE users SET balance = balance - $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(amount)
            .execute(&mut *tx)
            .await?;

        let withdrawal = sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            INSERT INTO withdrawal_requests (user_id, amount, upi_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, user_id, amount, upi_id, status, created_at, completed_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(upi_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notify_silent(
            user_id,
            "Withdrawal Request Submitted",
            &format!(
                "Your withdrawal request of {} has been submitted.",
                format_paise_as_rupees(amount)
            ),
        )
        .await;

        Ok(withdrawal)
    }

    /// Admin approval: pending -> completed, terminal. The balance was
    /// already reserved at request time and is not touched again.
    pub async fn complete_withdrawal(
        &self,
        withdrawal_id: Uuid,
    ) -> Result<WithdrawalRequest, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let withdrawal = sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            SELECT id, user_id, amount, upi_id, status, created_at, completed_at
            FROM withdrawal_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(withdrawal_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::WithdrawalNotFound(withdrawal_id))?;

        if withdrawal.status != WithdrawalStatus::Pending {
            return Err(ServiceError::AlreadyCompleted(withdrawal_id));
        }

        let updated = sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            UPDATE withdrawal_requests
            SET status = 'completed', completed_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, amount, upi_id, status, created_at, completed_at
            "#,
        )
        .bind(withdrawal_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET total_payout = total_payout + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(withdrawal.user_id)
        .bind(withdrawal.amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notify_silent(
            withdrawal.user_id,
            "Withdrawal Request Completed",
            &format!(
                "Your withdrawal request of {} has been completed.",
                format_paise_as_rupees(withdrawal.amount)
            ),
        )
        .await;

        Ok(updated)
    }

    pub async fn request_payment(
        &self,
        user_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<PaymentRequest, ServiceError> {
        if amount < self.minimum_withdrawal {
            return Err(ServiceError::BelowMinimum {
                minimum: self.minimum_withdrawal,
                requested: amount,
            });
        }

        let user = self
            .db_client
            .get_user(Some(user_id), None, None)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let payment = self
            .db_client
            .insert_payment_request(user.id, amount, description.to_string())
            .await?;

        self.notify_silent(
            user.id,
            "Payment Request Submitted",
            &format!(
                "Your payment request of {} has been submitted for review.",
                format_paise_as_rupees(amount)
            ),
        )
        .await;

        Ok(payment)
    }

    /// Admin decision on a pending payment request. Approval credits
    /// commission at the rate the user qualifies for right now and records
    /// it on the request; rejection moves no money. Both are terminal.
    pub async fn resolve_payment(
        &self,
        payment_id: Uuid,
        decision: PaymentDecision,
    ) -> Result<PaymentRequest, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let payment = sqlx::query_as::<_, PaymentRequest>(
            r#"
            SELECT id, user_id, amount, description, status, commission_earned,
                   created_at, resolved_at
            FROM payment_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        if payment.status.is_terminal() {
            return Err(ServiceError::AlreadyProcessed(payment_id));
        }

        let updated = match decision {
            PaymentDecision::Reject => {
                let updated = sqlx::query_as::<_, PaymentRequest>(
                    r#"
                    UPDATE payment_requests
                    SET status = 'rejected', resolved_at = NOW()
                    WHERE id = $1
                    RETURNING id, user_id, amount, description, status, commission_earned,
                              created_at, resolved_at
                    "#,
                )
                .bind(payment_id)
                .fetch_one(&mut *tx)
                .await?;

                tx.commit().await?;

                self.notify_silent(
                    payment.user_id,
                    "Payment Request Rejected",
                    &format!(
                        "Your payment request of {} was rejected.",
                        format_paise_as_rupees(payment.amount)
                    ),
                )
                .await;

                updated
            }
            PaymentDecision::Approve => {
                let user_row = sqlx::query(
                    "SELECT referral_count, team_size FROM users WHERE id = $1 FOR UPDATE",
                )
                .bind(payment.user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(ServiceError::UserNotFound(payment.user_id))?;

                let rules = commission_rules_in_tx(&mut tx).await?;
                let rate = rate_for_metrics(
                    &rules,
                    user_row.get("referral_count"),
                    user_row.get("team_size"),
                );
                let commission = compute_commission(payment.amount, rate);

                let updated = sqlx::query_as::<_, PaymentRequest>(
                    r#"
                    UPDATE payment_requests
                    SET status = 'completed', commission_earned = $2, resolved_at = NOW()
                    WHERE id = $1
                    RETURNING id, user_id, amount, description, status, commission_earned,
                              created_at, resolved_at
                    "#,
                )
                .bind(payment_id)
                .bind(commission)
                .fetch_one(&mut *tx)
                .await?;

                sqlx::query(
                    r#"
                    UPDATE users
                    SET balance = balance + $2,
                        total_commission_earned = total_commission_earned + $2,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(payment.user_id)
                .bind(commission)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;

                self.notify_silent(
                    payment.user_id,
                    "Payment Request Approved",
                    &format!(
                        "Your payment request of {} was approved. Commission earned: {}.",
                        format_paise_as_rupees(payment.amount),
                        format_paise_as_rupees(commission)
                    ),
                )
                .await;

                updated
            }
        };

        Ok(updated)
    }

    /// Credit commission for a completed qualifying transaction. Idempotent
    /// per `transaction_id`: the unique insert into `commission_credits`
    /// happens in the same transaction as the balance increment, so a retry
    /// can never credit twice.
    pub async fn credit_commission(
        &self,
        transaction_id: &str,
        user_id: Uuid,
        base_amount: i64,
    ) -> Result<User, ServiceError> {
        if base_amount <= 0 {
            return Err(ServiceError::Validation(
                "Base amount must be positive".to_string(),
            ));
        }

        // Fast path for retries; the unique insert below is the real guard.
        if self
            .db_client
            .get_commission_credit(transaction_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyCredited(transaction_id.to_string()));
        }

        let mut tx = self.db_client.pool.begin().await?;

        let user_row = sqlx::query(
            "SELECT referral_count, team_size FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::UserNotFound(user_id))?;

        let rules = commission_rules_in_tx(&mut tx).await?;
        let rate = rate_for_metrics(
            &rules,
            user_row.get("referral_count"),
            user_row.get("team_size"),
        );
        let amount = compute_commission(base_amount, rate);

        sqlx::query(
            r#"
            INSERT INTO commission_credits (transaction_id, user_id, base_amount, amount)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(transaction_id)
        .bind(user_id)
        .bind(base_amount)
        .bind(amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ServiceError::AlreadyCredited(transaction_id.to_string())
            }
            _ => ServiceError::Database(e),
        })?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET balance = balance + $2,
                total_commission_earned = total_commission_earned + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, username, email, phone, state, password, role,
                      referral_code, referred_by, rank, balance, total_payout,
                      total_commission_earned, referral_count, team_size,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notify_silent(
            user_id,
            "Commission Credited",
            &format!(
                "A commission of {} has been credited to your wallet.",
                format_paise_as_rupees(amount)
            ),
        )
        .await;

        Ok(user)
    }

    /// Write-through for the cached referral metrics; the values come from a
    /// full tree traversal on the read side.
    pub async fn refresh_team_metrics(
        &self,
        user_id: Uuid,
        referral_count: i32,
        team_size: i32,
    ) -> Result<User, ServiceError> {
        Ok(self
            .db_client
            .update_referral_metrics(user_id, referral_count, team_size)
            .await?)
    }

    // Notifications document ledger transitions; their failure must never
    // roll one back, so errors end up in the log and nowhere else.
    async fn notify_silent(&self, user_id: Uuid, subject: &str, message: &str) {
        if let Err(e) = self
            .notification_service
            .notify(user_id, subject, message)
            .await
        {
            tracing::warn!("failed to deliver notification to {}: {}", user_id, e);
        }
    }
}

async fn commission_rules_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> Result<Vec<CommissionRate>, sqlx::Error> {
    sqlx::query_as::<_, CommissionRate>(
        r#"
        SELECT id, rank, rate, minimum_referrals, minimum_team_size,
               created_at, updated_at
        FROM commission_rates
        ORDER BY rate ASC
        "#,
    )
    .fetch_all(&mut **tx)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::walletmodels::PaymentStatus;

    #[test]
    fn payment_decision_deserializes_lowercase() {
        let approve: PaymentDecision = serde_json::from_str("\"approve\"").unwrap();
        let reject: PaymentDecision = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(approve, PaymentDecision::Approve);
        assert_eq!(reject, PaymentDecision::Reject);
        assert!(serde_json::from_str::<PaymentDecision>("\"cancel\"").is_err());
    }

    #[test]
    fn payment_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
    }
}
