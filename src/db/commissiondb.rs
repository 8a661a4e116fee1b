// db/commissiondb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::commissionmodel::CommissionRate;

#[async_trait]
pub trait CommissionExt {
    async fn list_commission_rules(&self) -> Result<Vec<CommissionRate>, sqlx::Error>;

    async fn get_commission_rule(
        &self,
        rule_id: Uuid,
    ) -> Result<Option<CommissionRate>, sqlx::Error>;

    async fn insert_commission_rule(
        &self,
        rank: &str,
        rate: f64,
        minimum_referrals: i32,
        minimum_team_size: i32,
    ) -> Result<CommissionRate, sqlx::Error>;

    async fn update_commission_rule(
        &self,
        rule_id: Uuid,
        rank: &str,
        rate: f64,
        minimum_referrals: i32,
        minimum_team_size: i32,
    ) -> Result<CommissionRate, sqlx::Error>;
}

#[async_trait]
impl CommissionExt for DBClient {
    async fn list_commission_rules(&self) -> Result<Vec<CommissionRate>, sqlx::Error> {
        sqlx::query_as::<_, CommissionRate>(
            r#"
            SELECT id, rank, rate, minimum_referrals, minimum_team_size,
                   created_at, updated_at
            FROM commission_rates
            ORDER BY rate ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_commission_rule(
        &self,
        rule_id: Uuid,
    ) -> Result<Option<CommissionRate>, sqlx::Error> {
        sqlx::query_as::<_, CommissionRate>(
            r#"
            SELECT id, rank, rate, minimum_referrals, minimum_team_size,
                   created_at, updated_at
            FROM commission_rates
            WHERE id = $1
            "#,
        )
        .bind(rule_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_commission_rule(
        &self,
        rank: &str,
        rate: f64,
        minimum_referrals: i32,
        minimum_team_size: i32,
    ) -> Result<CommissionRate, sqlx::Error> {
        sqlx::query_as::<_, CommissionRate>(
            r#"
            INSERT INTO commission_rates (rank, rate, minimum_referrals, minimum_team_size)
            VALUES ($1, $2, $3, $4)
            RETURNING id, rank, rate, minimum_referrals, minimum_team_size,
                      created_at, updated_at
            "#,
        )
        .bind(rank)
        .bind(rate)
        .bind(minimum_referrals)
        .bind(minimum_team_size)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_commission_rule(
        &self,
        rule_id: Uuid,
        rank: &str,
        rate: f64,
        minimum_referrals: i32,
        minimum_team_size: i32,
    ) -> Result<CommissionRate, sqlx::Error> {
        sqlx::query_as::<_, CommissionRate>(
            r#"
            UPDATE commission_rates
            SET rank = $2, rate = $3, minimum_referrals = $4,
                minimum_team_size = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, rank, rate, minimum_referrals, minimum_team_size,
                      created_at, updated_at
            "#,
        )
        .bind(rule_id)
        .bind(rank)
        .bind(rate)
        .bind(minimum_referrals)
        .bind(minimum_team_size)
        .fetch_one(&self.pool)
        .await
    }
}
