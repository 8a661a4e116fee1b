// db/userdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;

use crate::models::usermodel::{User, UserRole};

const USER_COLUMNS: &str = r#"
    id, name, username, email, phone, state, password, role,
    referral_code, referred_by, rank, balance, total_payout,
    total_commission_earned, referral_count, team_size,
    created_at, updated_at
"#;

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn get_users(&self) -> Result<Vec<User>, sqlx::Error>;

    #[allow(clippy::too_many_arguments)]
    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        username: T,
        email: T,
        phone: Option<String>,
        state: T,
        password: T,
        referral_code: T,
        referred_by: Option<String>,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_rank(
        &self,
        user_id: Uuid,
        rank: &str,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_role(
        &self,
        target_id: Uuid,
        role: UserRole,
    ) -> Result<User, sqlx::Error>;

    /// Write-through for the cached referral metrics. The referral tree
    /// traversal is the source of truth; this only refreshes the hint
    /// columns.
    async fn update_referral_metrics(
        &self,
        user_id: Uuid,
        referral_count: i32,
        team_size: i32,
    ) -> Result<User, sqlx::Error>;

    async fn increment_referral_count(&self, user_id: Uuid) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
            ))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(username) = username {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
            ))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE referral_code = $1"
        ))
        .bind(referral_code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        username: T,
        email: T,
        phone: Option<String>,
        state: T,
        password: T,
        referral_code: T,
        referred_by: Option<String>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, username, email, phone, state, password, referral_code, referred_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name.into())
        .bind(username.into())
        .bind(email.into())
        .bind(phone)
        .bind(state.into())
        .bind(password.into())
        .bind(referral_code.into())
        .bind(referred_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_rank(&self, user_id: Uuid, rank: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET rank = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(rank)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_role(
        &self,
        target_id: Uuid,
        role: UserRole,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(target_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_referral_metrics(
        &self,
        user_id: Uuid,
        referral_count: i32,
        team_size: i32,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET referral_count = $2, team_size = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(referral_count)
        .bind(team_size)
        .fetch_one(&self.pool)
        .await
    }

    async fn increment_referral_count(&self, user_id: Uuid) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET referral_count = referral_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
