use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub state: String,
    pub password: String,
    pub role: UserRole,

    // Referral fields. `referral_code` is generated once at registration and
    // never changes; `referred_by` holds the referrer's code, not their id.
    pub referral_code: String,
    pub referred_by: Option<String>,

    pub rank: String,

    // Monetary amounts are stored in paise (1 rupee = 100 paise).
    pub balance: i64,
    pub total_payout: i64,
    pub total_commission_earned: i64,

    // Denormalized hints, refreshed through the ledger write path. The
    // referral tree traversal is the ground truth for both.
    pub referral_count: i32,
    pub team_size: i32,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
