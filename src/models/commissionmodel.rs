use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named rank tied to a commission rate. A user qualifies for a rule when
/// both minimums are at or below their current referral metrics.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct CommissionRate {
    pub id: Uuid,
    pub rank: String,
    /// Fraction in [0, 1], e.g. 0.05 for 5%.
    pub rate: f64,
    pub minimum_referrals: i32,
    pub minimum_team_size: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
