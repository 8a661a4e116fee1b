use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::commissionmodel::CommissionRate;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CommissionRuleDto {
    #[validate(length(min = 1, max = 50, message = "Rank label is required"))]
    pub rank: String,

    /// Fraction in [0, 1]; range re-checked by the rules engine.
    #[validate(range(min = 0.0, max = 1.0, message = "Rate must be between 0 and 1"))]
    pub rate: f64,

    #[validate(range(min = 0, message = "Minimum referrals cannot be negative"))]
    pub minimum_referrals: i32,

    #[validate(range(min = 0, message = "Minimum team size cannot be negative"))]
    pub minimum_team_size: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommissionRuleResponseDto {
    pub id: String,
    pub rank: String,
    pub rate: f64,
    pub minimum_referrals: i32,
    pub minimum_team_size: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommissionRate> for CommissionRuleResponseDto {
    fn from(rule: CommissionRate) -> Self {
        CommissionRuleResponseDto {
            id: rule.id.to_string(),
            rank: rule.rank,
            rate: rule.rate,
            minimum_referrals: rule.minimum_referrals,
            minimum_team_size: rule.minimum_team_size,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SendNotificationDto {
    pub user_id: uuid::Uuid,

    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, max = 2000, message = "Message is required"))]
    pub message: String,
}
