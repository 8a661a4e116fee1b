use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::usermodel::User;

/// Public projection of a user inside the referral tree. Password and other
/// account internals never leave the server through this path.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReferralUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub referral_code: String,
    pub rank: String,
    pub joined_at: DateTime<Utc>,
}

impl From<&User> for ReferralUser {
    fn from(user: &User) -> Self {
        ReferralUser {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            referral_code: user.referral_code.clone(),
            rank: user.rank.clone(),
            joined_at: user.created_at,
        }
    }
}

/// A user plus the recursively built list of users they directly referred.
/// Rebuilt on every read, never persisted.
#[derive(Debug, Deserialize, Serialize)]
pub struct ReferralNode {
    pub user: ReferralUser,
    pub referrals: Vec<ReferralNode>,
}

impl ReferralNode {
    /// Count of all nodes in the subtree excluding this one.
    pub fn team_size(&self) -> usize {
        self.referrals.iter().map(|r| 1 + r.team_size()).sum()
    }

    pub fn direct_referrals(&self) -> usize {
        self.referrals.len()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReferralStats {
    pub referral_count: i32,
    pub team_size: i32,
    pub direct_referrals: Vec<ReferralUser>,
}
