// services/referral_service.rs
use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{db::DBClient, userdb::UserExt},
    models::{
        referralmodel::{ReferralNode, ReferralStats, ReferralUser},
        usermodel::User,
    },
    service::error::ServiceError,
};

/// Read-side view over the referral forest. Users hold a `referred_by`
/// reference to their referrer's code; this service turns that flat relation
/// into a tree for dashboards and team-size computation. It never writes
/// user rows.
#[derive(Debug, Clone)]
pub struct ReferralService {
    db_client: Arc<DBClient>,
}

/// Build the subtree rooted at `root` from a flat user set. Siblings are
/// ordered by creation time ascending so the output is deterministic.
///
/// The write path is supposed to keep the graph acyclic, but the read path
/// does not trust that: a revisited user id aborts the traversal with
/// `CyclicReferralGraph` instead of recursing forever.
pub fn build_tree(root: &User, users: &[User]) -> Result<ReferralNode, ServiceError> {
    let mut visited = HashSet::new();
    build_node(root, users, &mut visited)
}

fn build_node(
    user: &User,
    users: &[User],
    visited: &mut HashSet<Uuid>,
) -> Result<ReferralNode, ServiceError> {
    if !visited.insert(user.id) {
        return Err(ServiceError::CyclicReferralGraph(user.id));
    }

    let mut children: Vec<&User> = users
        .iter()
        .filter(|u| u.referred_by.as_deref() == Some(user.referral_code.as_str()))
        .collect();
    children.sort_by_key(|u| u.created_at);

    let referrals = children
        .into_iter()
        .map(|child| build_node(child, users, visited))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReferralNode {
        user: ReferralUser::from(user),
        referrals,
    })
}

impl ReferralService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Full referral tree for a user. One user-set load per call; the
    /// per-node lookups happen in memory.
    pub async fn build_referral_tree(&self, root_id: Uuid) -> Result<ReferralNode, ServiceError> {
        let users = self.db_client.get_users().await?;
        let root = users
            .iter()
            .find(|u| u.id == root_id)
            .ok_or(ServiceError::UserNotFound(root_id))?;

        build_tree(root, &users)
    }

    pub async fn build_referral_tree_by_code(
        &self,
        referral_code: &str,
    ) -> Result<ReferralNode, ServiceError> {
        let users = self.db_client.get_users().await?;
        let root = users
            .iter()
            .find(|u| u.referral_code == referral_code)
            .ok_or_else(|| ServiceError::InvalidReferralCode(referral_code.to_string()))?;

        build_tree(root, &users)
    }

    /// Recompute the referral metrics from a full traversal. The cached
    /// `referral_count`/`team_size` columns are hints only; this is the
    /// ground truth.
    pub async fn compute_referral_metrics(
        &self,
        user_id: Uuid,
    ) -> Result<(i32, i32), ServiceError> {
        let tree = self.build_referral_tree(user_id).await?;
        Ok((tree.direct_referrals() as i32, tree.team_size() as i32))
    }

    pub async fn get_referral_stats(&self, user_id: Uuid) -> Result<ReferralStats, ServiceError> {
        let tree = self.build_referral_tree(user_id).await?;

        Ok(ReferralStats {
            referral_count: tree.direct_referrals() as i32,
            team_size: tree.team_size() as i32,
            direct_referrals: tree.referrals.iter().map(|n| n.user.clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usermodel::UserRole;
    use chrono::{Duration, TimeZone, Utc};

    fn test_user(name: &str, code: &str, referred_by: Option<&str>, minute: i64) -> User {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            state: "Maharashtra".to_string(),
            password: "hashed".to_string(),
            role: UserRole::User,
            referral_code: code.to_string(),
            referred_by: referred_by.map(String::from),
            rank: "Newcomer".to_string(),
            balance: 0,
            total_payout: 0,
            total_commission_earned: 0,
            referral_count: 0,
            team_size: 0,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn root_without_referrals_yields_leaf() {
        let root = test_user("Asha", "ROOT0001", None, 0);
        let users = vec![root.clone()];

        let tree = build_tree(&root, &users).unwrap();
        assert_eq!(tree.user.id, root.id);
        assert!(tree.referrals.is_empty());
        assert_eq!(tree.team_size(), 0);
    }

    #[test]
    fn team_size_counts_subtree_excluding_root() {
        // A refers B and C; B refers D.
        let a = test_user("A", "CODEA", None, 0);
        let b = test_user("B", "CODEB", Some("CODEA"), 1);
        let c = test_user("C", "CODEC", Some("CODEA"), 2);
        let d = test_user("D", "CODED", Some("CODEB"), 3);
        let users = vec![a.clone(), b.clone(), c.clone(), d.clone()];

        let tree = build_tree(&a, &users).unwrap();
        assert_eq!(tree.direct_referrals(), 2);
        assert_eq!(tree.team_size(), 3);

        assert_eq!(tree.referrals[0].user.id, b.id);
        assert_eq!(tree.referrals[1].user.id, c.id);
        assert_eq!(tree.referrals[0].referrals.len(), 1);
        assert_eq!(tree.referrals[0].referrals[0].user.id, d.id);
    }

    #[test]
    fn siblings_ordered_by_creation_time() {
        let a = test_user("A", "CODEA", None, 0);
        // Registered out of name order
        let late = test_user("Late", "CODEL", Some("CODEA"), 30);
        let early = test_user("Early", "CODEE", Some("CODEA"), 5);
        let users = vec![a.clone(), late.clone(), early.clone()];

        let tree = build_tree(&a, &users).unwrap();
        assert_eq!(tree.referrals[0].user.id, early.id);
        assert_eq!(tree.referrals[1].user.id, late.id);
    }

    #[test]
    fn two_node_cycle_fails_fast() {
        // A refers B, B refers A. The write path should never allow this,
        // the read path must still terminate.
        let mut a = test_user("A", "CODEA", None, 0);
        let b = test_user("B", "CODEB", Some("CODEA"), 1);
        a.referred_by = Some("CODEB".to_string());
        let users = vec![a.clone(), b.clone()];

        let err = build_tree(&a, &users).unwrap_err();
        assert!(matches!(err, ServiceError::CyclicReferralGraph(_)));
    }

    #[test]
    fn referral_network_feeds_commission_qualification() {
        use crate::models::commissionmodel::CommissionRate;
        use crate::service::commission_service::{compute_commission, rate_for_metrics};

        // A refers B and C; B refers D. A's team of 3 qualifies for Bronze.
        let a = test_user("A", "CODEA", None, 0);
        let b = test_user("B", "CODEB", Some("CODEA"), 1);
        let c = test_user("C", "CODEC", Some("CODEA"), 2);
        let d = test_user("D", "CODED", Some("CODEB"), 3);
        let users = vec![a.clone(), b, c, d];

        let tree = build_tree(&a, &users).unwrap();
        assert_eq!(tree.team_size(), 3);

        let bronze = CommissionRate {
            id: Uuid::new_v4(),
            rank: "Bronze".to_string(),
            rate: 0.05,
            minimum_referrals: 0,
            minimum_team_size: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let rate = rate_for_metrics(
            &[bronze],
            tree.direct_referrals() as i32,
            tree.team_size() as i32,
        );
        // ₹1,000 at 5% comes out to exactly ₹50.00.
        assert_eq!(compute_commission(100_000, rate), 5_000);
    }

    #[test]
    fn self_referral_cycle_fails_fast() {
        let mut a = test_user("A", "CODEA", None, 0);
        a.referred_by = Some("CODEA".to_string());
        let users = vec![a.clone()];

        let err = build_tree(&a, &users).unwrap_err();
        assert!(matches!(err, ServiceError::CyclicReferralGraph(id) if id == a.id));
    }
}
