// services/commission_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{commissiondb::CommissionExt, db::DBClient},
    models::{commissionmodel::CommissionRate, usermodel::User},
    service::error::ServiceError,
};

/// Highest rate among rules whose thresholds the user meets. No rule is ever
/// a silent default: a user below every threshold simply earns 0%.
pub fn rate_for_metrics(rules: &[CommissionRate], referral_count: i32, team_size: i32) -> f64 {
    rules
        .iter()
        .filter(|r| r.minimum_referrals <= referral_count && r.minimum_team_size <= team_size)
        .map(|r| r.rate)
        .fold(0.0, f64::max)
}

/// Commission in paise, rounded to the minor unit with round-half-up.
pub fn compute_commission(base_amount: i64, rate: f64) -> i64 {
    ((base_amount as f64) * rate + 0.5).floor() as i64
}

/// Rank label of the best rule the user qualifies for, if any.
pub fn rank_for_metrics(
    rules: &[CommissionRate],
    referral_count: i32,
    team_size: i32,
) -> Option<String> {
    rules
        .iter()
        .filter(|r| r.minimum_referrals <= referral_count && r.minimum_team_size <= team_size)
        .max_by(|a, b| a.rate.total_cmp(&b.rate))
        .map(|r| r.rank.clone())
}

/// Rank labels are a unique key; `exclude_id` skips the rule being edited.
pub fn ensure_unique_rank(
    existing: &[CommissionRate],
    exclude_id: Option<Uuid>,
    rank: &str,
) -> Result<(), ServiceError> {
    if existing
        .iter()
        .any(|r| r.rank == rank && Some(r.id) != exclude_id)
    {
        return Err(ServiceError::DuplicateRank(rank.to_string()));
    }
    Ok(())
}

/// Rank progression must be monotonic in both thresholds and rate: a rule
/// whose thresholds dominate another's may not carry a lower rate, and vice
/// versa. `exclude_id` skips the rule being edited.
pub fn validate_rule_monotonicity(
    existing: &[CommissionRate],
    exclude_id: Option<Uuid>,
    rate: f64,
    minimum_referrals: i32,
    minimum_team_size: i32,
) -> Result<(), ServiceError> {
    for rule in existing {
        if Some(rule.id) == exclude_id {
            continue;
        }

        let dominates = minimum_referrals >= rule.minimum_referrals
            && minimum_team_size >= rule.minimum_team_size;
        let dominated = minimum_referrals <= rule.minimum_referrals
            && minimum_team_size <= rule.minimum_team_size;

        if dominates && rate < rule.rate {
            return Err(ServiceError::InvalidMonotonicity(format!(
                "rate {} is below rank {} ({}) despite higher thresholds",
                rate, rule.rank, rule.rate
            )));
        }

        if dominated && rate > rule.rate {
            return Err(ServiceError::InvalidMonotonicity(format!(
                "rate {} exceeds rank {} ({}) despite lower thresholds",
                rate, rule.rank, rule.rate
            )));
        }
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct CommissionService {
    db_client: Arc<DBClient>,
}

impl CommissionService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn list_rules(&self) -> Result<Vec<CommissionRate>, ServiceError> {
        Ok(self.db_client.list_commission_rules().await?)
    }

    pub async fn get_rule(&self, rule_id: Uuid) -> Result<CommissionRate, ServiceError> {
        self.db_client
            .get_commission_rule(rule_id)
            .await?
            .ok_or(ServiceError::RuleNotFound(rule_id))
    }

    /// Commission rate applicable to the user's current referral metrics.
    pub async fn rate_for(&self, user: &User) -> Result<f64, ServiceError> {
        let rules = self.db_client.list_commission_rules().await?;
        Ok(rate_for_metrics(&rules, user.referral_count, user.team_size))
    }

    /// Rank label matching the given metrics, or `None` below every rule.
    pub async fn rank_for(
        &self,
        referral_count: i32,
        team_size: i32,
    ) -> Result<Option<String>, ServiceError> {
        let rules = self.db_client.list_commission_rules().await?;
        Ok(rank_for_metrics(&rules, referral_count, team_size))
    }

    pub async fn create_rule(
        &self,
        rank: &str,
        rate: f64,
        minimum_referrals: i32,
        minimum_team_size: i32,
    ) -> Result<CommissionRate, ServiceError> {
        validate_rule_inputs(rank, rate, minimum_referrals, minimum_team_size)?;

        let existing = self.db_client.list_commission_rules().await?;
        ensure_unique_rank(&existing, None, rank)?;
        validate_rule_monotonicity(&existing, None, rate, minimum_referrals, minimum_team_size)?;

        self.db_client
            .insert_commission_rule(rank, rate, minimum_referrals, minimum_team_size)
            .await
            .map_err(|e| map_unique_violation(e, rank))
    }

    pub async fn update_rule(
        &self,
        rule_id: Uuid,
        rank: &str,
        rate: f64,
        minimum_referrals: i32,
        minimum_team_size: i32,
    ) -> Result<CommissionRate, ServiceError> {
        validate_rule_inputs(rank, rate, minimum_referrals, minimum_team_size)?;

        let existing = self.db_client.list_commission_rules().await?;
        if !existing.iter().any(|r| r.id == rule_id) {
            return Err(ServiceError::RuleNotFound(rule_id));
        }
        ensure_unique_rank(&existing, Some(rule_id), rank)?;
        validate_rule_monotonicity(
            &existing,
            Some(rule_id),
            rate,
            minimum_referrals,
            minimum_team_size,
        )?;

        self.db_client
            .update_commission_rule(rule_id, rank, rate, minimum_referrals, minimum_team_size)
            .await
            .map_err(|e| map_unique_violation(e, rank))
    }
}

fn validate_rule_inputs(
    rank: &str,
    rate: f64,
    minimum_referrals: i32,
    minimum_team_size: i32,
) -> Result<(), ServiceError> {
    if rank.trim().is_empty() {
        return Err(ServiceError::Validation("Rank label is required".to_string()));
    }
    if !(0.0..=1.0).contains(&rate) {
        return Err(ServiceError::InvalidRate(rate));
    }
    if minimum_referrals < 0 || minimum_team_size < 0 {
        return Err(ServiceError::Validation(
            "Minimum referrals and team size cannot be negative".to_string(),
        ));
    }
    Ok(())
}

// The rank column has a unique constraint; the pre-check above races with
// concurrent inserts, so the violation is mapped here as well.
fn map_unique_violation(error: sqlx::Error, rank: &str) -> ServiceError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ServiceError::DuplicateRank(rank.to_string())
        }
        _ => ServiceError::Database(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(rank: &str, rate: f64, min_ref: i32, min_team: i32) -> CommissionRate {
        CommissionRate {
            id: Uuid::new_v4(),
            rank: rank.to_string(),
            rate,
            minimum_referrals: min_ref,
            minimum_team_size: min_team,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn standard_rules() -> Vec<CommissionRate> {
        vec![
            rule("Bronze", 0.05, 0, 2),
            rule("Silver", 0.08, 5, 10),
            rule("Gold", 0.12, 10, 50),
        ]
    }

    #[test]
    fn no_qualifying_rule_earns_zero() {
        let rules = standard_rules();
        assert_eq!(rate_for_metrics(&rules, 0, 0), 0.0);
        assert_eq!(compute_commission(100_000, rate_for_metrics(&rules, 0, 0)), 0);
    }

    #[test]
    fn highest_qualifying_rate_wins() {
        let rules = standard_rules();
        assert_eq!(rate_for_metrics(&rules, 1, 3), 0.05);
        assert_eq!(rate_for_metrics(&rules, 6, 12), 0.08);
        assert_eq!(rate_for_metrics(&rules, 40, 200), 0.12);
    }

    #[test]
    fn rate_is_monotonic_in_metrics() {
        let rules = standard_rules();
        let samples = [(0, 0), (1, 2), (5, 10), (6, 30), (10, 50), (25, 100)];

        for &(rx, tx) in &samples {
            for &(ry, ty) in &samples {
                if rx >= ry && tx >= ty {
                    assert!(
                        rate_for_metrics(&rules, rx, tx) >= rate_for_metrics(&rules, ry, ty),
                        "({rx},{tx}) should earn at least as much as ({ry},{ty})"
                    );
                }
            }
        }
    }

    #[test]
    fn rank_follows_the_best_qualifying_rule() {
        let rules = standard_rules();
        assert_eq!(rank_for_metrics(&rules, 0, 0), None);
        assert_eq!(rank_for_metrics(&rules, 1, 3), Some("Bronze".to_string()));
        assert_eq!(rank_for_metrics(&rules, 12, 60), Some("Gold".to_string()));
    }

    #[test]
    fn five_percent_of_thousand_rupees_is_fifty() {
        // ₹1,000 = 100_000 paise; 5% must come out to exactly ₹50.00.
        assert_eq!(compute_commission(100_000, 0.05), 5_000);
    }

    #[test]
    fn commission_rounds_half_up() {
        // 333 paise at 5% = 16.65 paise -> 17
        assert_eq!(compute_commission(333, 0.05), 17);
        // 330 paise at 5% = 16.5 paise -> 17 (half rounds up)
        assert_eq!(compute_commission(330, 0.05), 17);
        // 320 paise at 5% = 16.0 paise -> 16
        assert_eq!(compute_commission(320, 0.05), 16);
        assert_eq!(compute_commission(0, 0.05), 0);
    }

    #[test]
    fn monotonicity_rejects_lower_rate_with_higher_thresholds() {
        let rules = standard_rules();
        let err =
            validate_rule_monotonicity(&rules, None, 0.03, 20, 100).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidMonotonicity(_)));
    }

    #[test]
    fn monotonicity_rejects_higher_rate_with_lower_thresholds() {
        let rules = standard_rules();
        let err = validate_rule_monotonicity(&rules, None, 0.50, 0, 0).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidMonotonicity(_)));
    }

    #[test]
    fn monotonicity_accepts_a_consistent_rule() {
        let rules = standard_rules();
        assert!(validate_rule_monotonicity(&rules, None, 0.10, 8, 30).is_ok());
    }

    #[test]
    fn editing_a_rule_skips_itself() {
        let rules = standard_rules();
        let silver = rules.iter().find(|r| r.rank == "Silver").unwrap();
        // Bumping Silver's own rate must not conflict with its old value.
        assert!(
            validate_rule_monotonicity(&rules, Some(silver.id), 0.09, 5, 10).is_ok()
        );
    }

    #[test]
    fn duplicate_rank_rejected_unless_editing_itself() {
        let rules = standard_rules();
        let silver = rules.iter().find(|r| r.rank == "Silver").unwrap();

        assert!(matches!(
            ensure_unique_rank(&rules, None, "Silver"),
            Err(ServiceError::DuplicateRank(_))
        ));
        assert!(ensure_unique_rank(&rules, Some(silver.id), "Silver").is_ok());
        assert!(ensure_unique_rank(&rules, None, "Platinum").is_ok());
    }

    #[test]
    fn rule_input_validation() {
        assert!(matches!(
            validate_rule_inputs("Gold", 1.5, 0, 0),
            Err(ServiceError::InvalidRate(_))
        ));
        assert!(matches!(
            validate_rule_inputs("", 0.1, 0, 0),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            validate_rule_inputs("Gold", 0.1, -1, 0),
            Err(ServiceError::Validation(_))
        ));
        assert!(validate_rule_inputs("Gold", 0.1, 0, 0).is_ok());
    }
}
