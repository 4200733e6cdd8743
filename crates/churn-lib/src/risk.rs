//! Rule-based churn risk heuristics
//!
//! Evaluated against the raw profile, independently of the classifier.
//! Rules are listed in priority order and reported in that order.

use crate::models::{CustomerProfile, RiskAssessment};

/// Age above which a customer is in the high-risk age group
pub const HIGH_AGE_THRESHOLD: u32 = 50;

/// Tenure (years) below which a relationship counts as new
pub const LOW_TENURE_THRESHOLD: u32 = 2;

/// Credit score below which a customer is flagged
pub const LOW_CREDIT_SCORE_THRESHOLD: u32 = 600;

/// A single named risk rule
pub struct RiskRule {
    pub label: &'static str,
    applies: fn(&CustomerProfile) -> bool,
}

impl RiskRule {
    pub fn applies(&self, profile: &CustomerProfile) -> bool {
        (self.applies)(profile)
    }
}

pub static RISK_RULES: [RiskRule; 7] = [
    RiskRule { label: "High age group", applies: |p| p.age > HIGH_AGE_THRESHOLD },
    RiskRule { label: "Zero balance", applies: |p| p.balance == 0.0 },
    RiskRule { label: "Single product", applies: |p| p.products_number == 1 },
    RiskRule { label: "Inactive member", applies: |p| !p.active_member },
    RiskRule { label: "No credit card", applies: |p| !p.credit_card },
    RiskRule { label: "Low tenure", applies: |p| p.tenure < LOW_TENURE_THRESHOLD },
    RiskRule {
        label: "Low credit score",
        applies: |p| p.credit_score < LOW_CREDIT_SCORE_THRESHOLD,
    },
];

pub fn assess_risk(profile: &CustomerProfile) -> RiskAssessment {
    RiskAssessment {
        factors: RISK_RULES
            .iter()
            .filter(|rule| rule.applies(profile))
            .map(|rule| rule.label.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_risk_profile() -> CustomerProfile {
        CustomerProfile {
            age: 55,
            balance: 0.0,
            products_number: 1,
            active_member: false,
            credit_card: false,
            tenure: 1,
            credit_score: 550,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_risk_factors_for_typical_profile() {
        assert!(assess_risk(&CustomerProfile::default()).is_empty());
    }

    #[test]
    fn test_all_factors_in_priority_order() {
        let risk = assess_risk(&high_risk_profile());
        assert_eq!(
            risk.factors,
            vec![
                "High age group",
                "Zero balance",
                "Single product",
                "Inactive member",
                "No credit card",
                "Low tenure",
                "Low credit score",
            ]
        );
    }

    #[test]
    fn test_subset_keeps_relative_order() {
        let profile = CustomerProfile {
            credit_score: 500,
            age: 70,
            tenure: 0,
            ..Default::default()
        };
        let risk = assess_risk(&profile);
        assert_eq!(risk.factors, vec!["High age group", "Low tenure", "Low credit score"]);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let profile = CustomerProfile {
            age: HIGH_AGE_THRESHOLD,
            tenure: LOW_TENURE_THRESHOLD,
            credit_score: LOW_CREDIT_SCORE_THRESHOLD,
            balance: 0.01,
            products_number: 2,
            ..Default::default()
        };
        assert!(assess_risk(&profile).is_empty());
    }

    #[test]
    fn test_assessment_is_repeatable() {
        let profile = high_risk_profile();
        assert_eq!(assess_risk(&profile), assess_risk(&profile));
    }
}
