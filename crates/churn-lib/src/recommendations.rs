//! Retention recommendations keyed by predicted label

use crate::models::{PredictedLabel, RecommendationSet};

pub const CHURNED_ACTIONS: [&str; 4] = [
    "Offer personalized retention campaign",
    "Provide premium customer service",
    "Consider product bundle offers",
    "Implement targeted engagement strategies",
];

pub const RETAINED_ACTIONS: [&str; 4] = [
    "Continue regular engagement",
    "Offer product upgrades",
    "Maintain service quality",
    "Monitor for any changes",
];

pub fn recommend(label: PredictedLabel) -> RecommendationSet {
    let actions = match label {
        PredictedLabel::Churned => &CHURNED_ACTIONS,
        PredictedLabel::Retained => &RETAINED_ACTIONS,
    };
    RecommendationSet {
        actions: actions.iter().map(|a| a.to_string()).collect(),
    }
}
