//! Display model for presentation shells
//!
//! A pure mapping from a prediction report to everything a shell renders:
//! headline, probability gauge, profile-vs-benchmark comparison, risk
//! summary and recommendations. Shells only format what is here.

use crate::models::{CustomerProfile, PredictedLabel, PredictionReport};
use serde::Serialize;

/// Gauge reference line, in percent
pub const GAUGE_REFERENCE_PERCENT: f64 = 50.0;

/// Gauge alert threshold, in percent
pub const GAUGE_ALERT_PERCENT: f64 = 80.0;

pub const NO_RISK_MESSAGE: &str = "No major risk factors identified";
pub const RISK_FOUND_MESSAGE: &str = "Risk Factors Identified";

/// Portfolio averages shown next to the customer
const BENCHMARKS: ProfileBenchmarks = ProfileBenchmarks {
    credit_score: 650.0,
    age: 40.0,
    tenure: 5.0,
    products: 2.0,
    balance_k: 80.0,
    salary_k: 70.0,
};

struct ProfileBenchmarks {
    credit_score: f64,
    age: f64,
    tenure: f64,
    products: f64,
    balance_k: f64,
    salary_k: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeBand {
    /// 0-25%
    Low,
    /// 25-50%
    Moderate,
    /// 50-75%
    Elevated,
    /// 75-100%
    Severe,
}

impl GaugeBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 25.0 {
            GaugeBand::Low
        } else if percent < 50.0 {
            GaugeBand::Moderate
        } else if percent < 75.0 {
            GaugeBand::Elevated
        } else {
            GaugeBand::Severe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GaugeBand::Low => "low",
            GaugeBand::Moderate => "moderate",
            GaugeBand::Elevated => "elevated",
            GaugeBand::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileComparison {
    pub metric: &'static str,
    pub customer: f64,
    pub benchmark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub headline: &'static str,
    pub at_risk: bool,
    pub churn_percent: f64,
    pub gauge_band: GaugeBand,
    pub above_alert_threshold: bool,
    /// Distance from the gauge reference, in percentage points
    pub delta_from_reference: f64,
    pub profile_comparison: Vec<ProfileComparison>,
    pub risk_message: &'static str,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub model_version: String,
}

impl DisplayModel {
    pub fn from_report(profile: &CustomerProfile, report: &PredictionReport) -> Self {
        let at_risk = report.result.label == PredictedLabel::Churned;
        let churn_percent = report.result.churn_probability * 100.0;

        Self {
            headline: if at_risk { "HIGH CHURN RISK" } else { "LOW CHURN RISK" },
            at_risk,
            churn_percent,
            gauge_band: GaugeBand::from_percent(churn_percent),
            above_alert_threshold: churn_percent >= GAUGE_ALERT_PERCENT,
            delta_from_reference: churn_percent - GAUGE_REFERENCE_PERCENT,
            profile_comparison: profile_comparison(profile),
            risk_message: if report.risk.is_empty() {
                NO_RISK_MESSAGE
            } else {
                RISK_FOUND_MESSAGE
            },
            risk_factors: report.risk.factors.clone(),
            recommendations: report.recommendations.actions.clone(),
            model_version: report.result.model_version.clone(),
        }
    }
}

fn profile_comparison(profile: &CustomerProfile) -> Vec<ProfileComparison> {
    let row = |metric: &'static str, customer: f64, benchmark: f64| ProfileComparison {
        metric,
        customer,
        benchmark,
    };
    vec![
        row("Credit Score", profile.credit_score as f64, BENCHMARKS.credit_score),
        row("Age", profile.age as f64, BENCHMARKS.age),
        row("Tenure", profile.tenure as f64, BENCHMARKS.tenure),
        row("Products", profile.products_number as f64, BENCHMARKS.products),
        row("Balance ($K)", profile.balance / 1000.0, BENCHMARKS.balance_k),
        row("Salary ($K)", profile.estimated_salary / 1000.0, BENCHMARKS.salary_k),
    ]
}
