//! Core data models for churn prediction

use crate::error::ChurnError;
use crate::predictor::FeatureSchema;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "male")]
    Male,
    #[serde(alias = "female")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    #[serde(alias = "france")]
    France,
    #[serde(alias = "germany")]
    Germany,
    #[serde(alias = "spain")]
    Spain,
}

/// Raw customer attributes as entered by a user or supplied by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub credit_score: u32,
    pub gender: Gender,
    pub age: u32,
    /// Years with the bank
    pub tenure: u32,
    pub balance: f64,
    pub products_number: u32,
    pub credit_card: bool,
    pub active_member: bool,
    pub estimated_salary: f64,
    pub country: Country,
}

impl CustomerProfile {
    pub const CREDIT_SCORE_RANGE: (u32, u32) = (300, 850);
    pub const AGE_RANGE: (u32, u32) = (18, 100);
    pub const TENURE_RANGE: (u32, u32) = (0, 20);
    pub const PRODUCTS_RANGE: (u32, u32) = (1, 4);

    /// Check the documented input ranges.
    ///
    /// The encoder never calls this; input boundaries decide whether to
    /// reject or pass through out-of-range values.
    pub fn validate(&self) -> Result<(), ChurnError> {
        check_range("credit_score", self.credit_score, Self::CREDIT_SCORE_RANGE)?;
        check_range("age", self.age, Self::AGE_RANGE)?;
        check_range("tenure", self.tenure, Self::TENURE_RANGE)?;
        check_range("products_number", self.products_number, Self::PRODUCTS_RANGE)?;
        check_amount("balance", self.balance)?;
        check_amount("estimated_salary", self.estimated_salary)?;
        Ok(())
    }
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            credit_score: 650,
            gender: Gender::Male,
            age: 35,
            tenure: 5,
            balance: 50_000.0,
            products_number: 2,
            credit_card: true,
            active_member: true,
            estimated_salary: 60_000.0,
            country: Country::France,
        }
    }
}

fn check_range(field: &str, value: u32, (min, max): (u32, u32)) -> Result<(), ChurnError> {
    if value < min || value > max {
        return Err(ChurnError::MalformedProfile(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

fn check_amount(field: &str, value: f64) -> Result<(), ChurnError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ChurnError::MalformedProfile(format!(
            "{} must be a non-negative amount, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Numeric model input, laid out in the order of the schema that built it
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: &'static FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(schema: &'static FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    pub fn schema(&self) -> &'static FeatureSchema {
        self.schema
    }

    pub fn schema_version(&self) -> &'static str {
        self.schema.version()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Look up a value by field name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|idx| self.values[idx])
    }

    /// Iterate `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.schema.names().zip(self.values.iter().copied())
    }

    /// Model input as single-precision floats
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictedLabel {
    Retained,
    Churned,
}

impl PredictedLabel {
    /// Map a classifier class index (0 = retained, 1 = churned)
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(PredictedLabel::Retained),
            1 => Some(PredictedLabel::Churned),
            _ => None,
        }
    }
}

impl fmt::Display for PredictedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictedLabel::Retained => write!(f, "retained"),
            PredictedLabel::Churned => write!(f, "churned"),
        }
    }
}

/// Classifier output for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: PredictedLabel,
    /// Probability of the churned class, in [0, 1]
    pub churn_probability: f64,
    pub model_version: String,
}

/// Triggered risk-factor labels in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskAssessment {
    pub factors: Vec<String>,
}

impl RiskAssessment {
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.factors.iter().map(String::as_str)
    }
}

/// Ordered retention actions for a predicted label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationSet {
    pub actions: Vec<String>,
}

impl RecommendationSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }
}

/// Everything one prediction cycle produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub result: PredictionResult,
    pub risk: RiskAssessment,
    pub recommendations: RecommendationSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(CustomerProfile::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_credit_score_rejected() {
        let profile = CustomerProfile {
            credit_score: 900,
            ..Default::default()
        };
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, ChurnError::MalformedProfile(_)));
        assert!(err.to_string().contains("credit_score"));
    }

    #[test]
    fn test_negative_or_nan_amount_rejected() {
        let negative = CustomerProfile {
            balance: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = CustomerProfile {
            estimated_salary: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_profile_deserializes_lowercase_enums() {
        let json = r#"{
            "credit_score": 600, "gender": "female", "age": 44, "tenure": 3,
            "balance": 0.0, "products_number": 1, "credit_card": false,
            "active_member": true, "estimated_salary": 1000.0, "country": "Spain"
        }"#;
        let profile: CustomerProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.country, Country::Spain);
    }

    #[test]
    fn test_negative_tenure_fails_to_parse() {
        let json = r#"{
            "credit_score": 600, "gender": "Male", "age": 44, "tenure": -1,
            "balance": 0.0, "products_number": 1, "credit_card": false,
            "active_member": true, "estimated_salary": 1000.0, "country": "France"
        }"#;
        assert!(serde_json::from_str::<CustomerProfile>(json).is_err());
    }

    #[test]
    fn test_label_class_mapping() {
        assert_eq!(PredictedLabel::from_class(1), Some(PredictedLabel::Churned));
        assert_eq!(PredictedLabel::from_class(0), Some(PredictedLabel::Retained));
        assert_eq!(PredictedLabel::from_class(2), None);
        assert_eq!(PredictedLabel::from_class(-1), None);
        assert_eq!(PredictedLabel::Retained.to_string(), "retained");
    }
}
