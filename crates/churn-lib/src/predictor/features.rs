//! Feature encoding for churn inference
//!
//! Maps a raw customer profile onto the exact numeric layout the classifier
//! was trained on. The layout is an explicit, versioned schema: each field
//! carries its own derivation, and the encoder simply walks the schema in
//! order. Categorical columns use implicit-baseline one-hot encoding
//! (France, age <= 30 and tenure < 3 have no column of their own).

use crate::error::ChurnError;
use crate::models::{Country, CustomerProfile, FeatureVector, Gender};
use std::fmt;

/// Balance above which a customer counts as high-balance
pub const HIGH_BALANCE_THRESHOLD: f64 = 100_000.0;

/// Number of fields in the current schema
pub const NUM_FEATURES: usize = 21;

/// One named column of the feature vector
pub struct FeatureField {
    pub name: &'static str,
    derive: fn(&CustomerProfile) -> f64,
}

impl FeatureField {
    pub fn value(&self, profile: &CustomerProfile) -> f64 {
        (self.derive)(profile)
    }
}

impl fmt::Debug for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureField").field("name", &self.name).finish()
    }
}

/// Named, ordered list of feature definitions
pub struct FeatureSchema {
    version: &'static str,
    fields: &'static [FeatureField],
}

impl FeatureSchema {
    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Check that an artifact's declared input columns match this schema
    /// exactly: same count, same names, same order.
    pub fn verify<S: AsRef<str>>(&self, declared: &[S]) -> Result<(), ChurnError> {
        if declared.len() != self.fields.len() {
            return Err(ChurnError::SchemaMismatch(format!(
                "schema {} has {} features, artifact declares {}",
                self.version,
                self.fields.len(),
                declared.len()
            )));
        }
        for (idx, (field, name)) in self.fields.iter().zip(declared).enumerate() {
            if field.name != name.as_ref() {
                return Err(ChurnError::SchemaMismatch(format!(
                    "position {}: expected '{}', artifact declares '{}'",
                    idx,
                    field.name,
                    name.as_ref()
                )));
            }
        }
        Ok(())
    }

    /// Check only the input width, for artifacts that carry no column names
    pub fn verify_width(&self, width: usize) -> Result<(), ChurnError> {
        if width != self.fields.len() {
            return Err(ChurnError::SchemaMismatch(format!(
                "schema {} has {} features, model input expects {}",
                self.version,
                self.fields.len(),
                width
            )));
        }
        Ok(())
    }
}

impl PartialEq for FeatureSchema {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl fmt::Debug for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSchema")
            .field("version", &self.version)
            .field("fields", &self.fields.len())
            .finish()
    }
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Schema the bundled churn classifiers were fit against
pub static CHURN_SCHEMA_V1: FeatureSchema = FeatureSchema {
    version: "churn-v1",
    fields: &[
        FeatureField { name: "credit_score", derive: |p| p.credit_score as f64 },
        FeatureField { name: "gender", derive: |p| flag(p.gender == Gender::Male) },
        FeatureField { name: "age", derive: |p| p.age as f64 },
        FeatureField { name: "tenure", derive: |p| p.tenure as f64 },
        FeatureField { name: "balance", derive: |p| p.balance },
        FeatureField { name: "products_number", derive: |p| p.products_number as f64 },
        FeatureField { name: "credit_card", derive: |p| flag(p.credit_card) },
        FeatureField { name: "active_member", derive: |p| flag(p.active_member) },
        FeatureField { name: "estimated_salary", derive: |p| p.estimated_salary },
        FeatureField { name: "country_Germany", derive: |p| flag(p.country == Country::Germany) },
        FeatureField { name: "country_Spain", derive: |p| flag(p.country == Country::Spain) },
        FeatureField {
            name: "balance_salary_ratio",
            derive: |p| ratio_or_zero(p.balance, p.estimated_salary),
        },
        FeatureField {
            name: "high_balance",
            derive: |p| flag(p.balance > HIGH_BALANCE_THRESHOLD),
        },
        FeatureField {
            name: "active_credit_combo",
            derive: |p| flag(p.active_member && p.credit_card),
        },
        FeatureField {
            name: "products_per_year",
            derive: |p| ratio_or_zero(p.products_number as f64, p.tenure as f64),
        },
        FeatureField { name: "age_group_31-40", derive: |p| flag((31..=40).contains(&p.age)) },
        FeatureField { name: "age_group_41-50", derive: |p| flag((41..=50).contains(&p.age)) },
        FeatureField { name: "age_group_51-60", derive: |p| flag((51..=60).contains(&p.age)) },
        FeatureField { name: "age_group_60+", derive: |p| flag(p.age > 60) },
        FeatureField { name: "tenure_group_Medium", derive: |p| flag((3..=7).contains(&p.tenure)) },
        FeatureField { name: "tenure_group_High", derive: |p| flag(p.tenure > 7) },
    ],
};

/// Encodes customer profiles into feature vectors
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder {
    schema: &'static FeatureSchema,
}

impl FeatureEncoder {
    pub fn new() -> Self {
        Self::with_schema(&CHURN_SCHEMA_V1)
    }

    pub fn with_schema(schema: &'static FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'static FeatureSchema {
        self.schema
    }

    pub fn encode(&self, profile: &CustomerProfile) -> FeatureVector {
        let values = self.schema.fields.iter().map(|f| f.value(profile)).collect();
        FeatureVector::new(self.schema, values)
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_ORDER: [&str; NUM_FEATURES] = [
        "credit_score",
        "gender",
        "age",
        "tenure",
        "balance",
        "products_number",
        "credit_card",
        "active_member",
        "estimated_salary",
        "country_Germany",
        "country_Spain",
        "balance_salary_ratio",
        "high_balance",
        "active_credit_combo",
        "products_per_year",
        "age_group_31-40",
        "age_group_41-50",
        "age_group_51-60",
        "age_group_60+",
        "tenure_group_Medium",
        "tenure_group_High",
    ];

    fn group_sum(features: &FeatureVector, prefix: &str) -> f64 {
        features
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(_, v)| v)
            .sum()
    }

    #[test]
    fn test_schema_order_is_fixed() {
        let names: Vec<_> = CHURN_SCHEMA_V1.names().collect();
        assert_eq!(names, EXPECTED_ORDER);
        assert_eq!(CHURN_SCHEMA_V1.version(), "churn-v1");
    }

    #[test]
    fn test_typical_profile_encoding() {
        let f = FeatureEncoder::new().encode(&CustomerProfile::default());

        assert_eq!(f.len(), NUM_FEATURES);
        assert_eq!(f.get("credit_score"), Some(650.0));
        assert_eq!(f.get("gender"), Some(1.0));
        assert!((f.get("balance_salary_ratio").unwrap() - 0.8333).abs() < 0.001);
        assert_eq!(f.get("high_balance"), Some(0.0));
        assert_eq!(f.get("active_credit_combo"), Some(1.0));
        assert!((f.get("products_per_year").unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(f.get("tenure_group_Medium"), Some(1.0));
        assert_eq!(f.get("tenure_group_High"), Some(0.0));
        assert_eq!(group_sum(&f, "age_group_"), 1.0, "age 35 falls in 31-40");
        assert_eq!(f.get("age_group_31-40"), Some(1.0));
        assert_eq!(f.get("country_Germany"), Some(0.0));
        assert_eq!(f.get("country_Spain"), Some(0.0));
    }

    #[test]
    fn test_zero_salary_ratio_is_zero() {
        let profile = CustomerProfile {
            estimated_salary: 0.0,
            balance: 125_000.0,
            ..Default::default()
        };
        let f = FeatureEncoder::new().encode(&profile);
        assert_eq!(f.get("balance_salary_ratio"), Some(0.0));
        assert_eq!(f.get("high_balance"), Some(1.0));
    }

    #[test]
    fn test_zero_tenure_products_per_year_is_zero() {
        let profile = CustomerProfile {
            tenure: 0,
            products_number: 3,
            ..Default::default()
        };
        let f = FeatureEncoder::new().encode(&profile);
        assert_eq!(f.get("products_per_year"), Some(0.0));
        assert_eq!(group_sum(&f, "tenure_group_"), 0.0);
    }

    #[test]
    fn test_balance_at_threshold_is_not_high() {
        let profile = CustomerProfile {
            balance: HIGH_BALANCE_THRESHOLD,
            ..Default::default()
        };
        let f = FeatureEncoder::new().encode(&profile);
        assert_eq!(f.get("high_balance"), Some(0.0));
    }

    #[test]
    fn test_age_groups_mutually_exclusive() {
        let encoder = FeatureEncoder::new();
        for age in 18..=100 {
            let profile = CustomerProfile { age, ..Default::default() };
            let f = encoder.encode(&profile);
            let set = group_sum(&f, "age_group_");
            if age <= 30 {
                assert_eq!(set, 0.0, "age {} is the implicit baseline", age);
            } else {
                assert_eq!(set, 1.0, "age {} must set exactly one group", age);
            }
        }
    }

    #[test]
    fn test_tenure_groups_mutually_exclusive() {
        let encoder = FeatureEncoder::new();
        for tenure in 0..=20 {
            let profile = CustomerProfile { tenure, ..Default::default() };
            let f = encoder.encode(&profile);
            let set = group_sum(&f, "tenure_group_");
            let expected = if tenure < 3 { 0.0 } else { 1.0 };
            assert_eq!(set, expected, "tenure {}", tenure);
        }
    }

    #[test]
    fn test_country_one_hot_has_implicit_baseline() {
        let encoder = FeatureEncoder::new();
        for (country, germany, spain) in [
            (Country::France, 0.0, 0.0),
            (Country::Germany, 1.0, 0.0),
            (Country::Spain, 0.0, 1.0),
        ] {
            let f = encoder.encode(&CustomerProfile { country, ..Default::default() });
            assert_eq!(f.get("country_Germany"), Some(germany));
            assert_eq!(f.get("country_Spain"), Some(spain));
        }
        assert!(CHURN_SCHEMA_V1.position("country_France").is_none());
    }

    #[test]
    fn test_inactive_or_cardless_breaks_combo() {
        let encoder = FeatureEncoder::new();
        let inactive = CustomerProfile { active_member: false, ..Default::default() };
        let cardless = CustomerProfile { credit_card: false, ..Default::default() };
        assert_eq!(encoder.encode(&inactive).get("active_credit_combo"), Some(0.0));
        assert_eq!(encoder.encode(&cardless).get("active_credit_combo"), Some(0.0));
        assert_eq!(encoder.encode(&cardless).get("credit_card"), Some(0.0));
    }

    #[test]
    fn test_verify_accepts_exact_layout() {
        assert!(CHURN_SCHEMA_V1.verify(&EXPECTED_ORDER).is_ok());
        assert!(CHURN_SCHEMA_V1.verify_width(NUM_FEATURES).is_ok());
    }

    #[test]
    fn test_verify_rejects_reordered_or_missing_columns() {
        let mut swapped = EXPECTED_ORDER;
        swapped.swap(9, 10);
        let err = CHURN_SCHEMA_V1.verify(&swapped).unwrap_err();
        assert!(err.to_string().contains("position 9"));

        let short = &EXPECTED_ORDER[..20];
        assert!(matches!(
            CHURN_SCHEMA_V1.verify(short),
            Err(ChurnError::SchemaMismatch(_))
        ));
        assert!(CHURN_SCHEMA_V1.verify_width(22).is_err());
    }

    #[test]
    fn test_to_f32_preserves_order() {
        let f = FeatureEncoder::new().encode(&CustomerProfile::default());
        let input = f.to_f32();
        assert_eq!(input.len(), NUM_FEATURES);
        assert_eq!(input[0], 650.0);
        assert_eq!(input[2], 35.0);
        assert_eq!(input[8], 60_000.0);
    }

    #[test]
    fn test_serialized_vector_keeps_schema_order() {
        let f = FeatureEncoder::new().encode(&CustomerProfile::default());
        let json = serde_json::to_string(&f).unwrap();
        let first = json.find("\"credit_score\"").unwrap();
        let last = json.find("\"tenure_group_High\"").unwrap();
        assert!(first < last);
    }
}
