//! Feature vector inspection (no model required)

use anyhow::Result;
use churn_lib::predictor::FeatureEncoder;
use churn_lib::CustomerProfile;

use super::predict::feature_rows;
use crate::output::{print_info, print_json, print_table, OutputFormat};

pub fn run(profile: CustomerProfile, format: OutputFormat) -> Result<()> {
    let features = FeatureEncoder::new().encode(&profile);

    match format {
        OutputFormat::Json => print_json(&features)?,
        OutputFormat::Table => {
            print_table(feature_rows(&features));
            print_info(&format!(
                "{} features, schema {}",
                features.len(),
                features.schema_version()
            ));
        }
    }
    Ok(())
}
