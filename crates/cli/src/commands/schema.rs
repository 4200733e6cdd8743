//! Feature schema listing

use anyhow::Result;
use churn_lib::predictor::CHURN_SCHEMA_V1;
use tabled::Tabled;

use crate::output::{print_info, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct SchemaRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Feature")]
    name: &'static str,
}

pub fn run(format: OutputFormat) -> Result<()> {
    let schema = &CHURN_SCHEMA_V1;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "version": schema.version(),
            "features": schema.names().collect::<Vec<_>>(),
        }))?,
        OutputFormat::Table => {
            print_table(
                schema
                    .names()
                    .enumerate()
                    .map(|(index, name)| SchemaRow { index, name })
                    .collect(),
            );
            print_info(&format!("Schema {} ({} features)", schema.version(), schema.len()));
        }
    }
    Ok(())
}
