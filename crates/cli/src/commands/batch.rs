//! Batch scoring of profiles read from a file

use anyhow::Result;
use chrono::Utc;
use churn_lib::{
    CustomerProfile, PredictedLabel, PredictionLogger, PredictionReport, PredictionService,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::load_service;
use crate::config::Settings;
use crate::output::{
    color_label, color_probability, print_json, print_table, print_warning, OutputFormat,
};
use crate::profile::{check_profile, read_profiles};

/// Row for the batch results table
#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Prediction")]
    label: String,
    #[tabled(rename = "Probability")]
    probability: String,
    #[tabled(rename = "Risk Factors")]
    risk_count: usize,
    #[tabled(rename = "Top Risk")]
    top_risk: String,
}

#[derive(Serialize)]
struct BatchEntry {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<PredictionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Score every profile in `input`
pub fn run(
    settings: &Settings,
    input: &Path,
    allow_out_of_range: bool,
    format: OutputFormat,
) -> Result<()> {
    let logger = PredictionLogger::new(format!("batch:{}", input.display()));
    let profiles = read_profiles(input)?;
    for (idx, profile) in profiles.iter().enumerate() {
        check_profile(profile, allow_out_of_range, &logger)
            .map_err(|e| e.context(format!("Profile #{} rejected", idx)))?;
    }

    let service = load_service(settings, &logger)?;
    let entries = score(&service, &profiles);
    let failures = entries.iter().filter(|e| e.error.is_some()).count();

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "generated_at": Utc::now(),
            "model_version": service.model_version(),
            "results": entries,
        }))?,
        OutputFormat::Table => {
            if entries.is_empty() {
                print_warning("No profiles found");
                return Ok(());
            }
            let churned = entries
                .iter()
                .filter_map(|e| e.report.as_ref())
                .filter(|r| r.result.label == PredictedLabel::Churned)
                .count();

            print_table(entries.iter().map(row).collect());
            println!(
                "\nTotal: {} profiles, {} predicted to churn, {} failed",
                entries.len(),
                churned,
                failures
            );
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} predictions failed", failures, entries.len());
    }
    Ok(())
}

fn score(service: &PredictionService, profiles: &[CustomerProfile]) -> Vec<BatchEntry> {
    service
        .run_batch(profiles)
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| match outcome {
            Ok(report) => BatchEntry {
                index,
                report: Some(report),
                error: None,
            },
            Err(e) => BatchEntry {
                index,
                report: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

fn row(entry: &BatchEntry) -> BatchRow {
    match (&entry.report, &entry.error) {
        (Some(report), _) => BatchRow {
            index: entry.index,
            label: color_label(report.result.label),
            probability: color_probability(report.result.churn_probability),
            risk_count: report.risk.len(),
            top_risk: report.risk.iter().next().unwrap_or("-").to_string(),
        },
        (None, error) => BatchRow {
            index: entry.index,
            label: "error".to_string(),
            probability: "-".to_string(),
            risk_count: 0,
            top_risk: error.clone().unwrap_or_default(),
        },
    }
}
