//! Single-profile churn prediction

use anyhow::Result;
use chrono::{DateTime, Utc};
use churn_lib::{CustomerProfile, DisplayModel, FeatureVector, PredictionLogger, PredictionReport};
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::load_service;
use crate::config::Settings;
use crate::output::{
    color_probability, format_feature, print_heading, print_info, print_json, print_success,
    print_table, print_warning, OutputFormat,
};
use crate::profile::check_profile;

/// Row for the profile comparison table
#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Average")]
    benchmark: String,
}

/// Row for the feature table
#[derive(Tabled)]
pub(crate) struct FeatureRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Feature")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub(crate) fn feature_rows(features: &FeatureVector) -> Vec<FeatureRow> {
    features
        .iter()
        .enumerate()
        .map(|(index, (name, value))| FeatureRow {
            index,
            name: name.to_string(),
            value: format_feature(value),
        })
        .collect()
}

#[derive(Serialize)]
struct PredictionOutput<'a> {
    generated_at: DateTime<Utc>,
    profile: &'a CustomerProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<&'a FeatureVector>,
    report: &'a PredictionReport,
    display: &'a DisplayModel,
}

/// Score one profile and render the result
pub fn run(
    settings: &Settings,
    profile: CustomerProfile,
    allow_out_of_range: bool,
    show_features: bool,
    format: OutputFormat,
) -> Result<()> {
    let logger = PredictionLogger::new("cli");
    check_profile(&profile, allow_out_of_range, &logger)?;

    let service = load_service(settings, &logger)?;
    let report = service.run(&profile)?;
    let display = DisplayModel::from_report(&profile, &report);
    let features = show_features.then(|| service.encoder().encode(&profile));

    match format {
        OutputFormat::Json => print_json(&PredictionOutput {
            generated_at: Utc::now(),
            profile: &profile,
            features: features.as_ref(),
            report: &report,
            display: &display,
        })?,
        OutputFormat::Table => {
            render(&display, report.result.churn_probability);
            if let Some(features) = &features {
                print_heading("Feature Vector");
                print_table(feature_rows(features));
            }
        }
    }

    Ok(())
}

fn render(display: &DisplayModel, probability: f64) {
    let headline = format!("{}  Probability: {}", display.headline, color_probability(probability));
    if display.at_risk {
        println!("{} {}", "⚠".red().bold(), headline.bold());
    } else {
        println!("{} {}", "✓".green().bold(), headline.bold());
    }

    let mut gauge = format!(
        "Gauge: {} ({:+.1} pts vs 50% reference)",
        display.gauge_band.as_str(),
        display.delta_from_reference
    );
    if display.above_alert_threshold {
        gauge.push_str(&format!(" {}", "alert threshold crossed".red().bold()));
    }
    println!("{}", gauge);

    print_heading("Customer Profile");
    print_table(
        display
            .profile_comparison
            .iter()
            .map(|row| ComparisonRow {
                metric: row.metric.to_string(),
                customer: format_feature(row.customer),
                benchmark: format_feature(row.benchmark),
            })
            .collect(),
    );

    print_heading("Risk Factors Analysis");
    if display.risk_factors.is_empty() {
        print_success(display.risk_message);
    } else {
        print_warning(display.risk_message);
        for factor in &display.risk_factors {
            println!("  • {}", factor);
        }
    }

    print_heading("Recommendations");
    for recommendation in &display.recommendations {
        println!("  • {}", recommendation);
    }

    println!();
    print_info(&format!("Model: {}", display.model_version));
}
