//! Output formatting utilities

use churn_lib::display::GaugeBand;
use churn_lib::PredictedLabel;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Format a probability in [0, 1] as a percentage
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Format a feature value: integers without decimals, ratios with three
pub fn format_feature(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.3}", value)
    }
}

/// Color a churn probability: higher is worse
pub fn color_probability(probability: f64) -> String {
    let formatted = format_probability(probability);
    match GaugeBand::from_percent(probability * 100.0) {
        GaugeBand::Low => formatted.green().to_string(),
        GaugeBand::Moderate => formatted.yellow().to_string(),
        GaugeBand::Elevated => formatted.truecolor(255, 165, 0).to_string(),
        GaugeBand::Severe => formatted.red().to_string(),
    }
}

/// Color a predicted label
pub fn color_label(label: PredictedLabel) -> String {
    match label {
        PredictedLabel::Churned => label.to_string().red().bold().to_string(),
        PredictedLabel::Retained => label.to_string().green().to_string(),
    }
}
