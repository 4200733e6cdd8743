//! Customer profile input: command-line flags and JSON files

use anyhow::{Context, Result};
use churn_lib::{Country, CustomerProfile, Gender, PredictionLogger};
use clap::{Args, ValueEnum};
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CountryArg {
    France,
    Germany,
    Spain,
}

/// Customer attributes; defaults match a typical retained customer
#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    /// Credit score (300-850)
    #[arg(long, default_value_t = 650)]
    pub credit_score: u32,

    #[arg(long, value_enum, default_value = "male")]
    pub gender: GenderArg,

    /// Age in years (18-100)
    #[arg(long, default_value_t = 35)]
    pub age: u32,

    /// Years with the bank (0-20)
    #[arg(long, default_value_t = 5)]
    pub tenure: u32,

    /// Account balance
    #[arg(long, default_value_t = 50000.0)]
    pub balance: f64,

    /// Number of products held (1-4)
    #[arg(long, default_value_t = 2)]
    pub products: u32,

    /// Whether the customer holds a credit card
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub credit_card: bool,

    /// Whether the customer is an active member
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub active_member: bool,

    /// Estimated yearly salary
    #[arg(long, default_value_t = 60000.0)]
    pub salary: f64,

    #[arg(long, value_enum, default_value = "france")]
    pub country: CountryArg,
}

impl From<&ProfileArgs> for CustomerProfile {
    fn from(args: &ProfileArgs) -> Self {
        CustomerProfile {
            credit_score: args.credit_score,
            gender: match args.gender {
                GenderArg::Male => Gender::Male,
                GenderArg::Female => Gender::Female,
            },
            age: args.age,
            tenure: args.tenure,
            balance: args.balance,
            products_number: args.products,
            credit_card: args.credit_card,
            active_member: args.active_member,
            estimated_salary: args.salary,
            country: match args.country {
                CountryArg::France => Country::France,
                CountryArg::Germany => Country::Germany,
                CountryArg::Spain => Country::Spain,
            },
        }
    }
}

/// Read profiles from a JSON array or a JSON-lines file
pub fn read_profiles(path: &Path) -> Result<Vec<CustomerProfile>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_profiles(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_profiles(content: &str) -> Result<Vec<CustomerProfile>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("Invalid JSON array of profiles");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid profile on line {}", idx + 1))
        })
        .collect()
}

/// Enforce the documented ranges unless pass-through was requested
pub fn check_profile(
    profile: &CustomerProfile,
    allow_out_of_range: bool,
    logger: &PredictionLogger,
) -> Result<()> {
    if let Err(e) = profile.validate() {
        if !allow_out_of_range {
            return Err(e.into());
        }
        logger.log_out_of_range(profile, &e);
    }
    Ok(())
}
