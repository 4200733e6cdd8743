//! Churn Advisor CLI
//!
//! Scores bank customers with a pre-trained churn classifier and shows the
//! churn probability alongside rule-based risk factors and recommendations.

mod commands;
mod config;
mod output;
mod profile;

use anyhow::Result;
use churn_lib::ChurnError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Churn Advisor CLI
#[derive(Parser)]
#[command(name = "churn")]
#[command(author, version, about = "Bank customer churn prediction", long_about = None)]
pub struct Cli {
    /// Path to the model artifact (.onnx or .json); overrides config and CHURN_MODEL_PATH
    #[arg(long, short, global = true)]
    pub model: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/churn/config.json if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict churn for a single customer
    Predict {
        #[command(flatten)]
        profile: profile::ProfileArgs,

        /// Score profiles outside the documented ranges instead of rejecting them
        #[arg(long)]
        allow_out_of_range: bool,

        /// Also print the encoded feature vector
        #[arg(long)]
        show_features: bool,
    },

    /// Predict churn for every profile in a JSON array or JSON-lines file
    Batch {
        /// Input file
        input: PathBuf,

        /// Score profiles outside the documented ranges instead of rejecting them
        #[arg(long)]
        allow_out_of_range: bool,
    },

    /// Show the feature vector for a customer without running the model
    Encode {
        #[command(flatten)]
        profile: profile::ProfileArgs,
    },

    /// List the feature schema the model must match
    Schema,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Predict {
            profile,
            allow_out_of_range,
            show_features,
        } => {
            let settings = config::Settings::load(cli.config.as_deref())?.with_model_override(cli.model);
            commands::predict::run(
                &settings,
                (&profile).into(),
                allow_out_of_range,
                show_features,
                format,
            )?;
        }
        Commands::Batch {
            input,
            allow_out_of_range,
        } => {
            let settings = config::Settings::load(cli.config.as_deref())?.with_model_override(cli.model);
            commands::batch::run(&settings, &input, allow_out_of_range, format)?;
        }
        Commands::Encode { profile } => {
            commands::encode::run((&profile).into(), format)?;
        }
        Commands::Schema => {
            commands::schema::run(format)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ChurnError>() {
                Some(err) if err.is_fatal() => output::print_error(&format!(
                    "{}. No prediction was made.",
                    err
                )),
                _ => output::print_error(&format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}
