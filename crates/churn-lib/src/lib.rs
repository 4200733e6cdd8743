//! Churn prediction library
//!
//! This crate provides the core functionality for:
//! - Encoding customer profiles into the classifier's feature vector
//! - Loading and running the pre-trained churn classifier
//! - Rule-based risk heuristics and recommendations
//! - A pure display model for presentation shells

pub mod display;
pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod recommendations;
pub mod risk;
pub mod service;

pub use display::DisplayModel;
pub use error::ChurnError;
pub use models::*;
pub use observability::PredictionLogger;
pub use recommendations::recommend;
pub use risk::assess_risk;
pub use service::PredictionService;
