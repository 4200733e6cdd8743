//! CLI command implementations

pub mod batch;
pub mod encode;
pub mod predict;
pub mod schema;

use crate::config::Settings;
use churn_lib::{ChurnError, PredictionLogger, PredictionService};
use tracing::debug;

/// Load the configured model once and build the prediction service.
///
/// A load failure is terminal: nothing is encoded or scored afterwards.
pub fn load_service(
    settings: &Settings,
    logger: &PredictionLogger,
) -> Result<PredictionService, ChurnError> {
    let model_config = settings.model_config();
    debug!(path = %model_config.path.display(), "Loading churn model");
    match PredictionService::load(&model_config) {
        Ok(service) => {
            logger.log_model_loaded(
                &model_config.path,
                service.model_version(),
                service.encoder().schema().version(),
            );
            Ok(service.with_logger(logger.clone()))
        }
        Err(e) => {
            logger.log_model_unavailable(&e);
            Err(e)
        }
    }
}
