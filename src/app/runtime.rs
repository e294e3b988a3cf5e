//! Startup: resolve the configuration, then bring up logging with it

use anyhow::Result;
use tracing::debug;

use crate::app::{config::AppConfig, logging::init_logging};
use crate::config::{AnalyticsConfig, ConfigLoader};

/// Load the effective configuration and initialize logging
///
/// Logging starts with the configured level, so configuration errors are
/// reported through the caller's fatal error handler rather than the log.
pub async fn initialize_app(config: AppConfig) -> Result<AnalyticsConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &config.config_path {
        loader = loader.with_path(path);
    }
    let analytics = loader.load().await?;

    let config = config.with_configured_level(analytics.log_level.clone());
    init_logging(&config);
    debug!(
        "Using reporting offset {} minutes, sector '{}'",
        analytics.reporting_utc_offset_minutes, analytics.benchmarks.default_sector
    );

    Ok(analytics)
}
