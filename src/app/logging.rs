//! Logging configuration and initialization

use crate::app::config::AppConfig;
use tracing::{debug, trace};

/// Initialize tracing for the binary; logs go to stderr so stdout stays
/// parseable JSON
pub fn init_logging(config: &AppConfig) {
    let log_level = config.log_level();

    let result = tracing_subscriber::fmt()
        .with_env_filter(log_level.as_str())
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2)
        .with_thread_ids(config.verbose >= 3)
        .with_line_number(config.verbose >= 3)
        .try_init();

    if result.is_ok() {
        debug!("esg-analytics started with verbosity level: {}", config.verbose);
        trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
    }
}
