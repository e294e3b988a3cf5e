//! Command routing and execution

use anyhow::Result;

use crate::cli::args::Commands;
use crate::cli::report_command::{handle_config_command, handle_report_command};
use crate::config::AnalyticsConfig;

/// Execute a CLI command with the already-loaded configuration
pub async fn execute_command(command: Commands, config: AnalyticsConfig) -> Result<()> {
    match command {
        Commands::Report(args) => handle_report_command(args, config).await,
        Commands::Config => handle_config_command(&config),
    }
}
