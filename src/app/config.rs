//! Application configuration
//!
//! Settings that come from the command line rather than the config file.

use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Explicit config file; the user-level file is used when absent
    pub config_path: Option<PathBuf>,
    /// Log level from the config file, used when no `-v` flag is given
    pub configured_level: Option<String>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            ..Default::default()
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn with_configured_level(mut self, level: Option<String>) -> Self {
        self.configured_level = level;
        self
    }

    /// Get the log filter based on verbosity, falling back to the configured
    /// level
    pub fn log_level(&self) -> String {
        match self.verbose {
            0 => self
                .configured_level
                .clone()
                .unwrap_or_else(|| "info".to_string()),
            1 => "debug".to_string(),
            2 => "trace".to_string(),
            _ => "trace,tokio=debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_wins_over_configured_level() {
        let config = AppConfig::new(0).with_configured_level(Some("warn".to_string()));
        assert_eq!(config.log_level(), "warn");

        let config = AppConfig::new(2).with_configured_level(Some("warn".to_string()));
        assert_eq!(config.log_level(), "trace");

        assert_eq!(AppConfig::new(0).log_level(), "info");
        assert_eq!(AppConfig::new(1).log_level(), "debug");
    }
}
