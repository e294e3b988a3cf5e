use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::aggregate::{BenchmarkTiers, DEFAULT_UNSPECIFIED_LABEL};
use crate::error::{ErrorCode, EsgError, Result};

pub mod loader;

pub use loader::ConfigLoader;

/// Largest accepted distance from UTC, in minutes
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Longest accepted trailing-month series (ten years)
pub const MAX_TREND_MONTHS: u32 = 120;

/// Most decimal places rounded output may carry
pub const MAX_DISPLAY_DECIMALS: u32 = 6;

/// Sector used when neither the config nor the caller names one
pub const DEFAULT_SECTOR: &str = "general";

/// Location of the user-level config file, if a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "esg", "esg-analytics")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Settings shared by every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub log_level: Option<String>,
    /// Label for missing or blank categorical values
    pub unspecified_label: String,
    /// Decimal places applied to rounded output fields
    pub display_decimals: u32,
    /// Offset from UTC used to assign timestamps to calendar days
    pub reporting_utc_offset_minutes: i32,
    /// Length of trailing-month series
    pub trend_months: u32,
    pub benchmarks: BenchmarkConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            unspecified_label: DEFAULT_UNSPECIFIED_LABEL.to_string(),
            display_decimals: 1,
            reporting_utc_offset_minutes: 0,
            trend_months: 6,
            benchmarks: BenchmarkConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub default_sector: String,
    pub tiers: BenchmarkTiers,
    pub sectors: BTreeMap<String, SectorBenchmarks>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let mut sectors = BTreeMap::new();
        sectors.insert(
            DEFAULT_SECTOR.to_string(),
            SectorBenchmarks {
                training_hours_per_employee: Some(20.0),
                nc_resolution_rate: Some(80.0),
                annual_emissions_tco2e: None,
                tiers: None,
            },
        );
        Self {
            default_sector: DEFAULT_SECTOR.to_string(),
            tiers: BenchmarkTiers::default(),
            sectors,
        }
    }
}

/// Reference values for one sector; a missing value leaves the matching
/// metric unrated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorBenchmarks {
    pub training_hours_per_employee: Option<f64>,
    pub nc_resolution_rate: Option<f64>,
    pub annual_emissions_tco2e: Option<f64>,
    /// Overrides the global tier multipliers for this sector
    pub tiers: Option<BenchmarkTiers>,
}

/// Benchmarks of one sector with its effective tiers
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBenchmarks {
    pub sector: String,
    pub tiers: BenchmarkTiers,
    pub values: SectorBenchmarks,
}

impl AnalyticsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            EsgError::config("Could not serialize configuration").with_source(e)
        })
    }

    /// Apply `ESG_*` environment overrides
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("ESG_LOG_LEVEL") {
            self.log_level = Some(level);
        }

        if let Some(label) = lookup("ESG_UNSPECIFIED_LABEL") {
            self.unspecified_label = label;
        }

        if let Some(offset) = lookup("ESG_REPORTING_UTC_OFFSET_MINUTES") {
            self.reporting_utc_offset_minutes =
                parse_env("ESG_REPORTING_UTC_OFFSET_MINUTES", &offset)?;
        }

        if let Some(months) = lookup("ESG_TREND_MONTHS") {
            self.trend_months = parse_env("ESG_TREND_MONTHS", &months)?;
        }

        if let Some(sector) = lookup("ESG_SECTOR") {
            self.benchmarks.default_sector = sector;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.unspecified_label.trim().is_empty() {
            return Err(invalid("unspecified_label must not be blank"));
        }

        if self.reporting_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(invalid(format!(
                "reporting_utc_offset_minutes {} is outside -{max}..={max}",
                self.reporting_utc_offset_minutes,
                max = MAX_OFFSET_MINUTES
            )));
        }

        if !(1..=MAX_TREND_MONTHS).contains(&self.trend_months) {
            return Err(invalid(format!(
                "trend_months {} is outside 1..={}",
                self.trend_months, MAX_TREND_MONTHS
            )));
        }

        if self.display_decimals > MAX_DISPLAY_DECIMALS {
            return Err(invalid(format!(
                "display_decimals {} is above the maximum of {}",
                self.display_decimals, MAX_DISPLAY_DECIMALS
            )));
        }

        self.benchmarks
            .tiers
            .validate()
            .map_err(|e| invalid("benchmarks.tiers is invalid").with_source(e))?;

        for (name, sector) in &self.benchmarks.sectors {
            if let Some(tiers) = &sector.tiers {
                tiers.validate().map_err(|e| {
                    invalid(format!("benchmarks.sectors.{}.tiers is invalid", name)).with_source(e)
                })?;
            }
        }

        if !self
            .benchmarks
            .sectors
            .contains_key(&self.benchmarks.default_sector)
        {
            return Err(unknown_sector(&self.benchmarks.default_sector));
        }

        Ok(())
    }

    pub fn reporting_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.reporting_utc_offset_minutes * 60).ok_or_else(|| {
            invalid(format!(
                "reporting_utc_offset_minutes {} is not a valid offset",
                self.reporting_utc_offset_minutes
            ))
        })
    }

    /// Benchmarks of `sector`, or of the default sector when `None`
    pub fn benchmarks_for(&self, sector: Option<&str>) -> Result<ResolvedBenchmarks> {
        let name = sector.unwrap_or(&self.benchmarks.default_sector);
        let values = self
            .benchmarks
            .sectors
            .get(name)
            .ok_or_else(|| unknown_sector(name))?;

        Ok(ResolvedBenchmarks {
            sector: name.to_string(),
            tiers: values.tiers.unwrap_or(self.benchmarks.tiers),
            values: values.clone(),
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        EsgError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{} has an invalid value: {:?}", name, value),
            None,
        )
    })
}

fn invalid(message: impl Into<String>) -> EsgError {
    EsgError::config_with_code(ErrorCode::CONFIG_VALIDATION_FAILED, message, None)
}

fn unknown_sector(name: &str) -> EsgError {
    EsgError::config_with_code(
        ErrorCode::CONFIG_UNKNOWN_SECTOR,
        format!("No benchmarks configured for sector '{}'", name),
        None,
    )
}
