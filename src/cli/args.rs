//! CLI argument structures

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::ReportKind;
use crate::error::Result;
use crate::source::{DateRange, RowFilter};

/// Aggregate ESG metrics from exported tenant records
#[derive(Parser)]
#[command(name = "esg-analytics")]
#[command(about = "esg-analytics - Aggregate ESG metrics from tenant records", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute a report and print it as JSON
    #[command(name = "report")]
    Report(ReportArgs),

    /// Print the effective configuration as TOML
    #[command(name = "config")]
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKindArg {
    Training,
    Social,
    Quality,
    Emissions,
}

impl From<ReportKindArg> for ReportKind {
    fn from(arg: ReportKindArg) -> Self {
        match arg {
            ReportKindArg::Training => ReportKind::Training,
            ReportKindArg::Social => ReportKind::Social,
            ReportKindArg::Quality => ReportKind::Quality,
            ReportKindArg::Emissions => ReportKind::Emissions,
        }
    }
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report to compute
    #[arg(value_enum)]
    pub kind: ReportKindArg,

    /// JSON file with the exported records
    #[arg(long, value_name = "FILE")]
    pub rows: PathBuf,

    /// Tenant whose records are aggregated
    #[arg(long, value_name = "ID")]
    pub tenant: String,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub position: Option<String>,

    /// First day of the reporting window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of the reporting window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Drop rows whose main measure is below this value
    #[arg(long)]
    pub min_measure: Option<f64>,

    /// Drop rows whose main measure is above this value
    #[arg(long)]
    pub max_measure: Option<f64>,

    /// Hours worked in the period, enables LTIFR in the social report
    #[arg(long)]
    pub hours_worked: Option<f64>,

    /// Benchmark sector (defaults to the configured one)
    #[arg(long)]
    pub sector: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ReportArgs {
    /// Row filter described by the flags
    pub fn filter(&self) -> Result<RowFilter> {
        let mut filter = RowFilter::new().with_measure_range(self.min_measure, self.max_measure);
        if let Some(location) = &self.location {
            filter = filter.with_location(location.as_str());
        }
        if let Some(department) = &self.department {
            filter = filter.with_department(department.as_str());
        }
        if let Some(position) = &self.position {
            filter = filter.with_position(position.as_str());
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            filter = filter.with_date_range(DateRange::new(from, to)?);
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_report_args() {
        let cli = parse(&[
            "esg-analytics",
            "-vv",
            "report",
            "training",
            "--rows",
            "rows.json",
            "--tenant",
            "acme",
            "--department",
            "Ops",
            "--from",
            "2024-01-01",
            "--to",
            "2024-12-31",
        ]);
        assert_eq!(cli.verbose, 2);

        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.kind, ReportKindArg::Training);
        let filter = args.filter().unwrap();
        assert_eq!(filter.department.as_deref(), Some("Ops"));
        assert_eq!(filter.date_range, DateRange::calendar_year(2024));
    }

    #[test]
    fn test_date_bounds_come_in_pairs() {
        let result = Cli::try_parse_from([
            "esg-analytics",
            "report",
            "quality",
            "--rows",
            "rows.json",
            "--tenant",
            "acme",
            "--from",
            "2024-01-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_dates_are_rejected() {
        let cli = parse(&[
            "esg-analytics",
            "report",
            "quality",
            "--rows",
            "rows.json",
            "--tenant",
            "acme",
            "--from",
            "2024-12-31",
            "--to",
            "2024-01-01",
        ]);
        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert!(args.filter().is_err());
    }
}
