//! # esg-analytics
//!
//! Aggregate metrics layer of a multi-tenant ESG platform: fetch one
//! tenant's rows through a [`source::RowSource`] and fold them into
//! serializable reports of rates, distributions, trends, benchmarks and
//! grouped tables.
//!
//! ## Usage
//!
//! ```bash
//! esg-analytics report training --rows export.json --tenant acme --department Ops
//! ```
//!
//! ## Modules
//!
//! - `aggregate` - Shared aggregation components (aggregator, bucketer, trends, grouped tables)
//! - `app` - Logging setup, startup and fatal error handling for the binary
//! - `cli` - Command-line argument parsing and handlers
//! - `config` - Configuration loading, environment overrides and benchmarks
//! - `engine` - Fetches tenant rows and runs reports
//! - `error` - Error type with stable numeric codes
//! - `records` - Tagged record types per entity
//! - `reports` - Training, social, quality and emissions reports
//! - `source` - Row source port with in-memory and JSON file implementations
//! - `testing` - Fixture builders and misbehaving row sources
pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod records;
pub mod reports;
pub mod source;

pub mod testing;


pub use engine::{AnalyticsEngine, ReportKind, ReportOutput, ReportRequest};
pub use error::{EsgError, Result};
