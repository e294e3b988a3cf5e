//! CLI handlers for reports and configuration

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::cli::args::ReportArgs;
use crate::config::AnalyticsConfig;
use crate::engine::{AnalyticsEngine, ReportRequest};
use crate::source::JsonFileRowSource;

pub async fn handle_report_command(args: ReportArgs, config: AnalyticsConfig) -> Result<()> {
    let mut request = ReportRequest::new(args.tenant.clone()).with_filter(args.filter()?);
    if let Some(sector) = &args.sector {
        request = request.with_sector(sector.as_str());
    }
    if let Some(hours) = args.hours_worked {
        request = request.with_hours_worked(hours);
    }

    debug!("Reading rows from {}", args.rows.display());
    let source = Arc::new(JsonFileRowSource::new(&args.rows));
    let engine = AnalyticsEngine::new(source, config)?;
    let output = engine.run(args.kind.into(), &request).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

pub fn handle_config_command(config: &AnalyticsConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
