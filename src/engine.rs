//! Analytics engine: fetch tenant rows, then fold them into reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::error::{ErrorCode, EsgError, Result};
use crate::records::{
    EmissionEntry, EntityRecord, NonConformity, SafetyIncident, SocialProject,
    TenantId, TrainingSession,
};
use crate::reports::{
    self, EmissionsReport, QualityReport, ReportContext, SocialReport, TrainingHoursReport,
};
use crate::source::{DateRange, RowFilter, RowSource};

/// Which report to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Training,
    Social,
    Quality,
    Emissions,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Training => "training",
            Self::Social => "social",
            Self::Quality => "quality",
            Self::Emissions => "emissions",
        };
        f.write_str(name)
    }
}

/// Parameters of one report request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRequest {
    pub tenant_id: TenantId,
    pub filter: RowFilter,
    /// Overrides the configured default sector
    pub sector: Option<String>,
    /// Needed for LTIFR in the social report
    pub hours_worked: Option<f64>,
}

impl ReportRequest {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: TenantId::new(tenant_id),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: RowFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_hours_worked(mut self, hours: f64) -> Self {
        self.hours_worked = Some(hours);
        self
    }
}

/// Any report, tagged by its kind when serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum ReportOutput {
    Training(TrainingHoursReport),
    Social(SocialReport),
    Quality(QualityReport),
    Emissions(EmissionsReport),
}

/// Entry point of the aggregation layer
///
/// The row source is injected here and shared by every request. The engine
/// keeps no state between requests; each report is computed from a fresh read.
pub struct AnalyticsEngine {
    source: Arc<dyn RowSource>,
    config: AnalyticsConfig,
    reference_time: Option<DateTime<Utc>>,
}

impl AnalyticsEngine {
    pub fn new(source: Arc<dyn RowSource>, config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            reference_time: None,
        })
    }

    /// Pin "now" instead of reading the wall clock
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    fn context(&self, request: &ReportRequest) -> Result<ReportContext> {
        if request.tenant_id.as_str().trim().is_empty() {
            return Err(EsgError::validation_with_code(
                ErrorCode::VALIDATION_INVALID_INPUT,
                "tenant id must not be blank",
                Some("tenant_id".to_string()),
            ));
        }
        request.filter.validate()?;
        ReportContext::new(
            &self.config,
            request.tenant_id.clone(),
            request.filter.clone(),
            request.sector.as_deref(),
            self.now(),
        )
    }

    /// Fetch and filter the rows of one entity type for one tenant
    ///
    /// A row owned by another tenant or of another type means the source broke
    /// its contract; the request fails instead of dropping the row. Filter
    /// fields the entity type does not record are ignored.
    pub async fn load<T: EntityRecord>(
        &self,
        tenant: &TenantId,
        filter: &RowFilter,
    ) -> Result<Vec<T>> {
        let kind = T::KIND;
        let offset = self.config.reporting_offset()?;
        let filter = &filter.scoped_to(kind);

        let records = self
            .source
            .fetch_rows(tenant, kind, filter)
            .await
            .map_err(|e| EsgError::from(e).with_scope(tenant.as_str(), kind.as_str()))?;
        let fetched = records.len();

        let mut rows = Vec::with_capacity(fetched);
        for record in records {
            if record.tenant_id() != tenant {
                return Err(EsgError::tenant_mismatch(
                    tenant.as_str(),
                    record.tenant_id().as_str(),
                )
                .with_context(format!("{} returned a foreign {} row", self.source.name(), kind)));
            }
            let found = record.kind();
            if found != kind {
                return Err(EsgError::source_with_code(
                    ErrorCode::SOURCE_CONTRACT_VIOLATION,
                    format!("asked for {} rows but received a {} row", kind, found),
                    Some(tenant.to_string()),
                    Some(kind.to_string()),
                ));
            }
            if !filter.matches(&record, offset) {
                continue;
            }
            if let Some(row) = T::from_record(record) {
                rows.push(row);
            }
        }

        debug!(
            "Loaded {} of {} {} rows for tenant {} from {}",
            rows.len(),
            fetched,
            kind,
            tenant,
            self.source.name()
        );
        Ok(rows)
    }

    pub async fn training_hours_report(
        &self,
        request: &ReportRequest,
    ) -> Result<TrainingHoursReport> {
        let ctx = self.context(request)?;
        let sessions: Vec<TrainingSession> = self.load(&ctx.tenant_id, &ctx.filter).await?;

        let report = reports::training::build(&ctx, &sessions);
        info!(
            "Training report for {}: {} sessions, {} employees",
            ctx.tenant_id, report.summary.session_count, report.summary.employee_count
        );
        Ok(report)
    }

    pub async fn social_report(&self, request: &ReportRequest) -> Result<SocialReport> {
        let ctx = self.context(request)?;
        let projects: Vec<SocialProject> = self.load(&ctx.tenant_id, &ctx.filter).await?;
        let incidents: Vec<SafetyIncident> = self.load(&ctx.tenant_id, &ctx.filter).await?;

        let report = reports::social::build(&ctx, &projects, &incidents, request.hours_worked);
        info!(
            "Social report for {}: {} projects, {} incidents",
            ctx.tenant_id, report.investment.project_count, report.safety.incident_count
        );
        Ok(report)
    }

    pub async fn quality_report(&self, request: &ReportRequest) -> Result<QualityReport> {
        let ctx = self.context(request)?;
        let items: Vec<NonConformity> = self.load(&ctx.tenant_id, &ctx.filter).await?;

        let report = reports::quality::build(&ctx, &items);
        info!(
            "Quality report for {}: {} non-conformities, {} open",
            ctx.tenant_id, report.summary.total, report.summary.open
        );
        Ok(report)
    }

    /// Emissions for the requested window plus the same window a year earlier
    ///
    /// Without a date range the window is the report year, so both sides of
    /// the year-over-year comparison cover one calendar year.
    pub async fn emissions_report(&self, request: &ReportRequest) -> Result<EmissionsReport> {
        let mut ctx = self.context(request)?;
        if ctx.filter.date_range.is_none() {
            ctx.filter.date_range = DateRange::calendar_year(ctx.report_year);
        }
        let entries: Vec<EmissionEntry> = self.load(&ctx.tenant_id, &ctx.filter).await?;

        let previous_window = ctx.filter.date_range.and_then(|range| range.previous_year());
        let previous_entries: Vec<EmissionEntry> = match previous_window {
            Some(window) => {
                let filter = ctx.filter.clone().with_date_range(window);
                self.load(&ctx.tenant_id, &filter).await?
            }
            None => Vec::new(),
        };

        let report = reports::emissions::build(&ctx, &entries, previous_window, &previous_entries);
        info!(
            "Emissions report for {}: {:.1} tCO2e across {} entries",
            ctx.tenant_id, report.total_tco2e, report.entry_count
        );
        Ok(report)
    }

    pub async fn run(&self, kind: ReportKind, request: &ReportRequest) -> Result<ReportOutput> {
        debug!("Running {} report for tenant {}", kind, request.tenant_id);
        Ok(match kind {
            ReportKind::Training => ReportOutput::Training(self.training_hours_report(request).await?),
            ReportKind::Social => ReportOutput::Social(self.social_report(request).await?),
            ReportKind::Quality => ReportOutput::Quality(self.quality_report(request).await?),
            ReportKind::Emissions => {
                ReportOutput::Emissions(self.emissions_report(request).await?)
            }
        })
    }
}
