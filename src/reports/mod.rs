//! Domain reports
//!
//! Each report is a pure function from already-fetched rows to a serializable
//! result. The engine does the fetching; everything here is synchronous and
//! builds a fresh value per call.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{round_to, MetricAggregator, TimeBucketer};
use crate::config::{AnalyticsConfig, ResolvedBenchmarks};
use crate::error::Result;
use crate::records::TenantId;
use crate::source::RowFilter;

pub mod emissions;
pub mod quality;
pub mod social;
pub mod training;

pub use emissions::EmissionsReport;
pub use quality::QualityReport;
pub use social::SocialReport;
pub use training::TrainingHoursReport;

/// Everything a report needs besides its rows
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub tenant_id: TenantId,
    pub filter: RowFilter,
    pub aggregator: MetricAggregator,
    pub bucketer: TimeBucketer,
    pub now: DateTime<Utc>,
    pub benchmarks: ResolvedBenchmarks,
    pub decimals: u32,
    pub trend_months: u32,
    /// Year covered by calendar-year series
    pub report_year: i32,
}

impl ReportContext {
    pub fn new(
        config: &AnalyticsConfig,
        tenant_id: TenantId,
        filter: RowFilter,
        sector: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let bucketer = TimeBucketer::new(config.reporting_offset()?);
        let report_year = match &filter.date_range {
            Some(range) => range.end.year(),
            None => bucketer.local_date(now).year(),
        };

        Ok(Self {
            tenant_id,
            filter,
            aggregator: MetricAggregator::new(config.unspecified_label.clone()),
            bucketer,
            now,
            benchmarks: config.benchmarks_for(sector)?,
            decimals: config.display_decimals,
            trend_months: config.trend_months,
            report_year,
        })
    }

    /// Today's date in the reporting offset
    pub fn today(&self) -> NaiveDate {
        self.bucketer.local_date(self.now)
    }

    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.decimals)
    }

    pub fn header(&self) -> ReportHeader {
        ReportHeader {
            tenant_id: self.tenant_id.clone(),
            generated_at: self.now,
            report_year: self.report_year,
            sector: self.benchmarks.sector.clone(),
            filter: self.filter.clone(),
        }
    }
}

/// Identifies what a report was computed over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub tenant_id: TenantId,
    pub generated_at: DateTime<Utc>,
    pub report_year: i32,
    pub sector: String,
    pub filter: RowFilter,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    /// Context for tenant `acme` at noon UTC on 2024-06-15
    pub fn context() -> ReportContext {
        context_at(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
    }

    pub fn context_at(now: DateTime<Utc>) -> ReportContext {
        ReportContext::new(
            &AnalyticsConfig::default(),
            TenantId::new("acme"),
            RowFilter::new(),
            None,
            now,
        )
        .unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DateRange;
    use chrono::TimeZone;

    #[test]
    fn test_report_year_follows_date_range() {
        let range = DateRange::calendar_year(2022).unwrap();
        let ctx = ReportContext::new(
            &AnalyticsConfig::default(),
            TenantId::new("acme"),
            RowFilter::new().with_date_range(range),
            None,
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(ctx.report_year, 2022);
    }

    #[test]
    fn test_report_year_uses_reporting_offset() {
        let mut config = AnalyticsConfig::default();
        config.reporting_utc_offset_minutes = -180;
        // 01:00 UTC on New Year's Day is still December 31st in UTC-3
        let ctx = ReportContext::new(
            &config,
            TenantId::new("acme"),
            RowFilter::new(),
            None,
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(ctx.report_year, 2023);
        assert_eq!(ctx.today(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_unknown_sector_is_rejected() {
        let result = ReportContext::new(
            &AnalyticsConfig::default(),
            TenantId::new("acme"),
            RowFilter::new(),
            Some("mining"),
            Utc::now(),
        );
        assert!(result.is_err());
    }
}
