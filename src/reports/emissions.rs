//! Greenhouse gas inventory with year-over-year comparison

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ReportContext, ReportHeader};
use crate::aggregate::{
    BenchmarkAssessment, GroupRow, GroupedReport, GroupedReportBuilder, PeriodComparison,
    Polarity, TimeSeries,
};
use crate::records::{Dated, EmissionEntry};
use crate::source::DateRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsReport {
    pub header: ReportHeader,
    pub total_tco2e: f64,
    pub entry_count: usize,
    pub entries_missing_quantity: usize,
    pub by_scope: Vec<GroupRow>,
    /// Grouped by scope, category and location
    pub grouped: GroupedReport,
    pub monthly: TimeSeries,
    /// Window the comparison was read from
    pub previous_window: Option<DateRange>,
    pub year_over_year: PeriodComparison,
    /// Lower totals rate better
    pub benchmark: BenchmarkAssessment,
}

pub fn build(
    ctx: &ReportContext,
    entries: &[EmissionEntry],
    previous_window: Option<DateRange>,
    previous_entries: &[EmissionEntry],
) -> EmissionsReport {
    let offset = ctx.bucketer.offset();

    let grouped = GroupedReportBuilder::new(&ctx.aggregator, ctx.decimals)
        .dimension("scope", |e: &EmissionEntry| e.scope.as_deref())
        .dimension("category", |e: &EmissionEntry| e.category.as_deref())
        .dimension("location", |e: &EmissionEntry| e.location.as_deref())
        .build(entries, |e| e.quantity_tco2e);
    if grouped.incomplete_count > 0 {
        warn!(
            "{} of {} emission entries have no usable quantity",
            grouped.incomplete_count, grouped.record_count
        );
    }

    let previous = ctx
        .aggregator
        .summarize(previous_entries, |e| e.quantity_tco2e);

    let monthly = ctx.bucketer.calendar_year(
        entries,
        ctx.report_year,
        |e| e.reporting_date(offset),
        |e| e.quantity_tco2e,
    );

    let benchmark = ctx.benchmarks.tiers.assess(
        grouped.total_measure,
        ctx.benchmarks.values.annual_emissions_tco2e.unwrap_or(0.0),
        Polarity::LowerIsBetter,
        ctx.decimals,
    );

    EmissionsReport {
        header: ctx.header(),
        total_tco2e: grouped.total_measure,
        entry_count: grouped.record_count,
        entries_missing_quantity: grouped.incomplete_count,
        by_scope: grouped
            .dimension("scope")
            .map(|table| table.rows.clone())
            .unwrap_or_default(),
        year_over_year: PeriodComparison::new(grouped.total_measure, previous.total, ctx.decimals),
        previous_window,
        grouped,
        monthly,
        benchmark,
    }
}
