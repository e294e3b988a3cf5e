//! Non-conformity resolution and cost

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ReportContext, ReportHeader};
use crate::aggregate::{
    mean, percentage, BenchmarkAssessment, Distribution, GroupedReport, GroupedReportBuilder,
    MeasureSummary, PeriodComparison, Polarity, TimeSeries,
};
use crate::records::{Dated, NonConformity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// Open with a due date before today
    pub overdue: usize,
    /// Closed over total in percent, rounded
    pub resolution_rate: f64,
    /// Rounded; `None` when no NC has both detection and closing dates
    pub average_days_to_close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub header: ReportHeader,
    pub summary: QualitySummary,
    pub status_distribution: Distribution,
    pub severity_distribution: Distribution,
    pub category_distribution: Distribution,
    pub department_distribution: Distribution,
    pub cost: MeasureSummary,
    /// Cost grouped by department and category
    pub cost_breakdown: GroupedReport,
    pub opened_by_month: TimeSeries,
    pub closed_by_month: TimeSeries,
    pub recent_openings: TimeSeries,
    pub last_month: Option<PeriodComparison>,
    pub benchmark: BenchmarkAssessment,
}

pub fn build(ctx: &ReportContext, items: &[NonConformity]) -> QualityReport {
    let aggregator = &ctx.aggregator;
    let offset = ctx.bucketer.offset();
    let today = ctx.today();

    let closed: Vec<&NonConformity> = items.iter().filter(|nc| nc.is_closed()).collect();
    let overdue = items.iter().filter(|nc| nc.is_overdue(today)).count();
    let resolution_rate = percentage(closed.len() as f64, items.len() as f64);

    let durations: Vec<i64> = items.iter().filter_map(NonConformity::days_to_close).collect();
    let average_days_to_close = (!durations.is_empty()).then(|| {
        let total: i64 = durations.iter().sum();
        ctx.round(mean(total as f64, durations.len()))
    });

    let cost = aggregator.summarize(items, |nc| nc.cost);
    if cost.incomplete_count > 0 {
        warn!(
            "{} of {} non-conformities have no usable cost",
            cost.incomplete_count, cost.record_count
        );
    }

    let cost_breakdown = GroupedReportBuilder::new(aggregator, ctx.decimals)
        .dimension("department", |nc: &NonConformity| nc.department.as_deref())
        .dimension("category", |nc: &NonConformity| nc.category.as_deref())
        .build(items, |nc| nc.cost);

    let opened_by_month = ctx.bucketer.calendar_year(
        items,
        ctx.report_year,
        |nc| nc.reporting_date(offset),
        |nc| nc.cost,
    );
    let closed_by_month = ctx.bucketer.calendar_year(
        &closed,
        ctx.report_year,
        |nc| nc.closed_on,
        |nc| nc.cost,
    );
    let recent_openings = ctx.bucketer.trailing_counts(
        items,
        ctx.now,
        ctx.trend_months,
        |nc| nc.reporting_date(offset),
    );
    let last_month = recent_openings.tail_pair().map(|(previous, current)| {
        PeriodComparison::new(current.count as f64, previous.count as f64, ctx.decimals)
    });

    let benchmark = ctx.benchmarks.tiers.assess(
        resolution_rate,
        ctx.benchmarks.values.nc_resolution_rate.unwrap_or(0.0),
        Polarity::HigherIsBetter,
        ctx.decimals,
    );

    QualityReport {
        header: ctx.header(),
        summary: QualitySummary {
            total: items.len(),
            open: items.len() - closed.len(),
            closed: closed.len(),
            overdue,
            resolution_rate: ctx.round(resolution_rate),
            average_days_to_close,
        },
        status_distribution: aggregator.distribution(items, |nc| nc.status.as_deref()),
        severity_distribution: aggregator.distribution(items, |nc| nc.severity.as_deref()),
        category_distribution: aggregator.distribution(items, |nc| nc.category.as_deref()),
        department_distribution: aggregator.distribution(items, |nc| nc.department.as_deref()),
        cost,
        cost_breakdown,
        opened_by_month,
        closed_by_month,
        recent_openings,
        last_month,
        benchmark,
    }
}
