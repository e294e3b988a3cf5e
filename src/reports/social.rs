//! Social investment and workplace safety

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ReportContext, ReportHeader};
use crate::aggregate::{
    percentage, Distribution, GroupRow, GroupedReportBuilder, PeriodComparison, TimeSeries,
};
use crate::records::{Dated, SafetyIncident, SocialProject};

/// Injury frequency is expressed per million hours worked
const LTIFR_HOURS_BASE: f64 = 1_000_000.0;

/// Metrics the records cannot support and that are therefore not reported
pub const GENDER_DISTRIBUTION: &str = "gender_distribution";
pub const LTIFR: &str = "ltifr";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    pub project_count: usize,
    pub active_projects: usize,
    pub total_investment: f64,
    pub total_budget: f64,
    /// Investment over budget in percent, rounded; may exceed 100
    pub budget_utilization: f64,
    /// Rounded
    pub average_investment_per_project: f64,
    pub total_beneficiaries: f64,
    pub projects_missing_investment: usize,
    pub status_distribution: Distribution,
    pub category_distribution: Distribution,
    pub investment_by_category: Vec<GroupRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySummary {
    pub incident_count: usize,
    pub severity_distribution: Distribution,
    pub total_days_lost: f64,
    pub lost_time_incidents: usize,
    /// Lost-time injury frequency rate, rounded; `None` without hours worked
    pub ltifr: Option<f64>,
    pub incidents_by_month: TimeSeries,
    /// Last trailing month against the one before it
    pub last_month: Option<PeriodComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialReport {
    pub header: ReportHeader,
    pub investment: InvestmentSummary,
    pub safety: SafetySummary,
    pub unavailable_metrics: Vec<String>,
}

pub fn build(
    ctx: &ReportContext,
    projects: &[SocialProject],
    incidents: &[SafetyIncident],
    hours_worked: Option<f64>,
) -> SocialReport {
    let mut unavailable_metrics = vec![GENDER_DISTRIBUTION.to_string()];

    let investment = investment_summary(ctx, projects);
    let safety = safety_summary(ctx, incidents, hours_worked);
    if safety.ltifr.is_none() {
        unavailable_metrics.push(LTIFR.to_string());
    }

    SocialReport {
        header: ctx.header(),
        investment,
        safety,
        unavailable_metrics,
    }
}

fn investment_summary(ctx: &ReportContext, projects: &[SocialProject]) -> InvestmentSummary {
    let aggregator = &ctx.aggregator;

    let investment = aggregator.summarize(projects, |p| p.investment);
    let budget = aggregator.summarize(projects, |p| p.budget);
    let beneficiaries = aggregator.summarize(projects, |p| p.beneficiaries);
    if investment.incomplete_count > 0 {
        warn!(
            "{} of {} social projects have no usable investment",
            investment.incomplete_count, investment.record_count
        );
    }

    let by_category = GroupedReportBuilder::new(aggregator, ctx.decimals)
        .dimension("category", |p: &SocialProject| p.category.as_deref())
        .build(projects, |p| p.investment);

    InvestmentSummary {
        project_count: projects.len(),
        active_projects: projects.iter().filter(|p| p.is_active()).count(),
        total_investment: investment.total,
        total_budget: budget.total,
        budget_utilization: ctx.round(percentage(investment.total, budget.total)),
        average_investment_per_project: ctx.round(investment.average()),
        total_beneficiaries: beneficiaries.total,
        projects_missing_investment: investment.incomplete_count,
        status_distribution: aggregator.distribution(projects, |p| p.status.as_deref()),
        category_distribution: aggregator.distribution(projects, |p| p.category.as_deref()),
        investment_by_category: by_category
            .dimensions
            .into_iter()
            .next()
            .map(|table| table.rows)
            .unwrap_or_default(),
    }
}

fn safety_summary(
    ctx: &ReportContext,
    incidents: &[SafetyIncident],
    hours_worked: Option<f64>,
) -> SafetySummary {
    let aggregator = &ctx.aggregator;
    let offset = ctx.bucketer.offset();

    let days_lost = aggregator.summarize(incidents, |i| i.days_lost);
    let lost_time_incidents = incidents.iter().filter(|i| i.is_lost_time()).count();

    let ltifr = hours_worked
        .filter(|hours| hours.is_finite() && *hours > 0.0)
        .map(|hours| ctx.round(lost_time_incidents as f64 * LTIFR_HOURS_BASE / hours));

    let incidents_by_month = ctx.bucketer.trailing_counts(
        incidents,
        ctx.now,
        ctx.trend_months,
        |i| i.reporting_date(offset),
    );
    let last_month = incidents_by_month.tail_pair().map(|(previous, current)| {
        PeriodComparison::new(current.count as f64, previous.count as f64, ctx.decimals)
    });

    SafetySummary {
        incident_count: incidents.len(),
        severity_distribution: aggregator.distribution(incidents, |i| i.severity.as_deref()),
        total_days_lost: days_lost.total,
        lost_time_incidents,
        ltifr,
        incidents_by_month,
        last_month,
    }
}
