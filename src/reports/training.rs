//! Training hours per employee

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ReportContext, ReportHeader};
use crate::aggregate::{
    percentage, rollup_by_entity, ratio, BenchmarkAssessment, Distribution, EntityAttributes,
    EntityRollup, GroupedReport, GroupedReportBuilder, Polarity, TimeSeries,
};
use crate::records::{Dated, TrainingSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub total_hours: f64,
    pub session_count: usize,
    pub employee_count: usize,
    /// Rounded
    pub average_hours_per_employee: f64,
    pub sessions_missing_hours: usize,
    /// Completed sessions over all sessions, rounded
    pub completion_rate: f64,
    /// Sessions with usable hours over all sessions, rounded
    pub data_completeness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHoursReport {
    pub header: ReportHeader,
    pub summary: TrainingSummary,
    pub status_distribution: Distribution,
    /// One entry per employee, most hours first
    pub employees: Vec<EntityRollup>,
    /// Employee totals grouped by location, department and position
    pub grouped: GroupedReport,
    pub monthly_hours: TimeSeries,
    pub benchmark: BenchmarkAssessment,
}

pub fn build(ctx: &ReportContext, sessions: &[TrainingSession]) -> TrainingHoursReport {
    let aggregator = &ctx.aggregator;
    let offset = ctx.bucketer.offset();

    let hours = aggregator.summarize(sessions, |s| s.hours);
    if hours.incomplete_count > 0 {
        warn!(
            "{} of {} training sessions have no usable hours",
            hours.incomplete_count, hours.record_count
        );
    }

    let employees = rollup_by_entity(
        aggregator,
        sessions,
        |s| s.employee_id.as_deref(),
        |s| EntityAttributes {
            name: s.employee_name.clone(),
            location: s.location.clone(),
            department: s.department.clone(),
            position: s.position.clone(),
        },
        |s| s.reporting_date(offset),
        |s| s.hours,
    );

    let grouped = GroupedReportBuilder::new(aggregator, ctx.decimals)
        .dimension("location", |e: &EntityRollup| e.attributes.location.as_deref())
        .dimension("department", |e: &EntityRollup| {
            e.attributes.department.as_deref()
        })
        .dimension("position", |e: &EntityRollup| e.attributes.position.as_deref())
        .build(&employees, EntityRollup::measure);

    let monthly_hours = ctx.bucketer.calendar_year(
        sessions,
        ctx.report_year,
        |s| s.reporting_date(offset),
        |s| s.hours,
    );

    let average_hours = ratio(hours.total, employees.len() as f64);
    let benchmark = ctx.benchmarks.tiers.assess(
        average_hours,
        ctx.benchmarks.values.training_hours_per_employee.unwrap_or(0.0),
        Polarity::HigherIsBetter,
        ctx.decimals,
    );

    let completed = sessions.iter().filter(|s| s.is_completed()).count();

    TrainingHoursReport {
        header: ctx.header(),
        summary: TrainingSummary {
            total_hours: hours.total,
            session_count: hours.record_count,
            employee_count: employees.len(),
            average_hours_per_employee: ctx.round(average_hours),
            sessions_missing_hours: hours.incomplete_count,
            completion_rate: ctx.round(percentage(completed as f64, sessions.len() as f64)),
            data_completeness: ctx.round(hours.completeness()),
        },
        status_distribution: aggregator.distribution(sessions, |s| s.status.as_deref()),
        employees,
        grouped,
        monthly_hours,
        benchmark,
    }
}
