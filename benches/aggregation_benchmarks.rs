//! Performance benchmarks for the aggregation primitives
//! Grouped reports, per-employee rollups and monthly bucketing over generated rows

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use esg_analytics::aggregate::{
    rollup_by_entity, EntityAttributes, EntityRollup, GroupedReportBuilder, MetricAggregator,
    TimeBucketer,
};
use esg_analytics::records::{Measure, TrainingSession};
use esg_analytics::testing::training_session;
use std::hint::black_box;

const DEPARTMENTS: &[&str] = &["Ops", "Sales", "Legal", "Finance", "HR"];
const LOCATIONS: &[&str] = &["SP", "RJ", "BH"];

fn generate_sessions(count: usize) -> Vec<TrainingSession> {
    (0..count)
        .map(|i| {
            let employee = format!("e{}", i % (count / 4).max(1));
            let mut session = training_session(
                "acme",
                &employee,
                DEPARTMENTS[i % DEPARTMENTS.len()],
                (i % 16) as f64 + 0.5,
            );
            session.location = Some(LOCATIONS[i % LOCATIONS.len()].to_string());
            session.completed_on = NaiveDate::from_ymd_opt(2024, (i % 12) as u32 + 1, 1);
            if i % 17 == 0 {
                session.hours = Measure::Missing;
            }
            session
        })
        .collect()
}

/// Benchmark grouping raw sessions across two dimensions
fn bench_grouped_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouped_report");
    let aggregator = MetricAggregator::default();

    for size in [100, 1000, 10000] {
        let sessions = generate_sessions(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &sessions, |b, sessions| {
            let builder = GroupedReportBuilder::new(&aggregator, 1)
                .dimension("department", |s: &TrainingSession| s.department.as_deref())
                .dimension("location", |s: &TrainingSession| s.location.as_deref());
            b.iter(|| black_box(builder.build(sessions, |s| s.hours)));
        });
    }

    group.finish();
}

/// Benchmark collapsing sessions into one rollup per employee
fn bench_entity_rollup(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_rollup");
    let aggregator = MetricAggregator::default();

    for size in [100, 1000, 10000] {
        let sessions = generate_sessions(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &sessions, |b, sessions| {
            b.iter(|| {
                let rollups: Vec<EntityRollup> = rollup_by_entity(
                    &aggregator,
                    sessions,
                    |s| s.employee_id.as_deref(),
                    |s| EntityAttributes {
                        name: s.employee_name.clone(),
                        location: s.location.clone(),
                        department: s.department.clone(),
                        position: s.position.clone(),
                    },
                    |s| s.completed_on,
                    |s| s.hours,
                );
                black_box(rollups)
            });
        });
    }

    group.finish();
}

/// Benchmark dense monthly bucketing for one calendar year
fn bench_calendar_year(c: &mut Criterion) {
    let mut group = c.benchmark_group("calendar_year");
    let bucketer = TimeBucketer::utc();

    for size in [100, 1000, 10000] {
        let sessions = generate_sessions(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &sessions, |b, sessions| {
            b.iter(|| {
                black_box(bucketer.calendar_year(sessions, 2024, |s| s.completed_on, |s| s.hours))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_grouped_report,
    bench_entity_rollup,
    bench_calendar_year,
);

criterion_main!(benches);
