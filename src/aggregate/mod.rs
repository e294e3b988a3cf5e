//! Shared aggregation components
//!
//! Every report is built from the same four pieces: the metric aggregator
//! (counts, sums, rates), the time-bucketer (dense calendar series), the
//! comparative calculator (trends and benchmark tiers) and the grouped report
//! builder. None of them touch the row source or hold state between calls.

pub mod buckets;
pub mod distribution;
pub mod grouped;
pub mod rates;
pub mod trend;

pub use buckets::{Granularity, TimeBucket, TimeBucketer, TimeSeries, YearMonth};
pub use distribution::{Distribution, MeasureSummary, MetricAggregator, DEFAULT_UNSPECIFIED_LABEL};
pub use grouped::{
    rollup_by_entity, DimensionTable, EntityAttributes, EntityRollup, GroupRow, GroupedReport,
    GroupedReportBuilder,
};
pub use rates::{mean, percentage, ratio, round_to};
pub use trend::{
    percent_change, BenchmarkAssessment, BenchmarkTiers, PerformanceTier, PeriodComparison,
    Polarity, TrendDirection,
};
