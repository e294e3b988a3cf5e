//! Metric aggregator: category counts, measure sums and completeness

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rates::{mean, percentage, round_to};
use crate::records::Measure;

/// Label used when the config does not name one
pub const DEFAULT_UNSPECIFIED_LABEL: &str = "Unspecified";

/// Count of rows per category value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub counts: BTreeMap<String, u64>,
    pub total: u64,
}

impl Distribution {
    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Share of `key` in percent, unrounded
    pub fn share(&self, key: &str) -> f64 {
        percentage(self.count(key) as f64, self.total as f64)
    }

    /// Every category's share in percent, rounded to `decimals`
    pub fn shares(&self, decimals: u32) -> BTreeMap<String, f64> {
        self.counts
            .iter()
            .map(|(key, count)| {
                let share = percentage(*count as f64, self.total as f64);
                (key.clone(), round_to(share, decimals))
            })
            .collect()
    }

    /// Most frequent category; ties go to the alphabetically first key
    pub fn most_common(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&str, u64)>, (key, count)| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((key.as_str(), *count)),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Sum of a measure over a row set, with completeness tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureSummary {
    /// Sum of the measure with missing/malformed values counted as zero
    pub total: f64,
    /// Every row, complete or not
    pub record_count: usize,
    /// Rows whose measure was missing or malformed
    pub incomplete_count: usize,
}

impl MeasureSummary {
    pub fn add(&mut self, measure: Measure) {
        self.total += measure.value_or_zero();
        self.record_count += 1;
        if !measure.is_complete() {
            self.incomplete_count += 1;
        }
    }

    /// Average over all rows; incomplete rows stay in the denominator
    pub fn average(&self) -> f64 {
        mean(self.total, self.record_count)
    }

    pub fn complete_count(&self) -> usize {
        self.record_count - self.incomplete_count
    }

    /// Percentage of rows with a usable measure; 0 for an empty set
    pub fn completeness(&self) -> f64 {
        percentage(self.complete_count() as f64, self.record_count as f64)
    }
}

/// Folds row sets into counts and sums keyed by categorical fields
#[derive(Debug, Clone)]
pub struct MetricAggregator {
    unspecified_label: String,
}

impl Default for MetricAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_UNSPECIFIED_LABEL)
    }
}

impl MetricAggregator {
    pub fn new(unspecified_label: impl Into<String>) -> Self {
        Self {
            unspecified_label: unspecified_label.into(),
        }
    }

    pub fn unspecified_label(&self) -> &str {
        &self.unspecified_label
    }

    /// Grouping key for a categorical value; missing or blank values map to
    /// the unspecified label
    pub fn category_key<'a>(&'a self, value: Option<&'a str>) -> &'a str {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => &self.unspecified_label,
        }
    }

    /// Count rows per category value
    pub fn distribution<T, F>(&self, rows: &[T], field: F) -> Distribution
    where
        F: Fn(&T) -> Option<&str>,
    {
        let mut distribution = Distribution::default();
        for row in rows {
            let key = self.category_key(field(row));
            *distribution.counts.entry(key.to_string()).or_insert(0) += 1;
            distribution.total += 1;
        }
        distribution
    }

    /// Sum a measure over every row
    pub fn summarize<T, F>(&self, rows: &[T], measure: F) -> MeasureSummary
    where
        F: Fn(&T) -> Measure,
    {
        let mut summary = MeasureSummary::default();
        for row in rows {
            summary.add(measure(row));
        }
        summary
    }

    /// Sum a measure per category value
    pub fn sum_by<T, K, M>(&self, rows: &[T], field: K, measure: M) -> BTreeMap<String, MeasureSummary>
    where
        K: Fn(&T) -> Option<&str>,
        M: Fn(&T) -> Measure,
    {
        let mut sums: BTreeMap<String, MeasureSummary> = BTreeMap::new();
        for row in rows {
            let key = self.category_key(field(row));
            sums.entry(key.to_string()).or_default().add(measure(row));
        }
        sums
    }

    /// `matching rows / all rows * 100`, 0 for an empty set
    pub fn rate<T, P>(&self, rows: &[T], predicate: P) -> f64
    where
        P: Fn(&T) -> bool,
    {
        let matching = rows.iter().filter(|row| predicate(row)).count();
        percentage(matching as f64, rows.len() as f64)
    }
}
