//! Multi-dimension grouped report builder
//!
//! Transaction-like rows (one per training session, one per emission line)
//! are first folded per entity with [`rollup_by_entity`], then grouped along
//! each requested dimension. Every dimension table partitions the same row
//! set, so its totals always add up to the grand total.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::distribution::{MeasureSummary, MetricAggregator};
use super::rates::round_to;
use crate::records::Measure;

/// One bucket of a dimension table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: String,
    /// Unrounded sum
    pub total_measure: f64,
    /// `total_measure / record_count`, rounded for display
    pub average_measure: f64,
    pub record_count: usize,
}

/// Summary table for one grouping dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    pub dimension: String,
    pub rows: Vec<GroupRow>,
}

impl DimensionTable {
    pub fn row(&self, key: &str) -> Option<&GroupRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.key.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedReport {
    pub total_measure: f64,
    pub record_count: usize,
    pub incomplete_count: usize,
    pub dimensions: Vec<DimensionTable>,
}

impl GroupedReport {
    pub fn dimension(&self, name: &str) -> Option<&DimensionTable> {
        self.dimensions.iter().find(|table| table.dimension == name)
    }
}

type KeyFn<'a, T> = Box<dyn Fn(&T) -> Option<&str> + 'a>;

/// Collects grouping dimensions, then folds a row set into a [`GroupedReport`]
///
/// ```
/// use esg_analytics::aggregate::{GroupedReportBuilder, MetricAggregator};
/// use esg_analytics::records::Measure;
///
/// let rows = vec![
///     ("Ops".to_string(), 10.0),
///     ("Ops".to_string(), 20.0),
///     ("Sales".to_string(), 5.0),
/// ];
/// let aggregator = MetricAggregator::default();
/// let report = GroupedReportBuilder::new(&aggregator, 1)
///     .dimension("department", |r: &(String, f64)| Some(r.0.as_str()))
///     .build(&rows, |r| Measure::Value(r.1));
///
/// let table = report.dimension("department").unwrap();
/// assert_eq!(table.rows[0].key, "Ops");
/// assert_eq!(table.rows[0].total_measure, 30.0);
/// ```
pub struct GroupedReportBuilder<'a, T> {
    aggregator: &'a MetricAggregator,
    decimals: u32,
    dimensions: Vec<(String, KeyFn<'a, T>)>,
}

impl<'a, T> GroupedReportBuilder<'a, T> {
    pub fn new(aggregator: &'a MetricAggregator, decimals: u32) -> Self {
        Self {
            aggregator,
            decimals,
            dimensions: Vec::new(),
        }
    }

    /// Add a grouping dimension; tables come out in the order they were added
    pub fn dimension<F>(mut self, name: impl Into<String>, key: F) -> Self
    where
        F: Fn(&T) -> Option<&str> + 'a,
    {
        self.dimensions.push((name.into(), Box::new(key)));
        self
    }

    pub fn build<M>(&self, rows: &[T], measure: M) -> GroupedReport
    where
        M: Fn(&T) -> Measure,
    {
        let overall = self.aggregator.summarize(rows, &measure);

        let dimensions = self
            .dimensions
            .iter()
            .map(|(name, key)| {
                let sums = self.aggregator.sum_by(rows, |row| key(row), &measure);
                DimensionTable {
                    dimension: name.clone(),
                    rows: sorted_rows(sums.into_iter(), self.decimals),
                }
            })
            .collect();

        GroupedReport {
            total_measure: overall.total,
            record_count: overall.record_count,
            incomplete_count: overall.incomplete_count,
            dimensions,
        }
    }
}

/// Turn per-key summaries into rows ordered by total descending, then key
fn sorted_rows(
    sums: impl Iterator<Item = (String, MeasureSummary)>,
    decimals: u32,
) -> Vec<GroupRow> {
    let mut rows: Vec<GroupRow> = sums
        .map(|(key, summary)| GroupRow {
            key,
            total_measure: summary.total,
            average_measure: round_to(summary.average(), decimals),
            record_count: summary.record_count,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_measure
            .total_cmp(&a.total_measure)
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}

/// Descriptive fields carried by a rolled-up entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityAttributes {
    pub name: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl EntityAttributes {
    /// Overwrite with every field `newer` actually has
    fn refresh(&mut self, newer: EntityAttributes) {
        if newer.name.is_some() {
            self.name = newer.name;
        }
        if newer.location.is_some() {
            self.location = newer.location;
        }
        if newer.department.is_some() {
            self.department = newer.department;
        }
        if newer.position.is_some() {
            self.position = newer.position;
        }
    }
}

/// All rows of one entity folded together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRollup {
    pub entity_id: String,
    pub attributes: EntityAttributes,
    pub total_measure: f64,
    pub record_count: usize,
    pub incomplete_count: usize,
    /// Latest reporting date among the entity's rows
    pub last_seen: Option<NaiveDate>,
}

impl EntityRollup {
    /// The entity's contribution when grouped: its total, or missing when
    /// none of its rows carried a usable value
    pub fn measure(&self) -> Measure {
        if self.record_count > 0 && self.incomplete_count == self.record_count {
            Measure::Missing
        } else {
            Measure::Value(self.total_measure)
        }
    }
}

/// Fold rows per entity key, summing the measure and keeping the most recent
/// descriptive fields.
///
/// A row refreshes the attributes when it is at least as recent as every row
/// seen so far; when either date is unknown, the later row wins. Rows without
/// a key are folded into one entity named with the unspecified label. Output
/// is ordered by total descending, then entity id.
pub fn rollup_by_entity<T, K, A, D, M>(
    aggregator: &MetricAggregator,
    rows: &[T],
    key: K,
    attributes: A,
    date: D,
    measure: M,
) -> Vec<EntityRollup>
where
    K: Fn(&T) -> Option<&str>,
    A: Fn(&T) -> EntityAttributes,
    D: Fn(&T) -> Option<NaiveDate>,
    M: Fn(&T) -> Measure,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rollups: Vec<EntityRollup> = Vec::new();

    for row in rows {
        let entity_id = aggregator.category_key(key(row)).to_string();
        let slot = *index.entry(entity_id.clone()).or_insert_with(|| {
            rollups.push(EntityRollup {
                entity_id,
                attributes: EntityAttributes::default(),
                total_measure: 0.0,
                record_count: 0,
                incomplete_count: 0,
                last_seen: None,
            });
            rollups.len() - 1
        });
        let rollup = &mut rollups[slot];

        let value = measure(row);
        rollup.total_measure += value.value_or_zero();
        rollup.record_count += 1;
        if !value.is_complete() {
            rollup.incomplete_count += 1;
        }

        let row_date = date(row);
        let is_recent = match (row_date, rollup.last_seen) {
            (Some(row_date), Some(seen)) => row_date >= seen,
            _ => true,
        };
        if is_recent {
            rollup.attributes.refresh(attributes(row));
        }
        rollup.last_seen = rollup.last_seen.max(row_date);
    }

    rollups.sort_by(|a, b| {
        b.total_measure
            .total_cmp(&a.total_measure)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DEFAULT_UNSPECIFIED_LABEL;

    #[derive(Clone)]
    struct Session {
        employee: Option<&'static str>,
        department: Option<&'static str>,
        location: Option<&'static str>,
        hours: Measure,
        on: Option<NaiveDate>,
    }

    fn session(department: Option<&'static str>, hours: f64) -> Session {
        Session {
            employee: None,
            department,
            location: None,
            hours: Measure::Value(hours),
            on: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_grouped_hours_by_department() {
        let rows = vec![
            session(Some("Ops"), 10.0),
            session(Some("Ops"), 20.0),
            session(Some("Sales"), 5.0),
        ];
        let aggregator = MetricAggregator::default();
        let report = GroupedReportBuilder::new(&aggregator, 1)
            .dimension("department", |s: &Session| s.department)
            .build(&rows, |s| s.hours);

        let table = report.dimension("department").unwrap();
        assert_eq!(
            table.rows,
            vec![
                GroupRow {
                    key: "Ops".to_string(),
                    total_measure: 30.0,
                    average_measure: 15.0,
                    record_count: 2,
                },
                GroupRow {
                    key: "Sales".to_string(),
                    total_measure: 5.0,
                    average_measure: 5.0,
                    record_count: 1,
                },
            ]
        );
        assert_eq!(report.total_measure, 35.0);
    }

    #[test]
    fn test_missing_key_goes_to_unspecified_bucket() {
        let rows = vec![
            session(Some("Ops"), 1.0),
            session(None, 2.0),
            session(Some(""), 3.0),
            session(None, 4.0),
        ];
        let aggregator = MetricAggregator::default();
        let report = GroupedReportBuilder::new(&aggregator, 1)
            .dimension("department", |s: &Session| s.department)
            .build(&rows, |s| s.hours);

        let unspecified = report
            .dimension("department")
            .and_then(|t| t.row(DEFAULT_UNSPECIFIED_LABEL))
            .unwrap();
        assert_eq!(unspecified.record_count, 3);
        assert_eq!(unspecified.total_measure, 9.0);
    }

    #[test]
    fn test_every_dimension_partitions_the_total() {
        let mut rows = vec![
            session(Some("Ops"), 1.5),
            session(Some("Sales"), 2.25),
            session(None, 7.0),
        ];
        rows[0].location = Some("SP");
        rows[2].location = Some("RJ");
        rows.push(Session {
            hours: Measure::Malformed,
            ..session(Some("Ops"), 0.0)
        });

        let aggregator = MetricAggregator::default();
        let report = GroupedReportBuilder::new(&aggregator, 1)
            .dimension("department", |s: &Session| s.department)
            .dimension("location", |s: &Session| s.location)
            .build(&rows, |s| s.hours);

        assert_eq!(report.incomplete_count, 1);
        for table in &report.dimensions {
            let sum: f64 = table.rows.iter().map(|r| r.total_measure).sum();
            let count: usize = table.rows.iter().map(|r| r.record_count).sum();
            assert!((sum - report.total_measure).abs() < 1e-9);
            assert_eq!(count, report.record_count);
        }
    }

    #[test]
    fn test_ties_are_ordered_by_key() {
        let rows = vec![session(Some("b"), 5.0), session(Some("a"), 5.0)];
        let aggregator = MetricAggregator::default();
        let report = GroupedReportBuilder::new(&aggregator, 1)
            .dimension("department", |s: &Session| s.department)
            .build(&rows, |s| s.hours);
        assert_eq!(report.dimensions[0].keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_rows_give_empty_tables() {
        let rows: Vec<Session> = Vec::new();
        let aggregator = MetricAggregator::default();
        let report = GroupedReportBuilder::new(&aggregator, 1)
            .dimension("department", |s: &Session| s.department)
            .build(&rows, |s| s.hours);
        assert_eq!(report.total_measure, 0.0);
        assert!(report.dimensions[0].rows.is_empty());
    }

    #[test]
    fn test_rollup_keeps_latest_attributes() {
        let rows = vec![
            Session {
                employee: Some("e1"),
                department: Some("Sales"),
                location: Some("SP"),
                hours: Measure::Value(4.0),
                on: date(2024, 5, 1),
            },
            Session {
                employee: Some("e1"),
                department: Some("Ops"),
                location: None,
                hours: Measure::Value(6.0),
                on: date(2024, 6, 1),
            },
            Session {
                employee: Some("e1"),
                department: Some("Legal"),
                location: None,
                hours: Measure::Missing,
                on: date(2024, 1, 1),
            },
            Session {
                employee: Some("e2"),
                department: Some("Ops"),
                location: None,
                hours: Measure::Value(3.0),
                on: None,
            },
        ];

        let aggregator = MetricAggregator::default();
        let rollups = rollup_by_entity(
            &aggregator,
            &rows,
            |s| s.employee,
            |s| EntityAttributes {
                department: s.department.map(str::to_string),
                location: s.location.map(str::to_string),
                ..Default::default()
            },
            |s| s.on,
            |s| s.hours,
        );

        assert_eq!(rollups.len(), 2);
        let e1 = &rollups[0];
        assert_eq!(e1.entity_id, "e1");
        assert_eq!(e1.total_measure, 10.0);
        assert_eq!(e1.record_count, 3);
        assert_eq!(e1.incomplete_count, 1);
        assert_eq!(e1.attributes.department.as_deref(), Some("Ops"));
        assert_eq!(e1.attributes.location.as_deref(), Some("SP"));
        assert_eq!(e1.last_seen, date(2024, 6, 1));
        assert_eq!(rollups[1].entity_id, "e2");
    }

    #[test]
    fn test_keyless_rows_roll_up_together() {
        let mut a = session(Some("Ops"), 1.0);
        a.employee = None;
        let mut b = session(Some("Ops"), 2.0);
        b.employee = Some("  ");

        let aggregator = MetricAggregator::default();
        let rollups = rollup_by_entity(
            &aggregator,
            &[a, b],
            |s| s.employee,
            |_| EntityAttributes::default(),
            |s| s.on,
            |s| s.hours,
        );
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].entity_id, DEFAULT_UNSPECIFIED_LABEL);
        assert_eq!(rollups[0].total_measure, 3.0);
    }

    #[test]
    fn test_rollup_measure_reports_entities_without_values() {
        let rollup = EntityRollup {
            entity_id: "e9".to_string(),
            attributes: EntityAttributes::default(),
            total_measure: 0.0,
            record_count: 2,
            incomplete_count: 2,
            last_seen: None,
        };
        assert_eq!(rollup.measure(), Measure::Missing);
    }
}
