//! Row source port
//!
//! The aggregation layer never talks to the store directly. It is handed a
//! [`RowSource`] at construction time and asks it for the rows of one entity
//! type for one tenant.

use async_trait::async_trait;
use chrono::{FixedOffset, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ErrorCode, EsgError, Result};
use crate::records::{EntityKind, Record, TenantId};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileRowSource;
pub use memory::MemoryRowSource;

/// Result type for row source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Failures raised by a row source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The backing store could not be reached
    #[error("Row source unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the query
    #[error("Query for {entity} failed: {message}")]
    Query { entity: EntityKind, message: String },

    /// Rows were returned but could not be decoded
    #[error("Could not decode rows: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetches tenant-scoped rows
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch every row of `kind` owned by `tenant`, in insertion order.
    ///
    /// `filter` may be pushed down to the store; callers re-apply it, so a
    /// source is free to ignore it.
    async fn fetch_rows(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        filter: &RowFilter,
    ) -> SourceResult<Vec<Record>>;

    /// Name used in log lines
    fn name(&self) -> &str {
        "row-source"
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(EsgError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("date range starts after it ends ({} > {})", start, end),
                Some("date_range".to_string()),
            ));
        }
        Ok(Self { start, end })
    }

    /// January 1st to December 31st of `year`
    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The same window one year earlier; February 29th clamps to the 28th
    pub fn previous_year(&self) -> Option<Self> {
        Some(Self {
            start: self.start.checked_sub_months(Months::new(12))?,
            end: self.end.checked_sub_months(Months::new(12))?,
        })
    }
}

/// Predicates applied to rows before aggregation
///
/// String filters are exact matches on trimmed values; a row without the
/// filtered field never matches. The date range excludes undated rows. The
/// measure range compares the row's primary measure, counting missing or
/// malformed measures as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    pub location: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub date_range: Option<DateRange>,
    pub min_measure: Option<f64>,
    pub max_measure: Option<f64>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_measure_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_measure = min;
        self.max_measure = max;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The filter restricted to the fields rows of `kind` record
    ///
    /// A department or position filter says nothing about entity types that
    /// have no such field, so it is dropped for them rather than excluding
    /// every row.
    pub fn scoped_to(&self, kind: EntityKind) -> Self {
        let mut scoped = self.clone();
        if !kind.has_department() {
            scoped.department = None;
        }
        if !kind.has_position() {
            scoped.position = None;
        }
        scoped
    }

    /// Reject bounds that no row could satisfy
    pub fn validate(&self) -> Result<()> {
        for (name, bound) in [("min_measure", self.min_measure), ("max_measure", self.max_measure)] {
            if bound.is_some_and(|b| !b.is_finite()) {
                return Err(EsgError::validation_with_code(
                    ErrorCode::VALIDATION_INVALID_INPUT,
                    "measure bound must be a finite number",
                    Some(name.to_string()),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_measure, self.max_measure) {
            if min > max {
                return Err(EsgError::validation_with_code(
                    ErrorCode::VALIDATION_OUT_OF_RANGE,
                    format!("min_measure {} is greater than max_measure {}", min, max),
                    Some("min_measure".to_string()),
                ));
            }
        }
        Ok(())
    }

    pub fn matches(&self, record: &Record, offset: FixedOffset) -> bool {
        if !field_matches(self.location.as_deref(), record.location())
            || !field_matches(self.department.as_deref(), record.department())
            || !field_matches(self.position.as_deref(), record.position())
        {
            return false;
        }

        if let Some(range) = &self.date_range {
            match record.reporting_date(offset) {
                Some(date) if range.contains(date) => {}
                _ => return false,
            }
        }

        let measure = record.primary_measure().value_or_zero();
        if self.min_measure.is_some_and(|min| measure < min) {
            return false;
        }
        if self.max_measure.is_some_and(|max| measure > max) {
            return false;
        }

        true
    }
}

fn field_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual.is_some_and(|actual| actual.trim() == expected.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Measure, TrainingSession};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn session(department: Option<&str>, hours: Measure, on: Option<NaiveDate>) -> Record {
        Record::from(TrainingSession {
            tenant_id: TenantId::new("acme"),
            department: department.map(str::to_string),
            hours,
            completed_on: on,
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = RowFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&session(None, Measure::Missing, None), utc()));
    }

    #[test]
    fn test_exact_match_requires_field() {
        let filter = RowFilter::new().with_department("Ops");
        assert!(filter.matches(&session(Some(" Ops "), Measure::Missing, None), utc()));
        assert!(!filter.matches(&session(Some("ops"), Measure::Missing, None), utc()));
        assert!(!filter.matches(&session(None, Measure::Missing, None), utc()));
    }

    #[test]
    fn test_scoping_drops_fields_the_kind_lacks() {
        let filter = RowFilter::new()
            .with_location("SP")
            .with_department("Ops")
            .with_position("Analyst");

        assert_eq!(filter.scoped_to(EntityKind::TrainingSession), filter);

        let incidents = filter.scoped_to(EntityKind::SafetyIncident);
        assert_eq!(incidents.department.as_deref(), Some("Ops"));
        assert_eq!(incidents.position, None);

        let projects = filter.scoped_to(EntityKind::SocialProject);
        assert_eq!(projects.location.as_deref(), Some("SP"));
        assert_eq!(projects.department, None);
        assert_eq!(projects.position, None);
    }

    #[test]
    fn test_date_range_excludes_undated_rows() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        let filter = RowFilter::new().with_date_range(range);
        assert!(filter.matches(&session(None, Measure::Missing, Some(date(2024, 3, 31))), utc()));
        assert!(!filter.matches(&session(None, Measure::Missing, Some(date(2024, 4, 1))), utc()));
        assert!(!filter.matches(&session(None, Measure::Missing, None), utc()));
    }

    #[test]
    fn test_measure_range_counts_missing_as_zero() {
        let filter = RowFilter::new().with_measure_range(Some(0.0), Some(10.0));
        assert!(filter.matches(&session(None, Measure::Missing, None), utc()));
        assert!(filter.matches(&session(None, Measure::Value(10.0), None), utc()));
        assert!(!filter.matches(&session(None, Measure::Value(10.5), None), utc()));

        let filter = RowFilter::new().with_measure_range(Some(1.0), None);
        assert!(!filter.matches(&session(None, Measure::Malformed, None), utc()));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let filter = RowFilter::new().with_measure_range(Some(5.0), Some(1.0));
        let err = filter.validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_OUT_OF_RANGE);

        let filter = RowFilter::new().with_measure_range(Some(f64::NAN), None);
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_date_range_construction() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());

        let leap = DateRange::new(date(2024, 2, 29), date(2024, 12, 31)).unwrap();
        let previous = leap.previous_year().unwrap();
        assert_eq!(previous.start, date(2023, 2, 28));
        assert_eq!(previous.end, date(2023, 12, 31));

        let year = DateRange::calendar_year(2023).unwrap();
        assert!(year.contains(date(2023, 12, 31)));
        assert!(!year.contains(date(2024, 1, 1)));
    }
}
