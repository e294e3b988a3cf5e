//! Tenant-scoped row model
//!
//! Every row read from the store is one variant of [`Record`], tagged by its
//! `entity` field. All fields besides the tenant are optional; reports decide
//! how a missing value is counted.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod entities;
pub mod measure;

pub use entities::{EmissionEntry, NonConformity, SafetyIncident, SocialProject, TrainingSession};
pub use measure::Measure;

/// Opaque identifier of an isolated customer organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Entity types the row source can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    TrainingSession,
    NonConformity,
    SafetyIncident,
    SocialProject,
    EmissionEntry,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrainingSession => "training_session",
            Self::NonConformity => "non_conformity",
            Self::SafetyIncident => "safety_incident",
            Self::SocialProject => "social_project",
            Self::EmissionEntry => "emission_entry",
        }
    }

    /// Whether rows of this kind record a department
    pub fn has_department(&self) -> bool {
        matches!(
            self,
            Self::TrainingSession | Self::NonConformity | Self::SafetyIncident
        )
    }

    /// Whether rows of this kind record a job position
    pub fn has_position(&self) -> bool {
        matches!(self, Self::TrainingSession)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row with a calendar position
pub trait Dated {
    /// The domain date of the row (completion, detection, occurrence...)
    fn occurred_on(&self) -> Option<NaiveDate>;

    /// Insertion timestamp recorded by the store
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Date used for bucketing and date-range filters: the domain date, or
    /// the insertion timestamp seen from the reporting offset.
    fn reporting_date(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.occurred_on().or_else(|| {
            self.created_at()
                .map(|ts| ts.with_timezone(&offset).date_naive())
        })
    }
}

/// A typed row that can be extracted from a [`Record`]
pub trait EntityRecord: Dated + Sized {
    const KIND: EntityKind;

    fn tenant_id(&self) -> &TenantId;

    fn from_record(record: Record) -> Option<Self>;
}

/// A row of any entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Record {
    TrainingSession(TrainingSession),
    NonConformity(NonConformity),
    SafetyIncident(SafetyIncident),
    SocialProject(SocialProject),
    EmissionEntry(EmissionEntry),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::TrainingSession(_) => EntityKind::TrainingSession,
            Self::NonConformity(_) => EntityKind::NonConformity,
            Self::SafetyIncident(_) => EntityKind::SafetyIncident,
            Self::SocialProject(_) => EntityKind::SocialProject,
            Self::EmissionEntry(_) => EntityKind::EmissionEntry,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        match self {
            Self::TrainingSession(r) => &r.tenant_id,
            Self::NonConformity(r) => &r.tenant_id,
            Self::SafetyIncident(r) => &r.tenant_id,
            Self::SocialProject(r) => &r.tenant_id,
            Self::EmissionEntry(r) => &r.tenant_id,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::TrainingSession(r) => r.location.as_deref(),
            Self::NonConformity(r) => r.location.as_deref(),
            Self::SafetyIncident(r) => r.location.as_deref(),
            Self::SocialProject(r) => r.location.as_deref(),
            Self::EmissionEntry(r) => r.location.as_deref(),
        }
    }

    pub fn department(&self) -> Option<&str> {
        match self {
            Self::TrainingSession(r) => r.department.as_deref(),
            Self::NonConformity(r) => r.department.as_deref(),
            Self::SafetyIncident(r) => r.department.as_deref(),
            Self::SocialProject(_) | Self::EmissionEntry(_) => None,
        }
    }

    pub fn position(&self) -> Option<&str> {
        match self {
            Self::TrainingSession(r) => r.position.as_deref(),
            _ => None,
        }
    }

    /// The measure min/max filters apply to
    pub fn primary_measure(&self) -> Measure {
        match self {
            Self::TrainingSession(r) => r.hours,
            Self::NonConformity(r) => r.cost,
            Self::SafetyIncident(r) => r.days_lost,
            Self::SocialProject(r) => r.investment,
            Self::EmissionEntry(r) => r.quantity_tco2e,
        }
    }

    pub fn reporting_date(&self, offset: FixedOffset) -> Option<NaiveDate> {
        match self {
            Self::TrainingSession(r) => r.reporting_date(offset),
            Self::NonConformity(r) => r.reporting_date(offset),
            Self::SafetyIncident(r) => r.reporting_date(offset),
            Self::SocialProject(r) => r.reporting_date(offset),
            Self::EmissionEntry(r) => r.reporting_date(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tagged_record_deserialization() {
        let json = r#"{
            "entity": "training_session",
            "tenant_id": "acme",
            "employee_id": "e-1",
            "department": "Ops",
            "hours": "8",
            "completed_on": "2024-05-10"
        }"#;

        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind(), EntityKind::TrainingSession);
        assert_eq!(record.tenant_id().as_str(), "acme");
        assert_eq!(record.department(), Some("Ops"));
        assert_eq!(record.primary_measure(), Measure::Value(8.0));
    }

    #[test]
    fn test_unknown_entity_is_rejected() {
        let json = r#"{"entity": "invoice", "tenant_id": "acme"}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn test_reporting_date_prefers_domain_date() {
        let session = TrainingSession {
            completed_on: NaiveDate::from_ymd_opt(2024, 2, 29),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(session.reporting_date(utc), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_reporting_date_uses_offset_for_timestamps() {
        // 02:00 UTC on March 1st is still February 29th in UTC-3
        let session = TrainingSession {
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap()),
            ..Default::default()
        };
        let brasilia = FixedOffset::west_opt(3 * 3600).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(session.reporting_date(brasilia), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(session.reporting_date(utc), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_entity_extraction() {
        let record = Record::from(SafetyIncident {
            tenant_id: TenantId::new("acme"),
            ..Default::default()
        });
        assert!(TrainingSession::from_record(record.clone()).is_none());
        assert!(SafetyIncident::from_record(record).is_some());
    }
}
