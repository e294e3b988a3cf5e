//! Typed rows for each entity the reports read

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Dated, EntityKind, EntityRecord, Measure, Record, TenantId};

const COMPLETED_TRAINING_STATUSES: &[&str] = &["concluído", "concluido", "completed", "finalizado"];
const CLOSED_NC_STATUSES: &[&str] = &["fechada", "encerrada", "resolvida", "closed", "resolved"];
const ACTIVE_PROJECT_STATUSES: &[&str] = &["ativo", "em andamento", "active", "in progress"];

/// Case-insensitive membership test against a status vocabulary
fn status_in(status: Option<&str>, vocabulary: &[&str]) -> bool {
    status
        .map(|s| s.trim().to_lowercase())
        .is_some_and(|s| vocabulary.iter().any(|v| *v == s))
}

/// One attendance of one employee at one training program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub tenant_id: TenantId,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub program: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub hours: Measure,
    pub completed_on: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TrainingSession {
    pub fn is_completed(&self) -> bool {
        status_in(self.status.as_deref(), COMPLETED_TRAINING_STATUSES)
    }
}

/// A non-conformity raised by an audit or inspection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NonConformity {
    pub tenant_id: TenantId,
    pub code: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub cost: Measure,
    pub detected_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub closed_on: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NonConformity {
    /// Closed when a closing date is recorded or the status says so
    pub fn is_closed(&self) -> bool {
        self.closed_on.is_some() || status_in(self.status.as_deref(), CLOSED_NC_STATUSES)
    }

    /// Open past its due date as of `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_closed() && self.due_on.is_some_and(|due| due < today)
    }

    /// Days between detection and closing; `None` unless both dates are known
    /// and in order
    pub fn days_to_close(&self) -> Option<i64> {
        match (self.detected_on, self.closed_on) {
            (Some(detected), Some(closed)) if closed >= detected => {
                Some((closed - detected).num_days())
            }
            _ => None,
        }
    }
}

/// A workplace safety incident
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyIncident {
    pub tenant_id: TenantId,
    pub severity: Option<String>,
    pub incident_type: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub days_lost: Measure,
    pub occurred_on: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl SafetyIncident {
    /// An incident that cost at least one working day
    pub fn is_lost_time(&self) -> bool {
        self.days_lost.value_or_zero() > 0.0
    }
}

/// A community or social investment project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProject {
    pub tenant_id: TenantId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub investment: Measure,
    #[serde(default)]
    pub budget: Measure,
    #[serde(default)]
    pub beneficiaries: Measure,
    pub started_on: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl SocialProject {
    pub fn is_active(&self) -> bool {
        status_in(self.status.as_deref(), ACTIVE_PROJECT_STATUSES)
    }
}

/// One line of a greenhouse gas inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionEntry {
    pub tenant_id: TenantId,
    pub scope: Option<String>,
    pub category: Option<String>,
    pub source_name: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub quantity_tco2e: Measure,
    pub period_start: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

macro_rules! entity_record {
    ($ty:ident, $variant:ident, $date:ident) => {
        impl Dated for $ty {
            fn occurred_on(&self) -> Option<NaiveDate> {
                self.$date
            }

            fn created_at(&self) -> Option<DateTime<Utc>> {
                self.created_at
            }
        }

        impl EntityRecord for $ty {
            const KIND: EntityKind = EntityKind::$variant;

            fn tenant_id(&self) -> &TenantId {
                &self.tenant_id
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$variant(row) => Some(row),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Record {
            fn from(row: $ty) -> Self {
                Record::$variant(row)
            }
        }
    };
}

entity_record!(TrainingSession, TrainingSession, completed_on);
entity_record!(NonConformity, NonConformity, detected_on);
entity_record!(SafetyIncident, SafetyIncident, occurred_on);
entity_record!(SocialProject, SocialProject, started_on);
entity_record!(EmissionEntry, EmissionEntry, period_start);
