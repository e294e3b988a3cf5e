//! Testing utilities and fixtures
//!
//! Row sources that misbehave on purpose, plus terse record builders used by
//! unit tests, integration tests and benchmarks.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::records::{
    EntityKind, Measure, NonConformity, Record, SafetyIncident, SocialProject, TenantId,
    TrainingSession,
};
use crate::source::{RowFilter, RowSource, SourceError, SourceResult};

/// Row source that always fails
pub struct FailingRowSource {
    message: String,
}

impl FailingRowSource {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl RowSource for FailingRowSource {
    async fn fetch_rows(
        &self,
        _tenant: &TenantId,
        _kind: EntityKind,
        _filter: &RowFilter,
    ) -> SourceResult<Vec<Record>> {
        Err(SourceError::Unavailable(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Row source that returns the same rows for every request, whatever the
/// tenant or entity type, and records what it was asked for
pub struct StaticRowSource {
    rows: Vec<Record>,
    /// Track requests for verification
    pub requests: Arc<Mutex<Vec<(TenantId, EntityKind, RowFilter)>>>,
}

impl StaticRowSource {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn get_requests(&self) -> Vec<(TenantId, EntityKind, RowFilter)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl RowSource for StaticRowSource {
    async fn fetch_rows(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        filter: &RowFilter,
    ) -> SourceResult<Vec<Record>> {
        self.requests
            .lock()
            .await
            .push((tenant.clone(), kind, filter.clone()));
        Ok(self.rows.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

pub fn training_session(tenant: &str, employee: &str, department: &str, hours: f64) -> TrainingSession {
    TrainingSession {
        tenant_id: TenantId::new(tenant),
        employee_id: Some(employee.to_string()),
        employee_name: Some(format!("Employee {}", employee)),
        department: Some(department.to_string()),
        status: Some("Concluído".to_string()),
        hours: Measure::Value(hours),
        ..Default::default()
    }
}

pub fn safety_incident(tenant: &str, severity: &str, days_lost: f64) -> SafetyIncident {
    SafetyIncident {
        tenant_id: TenantId::new(tenant),
        severity: Some(severity.to_string()),
        days_lost: Measure::Value(days_lost),
        ..Default::default()
    }
}

pub fn social_project(tenant: &str, category: &str, investment: f64, budget: f64) -> SocialProject {
    SocialProject {
        tenant_id: TenantId::new(tenant),
        name: Some(format!("{} project", category)),
        category: Some(category.to_string()),
        status: Some("Ativo".to_string()),
        investment: Measure::Value(investment),
        budget: Measure::Value(budget),
        ..Default::default()
    }
}

pub fn non_conformity(tenant: &str, department: &str, severity: &str) -> NonConformity {
    NonConformity {
        tenant_id: TenantId::new(tenant),
        department: Some(department.to_string()),
        severity: Some(severity.to_string()),
        status: Some("Aberta".to_string()),
        ..Default::default()
    }
}
