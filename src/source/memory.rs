//! In-memory row source for fixtures and tests

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{RowFilter, RowSource, SourceResult};
use crate::records::{EntityKind, Record, TenantId};

/// Rows partitioned by tenant, kept in insertion order
///
/// Filters are not pushed down; every row of the requested kind is returned.
#[derive(Default)]
pub struct MemoryRowSource {
    rows: RwLock<HashMap<TenantId, Vec<Record>>>,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source pre-loaded with `records`
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut rows: HashMap<TenantId, Vec<Record>> = HashMap::new();
        for record in records {
            rows.entry(record.tenant_id().clone())
                .or_default()
                .push(record);
        }
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub async fn insert(&self, record: impl Into<Record>) {
        let record = record.into();
        let mut rows = self.rows.write().await;
        rows.entry(record.tenant_id().clone())
            .or_default()
            .push(record);
    }

    /// Number of rows stored across all tenants
    pub async fn len(&self) -> usize {
        self.rows.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn fetch_rows(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        _filter: &RowFilter,
    ) -> SourceResult<Vec<Record>> {
        let rows = self.rows.read().await;
        let matching: Vec<Record> = rows
            .get(tenant)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.kind() == kind)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            "Memory source returned {} {} rows for tenant {}",
            matching.len(),
            kind,
            tenant
        );

        Ok(matching)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
