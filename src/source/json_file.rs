//! Row source backed by a JSON export
//!
//! The file holds either a bare array of tagged records or an object with a
//! `records` array. It is re-read on every fetch so an export can be replaced
//! between requests. Only the rows of the requested tenant and entity type
//! are decoded.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::{RowFilter, RowSource, SourceError, SourceResult};
use crate::records::{EntityKind, Record, TenantId};

pub struct JsonFileRowSource {
    path: PathBuf,
}

impl JsonFileRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_rows(&self) -> SourceResult<Vec<serde_json::Value>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let document: serde_json::Value = serde_json::from_str(&content)?;

        let rows = match document {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("records") {
                Some(serde_json::Value::Array(items)) => items,
                _ => {
                    return Err(SourceError::Decode(format!(
                        "{} has no top-level \"records\" array",
                        self.path.display()
                    )))
                }
            },
            _ => {
                return Err(SourceError::Decode(format!(
                    "{} must contain an array of records",
                    self.path.display()
                )))
            }
        };

        trace!("Read {} raw rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    /// Decode one raw row if it belongs to `tenant` and `kind`
    ///
    /// Rows of other tenants or types are skipped before decoding, so a bad
    /// row only fails the requests it would have been part of.
    fn decode_row(
        &self,
        index: usize,
        row: serde_json::Value,
        tenant: &TenantId,
        kind: EntityKind,
    ) -> SourceResult<Option<Record>> {
        let tag = |field: &str| row.get(field).and_then(serde_json::Value::as_str);
        match (tag("tenant_id"), tag("entity")) {
            (Some(t), Some(e)) if t == tenant.as_str() && e == kind.as_str() => {}
            (Some(_), Some(_)) => return Ok(None),
            _ => {
                warn!(
                    "Skipping row {} of {}: no tenant_id or entity tag",
                    index,
                    self.path.display()
                );
                return Ok(None);
            }
        }

        serde_json::from_value(row).map(Some).map_err(|e| {
            SourceError::Decode(format!("{} row {}: {}", self.path.display(), index, e))
        })
    }
}

#[async_trait]
impl RowSource for JsonFileRowSource {
    async fn fetch_rows(
        &self,
        tenant: &TenantId,
        kind: EntityKind,
        _filter: &RowFilter,
    ) -> SourceResult<Vec<Record>> {
        let rows = self.read_rows().await?;
        let mut matching = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            if let Some(record) = self.decode_row(index, row, tenant, kind)? {
                matching.push(record);
            }
        }

        debug!(
            "Read {} {} rows for tenant {} from {}",
            matching.len(),
            kind,
            tenant,
            self.path.display()
        );

        Ok(matching)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_bare_array() {
        let file = write_fixture(
            r#"[
                {"entity": "safety_incident", "tenant_id": "acme", "severity": "Alta"},
                {"entity": "safety_incident", "tenant_id": "globex", "severity": "Baixa"},
                {"entity": "training_session", "tenant_id": "acme", "hours": 4}
            ]"#,
        );
        let source = JsonFileRowSource::new(file.path());

        let rows = source
            .fetch_rows(&TenantId::new("acme"), EntityKind::SafetyIncident, &RowFilter::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind(), EntityKind::SafetyIncident);
    }

    #[tokio::test]
    async fn test_reads_wrapped_records() {
        let file = write_fixture(
            r#"{"records": [{"entity": "social_project", "tenant_id": "acme", "investment": 150}]}"#,
        );
        let source = JsonFileRowSource::new(file.path());

        let rows = source
            .fetch_rows(&TenantId::new("acme"), EntityKind::SocialProject, &RowFilter::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let source = JsonFileRowSource::new("/nonexistent/rows.json");
        let err = source
            .fetch_rows(&TenantId::new("acme"), EntityKind::SocialProject, &RowFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[tokio::test]
    async fn test_bad_record_is_a_decode_error() {
        let file = write_fixture(
            r#"[{"entity": "training_session", "tenant_id": "acme", "completed_on": "yesterday"}]"#,
        );
        let source = JsonFileRowSource::new(file.path());
        let err = source
            .fetch_rows(&TenantId::new("acme"), EntityKind::TrainingSession, &RowFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_bad_row_of_another_tenant_is_not_decoded() {
        let file = write_fixture(
            r#"[
                {"entity": "training_session", "tenant_id": "globex", "completed_on": "yesterday"},
                {"entity": "training_session", "tenant_id": "acme", "hours": 3},
                {"entity": "invoice", "tenant_id": "acme"},
                {"hours": 9}
            ]"#,
        );
        let source = JsonFileRowSource::new(file.path());

        let rows = source
            .fetch_rows(&TenantId::new("acme"), EntityKind::TrainingSession, &RowFilter::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let err = source
            .fetch_rows(&TenantId::new("globex"), EntityKind::TrainingSession, &RowFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
        assert!(err.to_string().contains("row 0"));
    }

    #[tokio::test]
    async fn test_object_without_records_is_rejected() {
        let file = write_fixture(r#"{"rows": []}"#);
        let source = JsonFileRowSource::new(file.path());
        let err = source
            .fetch_rows(&TenantId::new("acme"), EntityKind::TrainingSession, &RowFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
