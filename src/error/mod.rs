use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

use crate::source::SourceError;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for the analytics layer
#[derive(Error, Debug)]
pub enum EsgError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Row source error: {message}")]
    Source {
        code: u16,
        message: String,
        tenant: Option<String>,
        entity: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Tenant isolation violated: expected '{expected}', found '{found}'")]
    TenantIsolation {
        code: u16,
        expected: String,
        found: String,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl EsgError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a configuration error with specific code and file path
    pub fn config_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a row source error with default code
    pub fn row_source(message: impl Into<String>) -> Self {
        Self::Source {
            code: ErrorCode::SOURCE_GENERIC,
            message: message.into(),
            tenant: None,
            entity: None,
            source: None,
        }
    }

    /// Create a row source error scoped to a tenant and entity type
    pub fn source_with_code(
        code: u16,
        message: impl Into<String>,
        tenant: Option<String>,
        entity: Option<String>,
    ) -> Self {
        Self::Source {
            code,
            message: message.into(),
            tenant,
            entity,
            source: None,
        }
    }

    /// Create a tenant isolation error
    pub fn tenant_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TenantIsolation {
            code: ErrorCode::TENANT_MISMATCH,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a validation error with specific code and field
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Source { source: src, .. }
            | Self::Validation { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::TenantIsolation { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Source { message, .. }
            | Self::Validation { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
            Self::TenantIsolation { .. } => {}
        }
        self
    }

    /// Attach the tenant and entity type a row source error was raised for
    pub fn with_scope(mut self, tenant_id: impl Into<String>, entity_kind: impl Into<String>) -> Self {
        if let Self::Source { tenant, entity, .. } = &mut self {
            *tenant = Some(tenant_id.into());
            *entity = Some(entity_kind.into());
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Source { .. } => 3,
            Self::TenantIsolation { .. } => 4,
            Self::Validation { .. } => 8,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Source { code, .. }
            | Self::TenantIsolation { code, .. }
            | Self::Validation { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, path, .. } => match path {
                Some(p) => format!("Configuration problem in {}: {}", p.display(), message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Source {
                message,
                tenant,
                entity,
                ..
            } => {
                let mut msg = String::from("Could not read rows");
                if let Some(entity) = entity {
                    msg.push_str(&format!(" of '{}'", entity));
                }
                if let Some(tenant) = tenant {
                    msg.push_str(&format!(" for tenant '{}'", tenant));
                }
                format!("{}: {}", msg, message)
            }
            Self::TenantIsolation {
                expected, found, ..
            } => format!(
                "Refusing to aggregate: a row of tenant '{}' was returned for tenant '{}'",
                found, expected
            ),
            Self::Validation { message, field, .. } => match field {
                Some(f) => format!("Validation error for '{}': {}", f, message),
                None => format!("Validation error: {}", message),
            },
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut msg = format!("{} ({})", self, describe_error_code(self.code()));
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            msg.push_str(&format!("\n  caused by: {}", cause));
            current = std::error::Error::source(cause);
        }
        msg
    }
}

/// Type alias for Results using EsgError
pub type Result<T> = std::result::Result<T, EsgError>;

impl From<SourceError> for EsgError {
    fn from(err: SourceError) -> Self {
        let code = match &err {
            SourceError::Unavailable(_) => ErrorCode::SOURCE_UNAVAILABLE,
            SourceError::Query { .. } => ErrorCode::SOURCE_QUERY_FAILED,
            SourceError::Decode(_) | SourceError::Json(_) => ErrorCode::SOURCE_DECODE_FAILED,
            SourceError::Io(_) => ErrorCode::SOURCE_IO_ERROR,
        };
        let message = err.to_string();
        EsgError::source_with_code(code, message, None, None).with_source(err)
    }
}

impl From<toml::de::Error> for EsgError {
    fn from(err: toml::de::Error) -> Self {
        EsgError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax", None)
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation_and_chaining() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "rows.json");
        let err = EsgError::row_source("Cannot read rows")
            .with_source(io_err)
            .with_context("while building training report");

        assert_eq!(err.code(), ErrorCode::SOURCE_GENERIC);
        assert!(err.to_string().contains("[E2000]"));
        assert!(err.user_message().contains("Cannot read rows"));
        assert!(err.developer_message().contains("caused by: rows.json"));
    }

    #[test]
    fn test_error_codes_and_exit_codes() {
        let err = EsgError::config_with_code(ErrorCode::CONFIG_NOT_FOUND, "missing", None);
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert_eq!(err.exit_code(), 2);

        let err = EsgError::tenant_mismatch("acme", "globex");
        assert_eq!(err.code(), ErrorCode::TENANT_MISMATCH);
        assert_eq!(err.exit_code(), 4);
        assert!(err.user_message().contains("globex"));
    }

    #[test]
    fn test_source_error_conversion_keeps_cause() {
        let err: EsgError = SourceError::Unavailable("connection refused".to_string()).into();
        assert_eq!(err.code(), ErrorCode::SOURCE_UNAVAILABLE);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_user_message_includes_scope() {
        let err = EsgError::source_with_code(
            ErrorCode::SOURCE_QUERY_FAILED,
            "timeout",
            Some("acme".to_string()),
            Some("training_session".to_string()),
        );
        assert_eq!(
            err.user_message(),
            "Could not read rows of 'training_session' for tenant 'acme': timeout"
        );
    }
}
