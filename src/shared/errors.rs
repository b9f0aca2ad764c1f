use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    /// Precondition failures (malformed zone id, empty vehicle set, unknown zone).
    /// Fatal for the current invocation only.
    #[error("Metadata: {0}")]
    Metadata(String),
}

impl DomainError {
    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            // DB errors mapped from repositories contain "Database error:" prefix
            DomainError::Validation(msg) => msg.starts_with("Database error:"),
            _ => false,
        }
    }
}

/// Failure of a call to an external registry or vehicle-details source.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The source answered, but has no record. Treated as "absent".
    #[error("Not found in {0}")]
    NotFound(String),

    /// 5xx, connection reset and the like.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl LookupError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Service(_) | LookupError::Timeout { .. })
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },

    /// Some vehicles of a cache-population batch were not cached.
    #[error("{failed} of {total} vehicles in batch could not be processed")]
    IncompleteBatch { failed: usize, total: usize },
}

impl EngineError {
    /// Whether retrying the whole unit of work (a batch, a single vehicle)
    /// has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Domain(e) => e.is_transient(),
            EngineError::Lookup(e) => e.is_retryable(),
            EngineError::Infra(InfraError::Database(_)) => true,
            EngineError::Infra(_) => false,
            EngineError::Timeout { .. } => true,
            EngineError::IncompleteBatch { .. } => true,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_not_found_is_not_retryable() {
        assert!(!LookupError::NotFound("military".into()).is_retryable());
        assert!(!LookupError::Malformed("bad json".into()).is_retryable());
        assert!(LookupError::Service("503".into()).is_retryable());
    }

    #[test]
    fn database_validation_errors_are_transient() {
        let err = EngineError::from(DomainError::Validation(
            "Database error: connection reset".into(),
        ));
        assert!(err.is_transient());

        let err = EngineError::from(DomainError::Metadata("unknown zone".into()));
        assert!(!err.is_transient());
    }

    #[test]
    fn timeouts_are_transient() {
        let err = EngineError::Timeout {
            operation: "batch".into(),
            after: Duration::from_secs(1),
        };
        assert!(err.is_transient());
    }
}
