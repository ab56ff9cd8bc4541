//! Error handling for EventLogistics
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for EventLogistics
#[derive(Error, Debug)]
pub enum LogisticsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Flight inventory error: {0}")]
    FlightInventory(#[from] FlightInventoryError),

    #[error("Guest roster unavailable: {0}")]
    Roster(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Publication blocked: {}", describe_blockers(.blockers))]
    PublicationBlocked {
        missing_groups: Vec<String>,
        blockers: Vec<PublishBlocker>,
    },

    #[error("Flight options are not published yet for event {event_id}")]
    NotPublished { event_id: Uuid },

    #[error("Synchronization for event {event_id} was superseded by a newer request")]
    Superseded { event_id: Uuid },

    #[error("Configuration for event {event_id} changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict { event_id: Uuid, expected: i64, actual: i64 },

    #[error("Timed out waiting for the configuration lock of event {event_id}")]
    LockTimeout { event_id: Uuid },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Flight inventory API specific errors
#[derive(Error, Debug)]
pub enum FlightInventoryError {
    #[error("Flight search request failed: {0}")]
    RequestFailed(String),

    #[error("Flight search timed out")]
    Timeout,

    #[error("Invalid flight search response: {0}")]
    InvalidResponse(String),

    #[error("Flight inventory service unavailable")]
    ServiceUnavailable,

    #[error("Flight search rate limit exceeded")]
    RateLimited,
}

/// A single condition preventing publication
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishBlocker {
    /// The event has no location groups at all
    NoGroups,
    /// The event's own airport code is missing or not a valid IATA code
    DestinationInvalid { raw: Option<String> },
    /// The group's origin code could not be validated
    OriginInvalid { group: String, raw: Option<String> },
    /// A required journey has no selected flights
    MissingSelection { group: String, journey: crate::models::JourneyType },
}

impl std::fmt::Display for PublishBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishBlocker::NoGroups => write!(f, "no guests have a departure location, so there are no groups to configure"),
            PublishBlocker::DestinationInvalid { raw } => match raw {
                Some(raw) => write!(f, "event airport code '{}' is not a valid 3-letter code", raw),
                None => write!(f, "event airport code is not set"),
            },
            PublishBlocker::OriginInvalid { group, raw } => match raw {
                Some(raw) => write!(f, "group '{}' has unverified origin code '{}'", group, raw),
                None => write!(f, "group '{}' has no origin code", group),
            },
            PublishBlocker::MissingSelection { group, journey } => {
                write!(f, "group '{}' has no {} flights selected", group, journey)
            }
        }
    }
}

fn describe_blockers(blockers: &[PublishBlocker]) -> String {
    blockers
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for EventLogistics operations
pub type Result<T> = std::result::Result<T, LogisticsError>;

/// Result type alias for flight inventory operations
pub type FlightInventoryResult<T> = std::result::Result<T, FlightInventoryError>;

/// Coarse classification matching what a caller has to do about an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fix the input and try again
    Validation,
    /// The referenced thing no longer exists
    NotFound,
    /// Something else has to be completed first
    PreconditionNotMet,
    /// A collaborator failed; retrying is safe
    Upstream,
    /// Lost a race with another writer; reload and retry
    Conflict,
    Internal,
}

impl LogisticsError {
    /// Shorthand for a field-level validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LogisticsError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a not-found error
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        LogisticsError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Check if the error is recoverable (safe to retry unchanged)
    pub fn is_recoverable(&self) -> bool {
        match self {
            LogisticsError::Database(_) => false,
            LogisticsError::Migration(_) => false,
            LogisticsError::FlightInventory(_) => true,
            LogisticsError::Roster(_) => true,
            LogisticsError::Config(_) => false,
            LogisticsError::Validation { .. } => false,
            LogisticsError::NotFound { .. } => false,
            LogisticsError::PublicationBlocked { .. } => false,
            LogisticsError::NotPublished { .. } => false,
            LogisticsError::Superseded { .. } => false,
            LogisticsError::VersionConflict { .. } => true,
            LogisticsError::LockTimeout { .. } => true,
            LogisticsError::Redis(_) => true,
            LogisticsError::Http(_) => true,
            LogisticsError::Serialization(_) => false,
            LogisticsError::Io(_) => true,
            LogisticsError::UrlParse(_) => false,
        }
    }

    /// Classify the error for callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogisticsError::Validation { .. } => ErrorKind::Validation,
            LogisticsError::NotFound { .. } => ErrorKind::NotFound,
            LogisticsError::PublicationBlocked { .. } | LogisticsError::NotPublished { .. } => {
                ErrorKind::PreconditionNotMet
            }
            LogisticsError::FlightInventory(_)
            | LogisticsError::Roster(_)
            | LogisticsError::Redis(_)
            | LogisticsError::Http(_) => ErrorKind::Upstream,
            LogisticsError::VersionConflict { .. }
            | LogisticsError::LockTimeout { .. }
            | LogisticsError::Superseded { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Internal,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LogisticsError::Database(_) => ErrorSeverity::Critical,
            LogisticsError::Migration(_) => ErrorSeverity::Critical,
            LogisticsError::Config(_) => ErrorSeverity::Critical,
            LogisticsError::Validation { .. } => ErrorSeverity::Info,
            LogisticsError::NotFound { .. } => ErrorSeverity::Info,
            LogisticsError::PublicationBlocked { .. } => ErrorSeverity::Info,
            LogisticsError::NotPublished { .. } => ErrorSeverity::Info,
            LogisticsError::Superseded { .. } => ErrorSeverity::Info,
            LogisticsError::VersionConflict { .. } => ErrorSeverity::Warning,
            LogisticsError::LockTimeout { .. } => ErrorSeverity::Warning,
            LogisticsError::FlightInventory(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JourneyType;

    #[test]
    fn test_upstream_errors_are_retryable() {
        let err = LogisticsError::from(FlightInventoryError::Timeout);
        assert!(err.is_recoverable());
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_validation_errors_are_not_retryable() {
        let err = LogisticsError::validation("origin", "must be three uppercase letters");
        assert!(!err.is_recoverable());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Invalid origin: must be three uppercase letters");
    }

    #[test]
    fn test_publication_blocked_message_lists_blockers() {
        let err = LogisticsError::PublicationBlocked {
            missing_groups: vec!["Delhi (DEL)".to_string()],
            blockers: vec![PublishBlocker::MissingSelection {
                group: "Delhi (DEL)".to_string(),
                journey: JourneyType::Arrival,
            }],
        };
        assert_eq!(err.kind(), ErrorKind::PreconditionNotMet);
        assert!(err.to_string().contains("group 'Delhi (DEL)' has no arrival flights selected"));
    }
}
