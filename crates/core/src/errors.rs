//! Error types for promptdeck
//!
//! Store failures are logged where they occur and re-raised as
//! [`PromptError::Store`]; migration failures are folded into
//! [`PromptError::Migration`] with a fixed user-facing message.

use thiserror::Error;

/// Result type alias for promptdeck operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Failure reported by a record store backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The store refused the operation (validation, constraint, bad request)
    #[error("rejected by store: {0}")]
    Rejected(String),

    /// No record with the given id
    #[error("no prompt with id '{0}'")]
    NotFound(String),

    /// The store could not be reached or failed internally
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store accepted a write but returned no record
    #[error("no record returned after {0}")]
    NoRecord(&'static str),
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => BackendError::NoRecord("query"),
            sqlx::Error::Database(db) => BackendError::Rejected(db.to_string()),
            other => BackendError::Unavailable(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Rejected(err.to_string())
        } else {
            BackendError::Unavailable(err.to_string())
        }
    }
}

/// Main error type for promptdeck
#[derive(Debug, Error)]
pub enum PromptError {
    /// Any failure from the record store boundary
    #[error("Store error: {0}")]
    Store(#[from] BackendError),

    /// Legacy collection migration failed
    #[error("{message}")]
    Migration {
        message: String,
        #[source]
        cause:   Option<Box<PromptError>>,
    },

    /// Legacy collection could not be decoded
    #[error("Failed to decode legacy prompts: {0}")]
    Decode(String),

    /// Input rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Command not found in registry
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid command arguments
    #[error("Invalid arguments for command '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error (catch-all)
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for PromptError {
    fn from(err: anyhow::Error) -> Self {
        PromptError::Other(err.to_string())
    }
}

impl From<String> for PromptError {
    fn from(err: String) -> Self {
        PromptError::Other(err)
    }
}

impl From<&str> for PromptError {
    fn from(err: &str) -> Self {
        PromptError::Other(err.to_string())
    }
}

impl PromptError {
    /// Migration failure carrying its underlying cause
    pub fn migration(message: impl Into<String>, cause: Option<PromptError>) -> Self {
        PromptError::Migration {
            message: message.into(),
            cause:   cause.map(Box::new),
        }
    }

    /// Get user-friendly error message
    ///
    /// Migration failures show only their fixed message; the cause is
    /// logged, never shown.
    pub fn user_message(&self) -> String {
        match self {
            PromptError::Store(BackendError::NotFound(id)) => {
                format!("Prompt '{}' no longer exists.", id)
            },
            PromptError::Store(_) => "The prompt store could not complete the request.".to_string(),
            PromptError::Migration { message, .. } => message.clone(),
            PromptError::CommandNotFound(cmd) => {
                format!("Command '{}' not found.", cmd)
            },
            PromptError::InvalidArgs { command, reason } => {
                format!("Invalid arguments for '{}': {}", command, reason)
            },
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            PromptError::Store(BackendError::NotFound(_)) => "not_found",
            PromptError::Store(_) => "store",
            PromptError::Migration { .. } => "migration",
            PromptError::Decode(_) => "decode",
            PromptError::Validation(_) => "validation",
            PromptError::Config(_) => "config",
            PromptError::CommandNotFound(_) => "command",
            PromptError::InvalidArgs { .. } => "arguments",
            PromptError::Serde(_) => "serialization",
            PromptError::Io(_) => "io",
            PromptError::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PromptError::CommandNotFound("test.command".to_string());
        assert_eq!(err.to_string(), "Command not found: test.command");
    }

    #[test]
    fn test_migration_hides_cause_from_user() {
        let cause = PromptError::Store(BackendError::Unavailable("socket closed".into()));
        let err = PromptError::migration("Failed to migrate prompts. Please try again.", Some(cause));

        assert_eq!(err.user_message(), "Failed to migrate prompts. Please try again.");
        assert!(!err.user_message().contains("socket"));

        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert!(source.unwrap().contains("socket closed"));
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            PromptError::Store(BackendError::NotFound("x".into())).category(),
            "not_found"
        );
        assert_eq!(
            PromptError::Store(BackendError::NoRecord("insert")).category(),
            "store"
        );
        assert_eq!(
            PromptError::InvalidArgs {
                command: "test".to_string(),
                reason:  "bad".to_string(),
            }
            .category(),
            "arguments"
        );
    }

    #[test]
    fn test_from_string() {
        let err: PromptError = "test error".into();
        assert_eq!(err.to_string(), "test error");
    }
}
