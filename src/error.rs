//! Error types for correlation and common attribute search

use std::fmt;
use std::io;

/// Result type alias for correlation operations
pub type CorrelationResult<T> = Result<T, CorrelationError>;

/// Errors that can occur while querying the central repository or the case database
#[derive(Debug)]
pub enum CorrelationError {
    /// I/O error (config or database file access)
    Io(io::Error),
    /// SQLite error from one of the backing stores
    Database(rusqlite::Error),
    /// Serialization error
    Serialization(serde_json::Error),
    /// No correlation case with the given id
    CaseNotFound(i64),
    /// The open case is not registered in the central repository
    CaseNotRegistered(String),
    /// No correlation attribute instance with the given id
    AttributeNotFound(i64),
    /// Inter-case lookup attempted without a central repository
    RepositoryUnavailable,
    /// Invalid configuration value
    Config(String),
    /// Invalid command-line usage
    Usage(String),
}

impl fmt::Display for CorrelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationError::Io(e) => write!(f, "I/O error: {}", e),
            CorrelationError::Database(e) => write!(f, "Database error: {}", e),
            CorrelationError::Serialization(e) => write!(f, "Serialization error: {}", e),
            CorrelationError::CaseNotFound(id) => write!(f, "Cannot locate case: {}", id),
            CorrelationError::CaseNotRegistered(name) => {
                write!(f, "Case is not registered in the central repository: {}", name)
            }
            CorrelationError::AttributeNotFound(id) => {
                write!(f, "Cannot locate correlation attribute instance: {}", id)
            }
            CorrelationError::RepositoryUnavailable => write!(f, "Central repository is not available"),
            CorrelationError::Config(e) => write!(f, "Configuration error: {}", e),
            CorrelationError::Usage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CorrelationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CorrelationError::Io(e) => Some(e),
            CorrelationError::Database(e) => Some(e),
            CorrelationError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CorrelationError {
    fn from(err: io::Error) -> Self {
        CorrelationError::Io(err)
    }
}

impl From<rusqlite::Error> for CorrelationError {
    fn from(err: rusqlite::Error) -> Self {
        CorrelationError::Database(err)
    }
}

impl From<serde_json::Error> for CorrelationError {
    fn from(err: serde_json::Error) -> Self {
        CorrelationError::Serialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        assert_eq!(CorrelationError::CaseNotFound(7).to_string(), "Cannot locate case: 7");
        assert_eq!(
            CorrelationError::Config("bad threshold".into()).to_string(),
            "Configuration error: bad threshold"
        );
    }

    #[test]
    fn test_source_is_preserved() {
        let err: CorrelationError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(CorrelationError::AttributeNotFound(1).source().is_none());
    }
}
