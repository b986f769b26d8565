//! Storage error types.

use std::path::PathBuf;

/// Errors raised while reading stations, lines or departures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row could not be mapped to a domain type
    #[error("invalid row: {0}")]
    InvalidRow(String),

    /// Fixture file could not be read
    #[error("failed to read fixture {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fixture file is not valid JSON
    #[error("invalid fixture: {0}")]
    Fixture(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::InvalidRow("unknown schedule type: holiday".into());
        assert_eq!(err.to_string(), "invalid row: unknown schedule type: holiday");

        let err = StoreError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("missing.json"));
        assert!(err.to_string().contains("gone"));
    }
}
