//! Core error types.

use crate::record::RecordId;
use thiserror::Error;

/// Errors raised while ingesting records or materializing a tree.
#[derive(Debug, Error)]
pub enum ArborError {
    /// Input document is not a JSON array of records
    #[error("Expected a JSON array of records, found {found}")]
    NotAnArray { found: String },

    /// Element at `position` is not a JSON object
    #[error("Record #{position} is not an object")]
    NotAnObject { position: usize },

    /// Element at `position` has no `id` (or `id` is null)
    #[error("Record #{position} has no id")]
    MissingId { position: usize },

    /// `id` is neither an integer nor a string
    #[error("Record #{position} has an invalid id: {found}")]
    InvalidId { position: usize, found: String },

    /// `parent_id` is neither null, an integer nor a string
    #[error("Record #{position} has an invalid parent_id: {found}")]
    InvalidParentId { position: usize, found: String },

    /// Record passed the shape checks but could not be decoded
    #[error("Record #{position} could not be decoded: {message}")]
    InvalidRecord { position: usize, message: String },

    /// Parent chain re-entered a key already on the active path
    #[error("Cycle detected at {key} (path: {})", format_path(.path))]
    Cycle { key: RecordId, path: Vec<RecordId> },

    /// Nesting went deeper than the configured limit
    #[error("Depth limit {limit} exceeded at {key}")]
    DepthExceeded { key: RecordId, limit: usize },

    /// Cycle policy name other than `strict` or `permissive`
    #[error("Unknown cycle policy: {0} (expected strict or permissive)")]
    UnknownCyclePolicy(String),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArborError {
    /// The record key that caused a structural error, if any.
    pub fn offending_key(&self) -> Option<&RecordId> {
        match self {
            ArborError::Cycle { key, .. } | ArborError::DepthExceeded { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Input position of a malformed record, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            ArborError::NotAnObject { position }
            | ArborError::MissingId { position }
            | ArborError::InvalidId { position, .. }
            | ArborError::InvalidParentId { position, .. }
            | ArborError::InvalidRecord { position, .. } => Some(*position),
            _ => None,
        }
    }
}

fn format_path(path: &[RecordId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, ArborError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArborError::MissingId { position: 3 };
        assert!(err.to_string().contains("#3"));
    }

    #[test]
    fn test_cycle_display_includes_path() {
        let err = ArborError::Cycle {
            key: RecordId::from(1),
            path: vec![RecordId::from(1), RecordId::from("b")],
        };
        let msg = err.to_string();
        assert!(msg.contains("1 -> b"), "{msg}");
        assert_eq!(err.offending_key(), Some(&RecordId::from(1)));
        assert_eq!(err.position(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ArborError = io_err.into();
        assert!(matches!(err, ArborError::Io(_)));
    }
}
