//! Error types for tree serialization.

use thiserror::Error;

/// Errors that can occur while serializing a tree.
#[derive(Error, Debug)]
pub enum RenderError {
    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown output format name
    #[error("Unknown output format: {0} (expected html, json or text)")]
    UnknownFormat(String),

    /// Unknown text style name
    #[error("Unknown text style: {0} (expected unicode or ascii)")]
    UnknownStyle(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
