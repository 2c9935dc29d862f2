//! Error types for the persistence layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! I/O and JSON errors with the line of the record that failed.

/// Errors that can occur while reading or writing the persisted record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the record file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The record file exists but has no root line.
    #[error("record has no root line")]
    MissingRoot,

    /// A line could not be turned into a posting.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// One-based line number in the record file.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}
