use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum DictyError {
    #[error("malformed mutant record (expected at least 4 tab-separated fields): {0:?}")]
    MalformedRecord(String),

    #[error("source {source_name} unavailable: {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    #[error("unknown mutant id: {0}")]
    UnknownMutant(String),

    #[error("snapshot schema version {found} is not supported (expected {expected})")]
    SnapshotVersionMismatch { found: u32, expected: u32 },

    #[error("failed to decode snapshot: {0}")]
    SnapshotDecode(String),

    #[error("failed to encode snapshot: {0}")]
    SnapshotEncode(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
