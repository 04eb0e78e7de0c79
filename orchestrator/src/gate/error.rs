//! Error types for the API surface gate and documentation policy.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while building gate policy or reading snapshots.
#[derive(Debug, Error)]
pub enum GateError {
    /// A package exclusion pattern is not a valid glob.
    #[error("invalid package pattern '{pattern}': {source}")]
    InvalidPackagePattern {
        /// The rejected pattern.
        pattern: String,
        /// Parser failure.
        #[source]
        source: glob::PatternError,
    },

    /// A documentation package rule is not a valid regular expression.
    #[error("invalid documentation pattern '{pattern}': {source}")]
    InvalidDocsPattern {
        /// The rejected pattern.
        pattern: String,
        /// Parser failure.
        #[source]
        source: Box<regex::Error>,
    },

    /// A snapshot file could not be read or written.
    #[error("snapshot I/O failed for {path}: {source}")]
    SnapshotIo {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A snapshot file is not valid JSON for a snapshot.
    #[error("malformed snapshot {path}: {source}")]
    SnapshotFormat {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
}
