//! Error types for artifact assembly and packaging.

use camino::Utf8PathBuf;
use thiserror::Error;
use trellis_common::ModuleId;

/// Errors raised while merging a module's outputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// A selected compilation failed, so the module cannot be assembled.
    #[error("cannot assemble {module}: compilation of target {target} failed: {reason}")]
    UpstreamCompilationFailed {
        /// Module being assembled.
        module: ModuleId,
        /// Failed target.
        target: String,
        /// Compiler-provided failure.
        reason: String,
    },
}

/// Errors arising while writing a merged artifact.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// An I/O operation failed (reading entry data, writing the archive).
    #[error("I/O error during packaging: {0}")]
    Io(#[from] std::io::Error),

    /// The zip writer or reader failed.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry refers to a member missing from its source archive.
    #[error("{archive} has no member {member}")]
    MissingMember {
        /// Source archive.
        archive: Utf8PathBuf,
        /// Requested member.
        member: String,
    },

    /// The finished archive could not be moved into place.
    #[error("failed to persist {path}: {source}")]
    Persist {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}
