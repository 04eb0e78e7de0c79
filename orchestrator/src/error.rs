//! Error types for the Trellis orchestrator.
//!
//! Component errors keep their own types ([`AssemblyError`],
//! [`PackagingError`], [`GateError`], [`TaskGraphError`]) and convert into
//! [`OrchestratorError`] at the pipeline boundary so the CLI can report every
//! failure uniformly.

use crate::assembly::{AssemblyError, PackagingError};
use crate::gate::GateError;
use crate::tasks::TaskGraphError;
use camino::Utf8PathBuf;
use thiserror::Error;
use trellis::ConfigError;
use trellis_aspects::AspectError;
use trellis_common::ModuleId;

/// Errors that can occur while orchestrating a build pass.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Project configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required aspect failed, aborting the configuration pass.
    #[error("configuration pass failed: {0}")]
    Aspect(#[from] AspectError),

    /// A declared module never signalled that it finished configuring itself.
    #[error("module {module} was declared but never signalled ready")]
    ModuleNotReady {
        /// The silent module.
        module: ModuleId,
    },

    /// A module signalled ready more than once.
    #[error("module {module} signalled ready more than once")]
    DuplicateReady {
        /// The repeated module.
        module: ModuleId,
    },

    /// A module signalled ready without being declared.
    #[error("module {module} signalled ready but was never declared")]
    UndeclaredModule {
        /// The unexpected module.
        module: ModuleId,
    },

    /// A module signalled ready after collection finished.
    #[error("module {module} signalled ready after collection finished")]
    CollectorClosed {
        /// The late module.
        module: ModuleId,
    },

    /// The same module name was declared twice.
    #[error("module {module} is declared more than once")]
    DuplicateModule {
        /// The repeated module.
        module: ModuleId,
    },

    /// Module descriptors could not be read or parsed.
    #[error("failed to load module descriptors from {path}: {reason}")]
    Descriptors {
        /// Descriptor file or referenced input.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A merged artifact could not be assembled.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// A merged artifact could not be written.
    #[error(transparent)]
    Packaging(#[from] PackagingError),

    /// The task graph is malformed.
    #[error(transparent)]
    TaskGraph(#[from] TaskGraphError),

    /// The API gate could not run.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// One or more build tasks failed.
    #[error("build failed: {failed} task(s) failed, {skipped} skipped")]
    BuildFailed {
        /// Number of failed tasks.
        failed: usize,
        /// Number of tasks skipped because an upstream task failed.
        skipped: usize,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying write failure.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`OrchestratorError`].
pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str) -> ModuleId {
        ModuleId::new(name).expect("valid id")
    }

    #[test]
    fn module_not_ready_names_the_module() {
        let err = OrchestratorError::ModuleNotReady {
            module: module("console"),
        };
        assert!(err.to_string().contains("console"));
    }

    #[test]
    fn aspect_failures_keep_their_message() {
        let err = OrchestratorError::from(AspectError::DuplicateAspect {
            name: "encoding".to_owned(),
        });
        let msg = err.to_string();
        assert!(msg.starts_with("configuration pass failed"));
        assert!(msg.contains("encoding"));
    }

    #[test]
    fn build_failed_counts_tasks() {
        let err = OrchestratorError::BuildFailed {
            failed: 1,
            skipped: 2,
        };
        assert_eq!(err.to_string(), "build failed: 1 task(s) failed, 2 skipped");
    }

    #[test]
    fn write_failed_preserves_source() {
        let err = OrchestratorError::WriteFailed {
            source: std::io::Error::other("broken pipe"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
