//! Error types for the shared build-state model.
//!
//! Construction of validated values (platform tags, artifact coordinates,
//! module identifiers) fails with a [`ModelError`] describing the rejected
//! input.

use thiserror::Error;

/// Errors raised while validating model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The platform tag is not one of the supported runtimes.
    #[error("unknown platform tag '{value}'; expected one of: {expected}")]
    UnknownPlatform {
        /// The rejected input.
        value: String,
        /// Comma-separated list of accepted tags.
        expected: String,
    },

    /// An artifact coordinate is not of the form `group:name:version`.
    #[error("invalid artifact coordinate '{value}': {reason}")]
    InvalidCoordinate {
        /// The rejected input.
        value: String,
        /// Why the coordinate was rejected.
        reason: &'static str,
    },

    /// A module identifier was empty or contained whitespace.
    #[error("invalid module name '{value}'")]
    InvalidModuleId {
        /// The rejected input.
        value: String,
    },
}

/// Result type alias using [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;
