//! Error types for aspect registration and application.

use thiserror::Error;
use trellis_common::ModuleId;

/// Errors raised by aspects and the aspect registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AspectError {
    /// The capability an aspect relies on is not available on the module.
    #[error("aspect {aspect} needs {capability}, which module {module} does not provide")]
    CapabilityUnavailable {
        /// Name of the failing aspect.
        aspect: &'static str,
        /// Module the aspect was applied to.
        module: ModuleId,
        /// Missing plugin or capability.
        capability: &'static str,
    },

    /// An aspect refused to configure a module.
    #[error("aspect {aspect} failed for module {module}: {reason}")]
    Rejected {
        /// Name of the failing aspect.
        aspect: &'static str,
        /// Module the aspect was applied to.
        module: ModuleId,
        /// Why the aspect failed.
        reason: String,
    },

    /// Two aspects with the same name were registered.
    #[error("aspect {name} is already registered")]
    DuplicateAspect {
        /// The duplicated name.
        name: String,
    },

    /// Configuration referred to an aspect that is not registered.
    #[error("unknown aspect {name}; registered aspects: {registered}")]
    UnknownAspect {
        /// The unknown name.
        name: String,
        /// Comma-separated registered names.
        registered: String,
    },

    /// An aspect setting is malformed.
    #[error("invalid {setting} setting: {reason}")]
    InvalidSetting {
        /// Name of the setting.
        setting: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl AspectError {
    /// Name of the module the error concerns, if any.
    #[must_use]
    pub fn module(&self) -> Option<&ModuleId> {
        match self {
            Self::CapabilityUnavailable { module, .. } | Self::Rejected { module, .. } => {
                Some(module)
            }
            Self::DuplicateAspect { .. }
            | Self::UnknownAspect { .. }
            | Self::InvalidSetting { .. } => None,
        }
    }
}

/// Result type alias using [`AspectError`].
pub type Result<T> = std::result::Result<T, AspectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_unavailable_names_module_and_capability() {
        let err = AspectError::CapabilityUnavailable {
            aspect: "unit-coercion",
            module: ModuleId::new("core").expect("valid id"),
            capability: "blocking-bridge",
        };
        let msg = err.to_string();
        assert!(msg.contains("core"));
        assert!(msg.contains("blocking-bridge"));
        assert_eq!(err.module().map(ModuleId::as_str), Some("core"));
    }

    #[test]
    fn registry_errors_have_no_module() {
        let err = AspectError::DuplicateAspect {
            name: "encoding".to_owned(),
        };
        assert!(err.module().is_none());
    }
}
