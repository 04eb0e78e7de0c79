//! Values the built-in aspects write into module build state.

use crate::error::{AspectError, Result};

/// Runtime target version used when none is configured.
pub const DEFAULT_RUNTIME_TARGET: &str = "1.8";

/// Source encoding used when none is configured.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Compiler flags added to every target when none are configured.
pub const DEFAULT_COMPILER_FLAGS: &[&str] = &["-progressive", "-Xjvm-default=all", "-Xinline-classes"];

/// Opt-in annotations added to every source set when none are configured.
pub const DEFAULT_OPT_INS: &[&str] = &[
    "kotlin.RequiresOptIn",
    "kotlin.contracts.ExperimentalContracts",
    "kotlin.experimental.ExperimentalTypeInference",
    "kotlin.ExperimentalUnsignedTypes",
    "kotlin.time.ExperimentalTime",
];

/// Validated settings shared by the built-in aspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectSettings {
    runtime_target: String,
    encoding: String,
    compiler_flags: Vec<String>,
    opt_ins: Vec<String>,
}

impl AspectSettings {
    /// Validate and build aspect settings.
    ///
    /// The runtime target must be a dotted version number (`1.8`, `11`), the
    /// encoding a non-empty label without whitespace, every compiler flag must
    /// start with `-`, and opt-in annotations must be non-empty qualified names.
    ///
    /// # Errors
    ///
    /// Returns [`AspectError::InvalidSetting`] for the first offending value.
    pub fn new(
        runtime_target: impl Into<String>,
        encoding: impl Into<String>,
        compiler_flags: Vec<String>,
        opt_ins: Vec<String>,
    ) -> Result<Self> {
        let runtime_target = runtime_target.into();
        let encoding = encoding.into();

        if !is_dotted_version(&runtime_target) {
            return Err(AspectError::InvalidSetting {
                setting: "runtime target",
                reason: format!("'{runtime_target}' is not a dotted version number"),
            });
        }
        if encoding.is_empty() || encoding.chars().any(char::is_whitespace) {
            return Err(AspectError::InvalidSetting {
                setting: "encoding",
                reason: format!("'{encoding}' is not a charset label"),
            });
        }
        if let Some(flag) = compiler_flags.iter().find(|flag| !flag.starts_with('-')) {
            return Err(AspectError::InvalidSetting {
                setting: "compiler flag",
                reason: format!("'{flag}' must start with '-'"),
            });
        }
        if let Some(opt_in) = opt_ins
            .iter()
            .find(|name| name.is_empty() || name.chars().any(char::is_whitespace))
        {
            return Err(AspectError::InvalidSetting {
                setting: "opt-in",
                reason: format!("'{opt_in}' is not a qualified annotation name"),
            });
        }

        Ok(Self {
            runtime_target,
            encoding,
            compiler_flags: dedup_preserving_order(compiler_flags),
            opt_ins: dedup_preserving_order(opt_ins),
        })
    }

    /// Runtime target version for JVM-family compilations.
    #[must_use]
    pub fn runtime_target(&self) -> &str {
        &self.runtime_target
    }

    /// Source file encoding.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Compiler flags, deduplicated in first-seen order.
    #[must_use]
    pub fn compiler_flags(&self) -> &[String] {
        &self.compiler_flags
    }

    /// Opt-in annotations, deduplicated in first-seen order.
    #[must_use]
    pub fn opt_ins(&self) -> &[String] {
        &self.opt_ins
    }
}

impl Default for AspectSettings {
    fn default() -> Self {
        Self {
            runtime_target: DEFAULT_RUNTIME_TARGET.to_owned(),
            encoding: DEFAULT_ENCODING.to_owned(),
            compiler_flags: DEFAULT_COMPILER_FLAGS.iter().map(|&f| f.to_owned()).collect(),
            opt_ins: DEFAULT_OPT_INS.iter().map(|&o| o.to_owned()).collect(),
        }
    }
}

fn is_dotted_version(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
