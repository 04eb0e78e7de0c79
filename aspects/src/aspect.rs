//! The aspect abstraction and the records produced when applying one.

use crate::error::Result;
use trellis_common::Module;

/// A named configuration mutation applied uniformly to every module.
///
/// Implementations must be idempotent: applying an aspect to its own output
/// yields the same module. An aspect whose precondition does not hold for a
/// module reports so through [`Aspect::is_applicable`] and is skipped rather
/// than failing.
pub trait Aspect: Send + Sync {
    /// Stable, kebab-case name of the aspect.
    fn name(&self) -> &'static str;

    /// Whether the module satisfies the aspect's precondition.
    fn is_applicable(&self, module: &Module) -> bool {
        let _ = module;
        true
    }

    /// Apply the mutation, returning the updated module.
    ///
    /// # Errors
    ///
    /// Returns an [`crate::AspectError`] when the aspect cannot be applied.
    fn apply(&self, module: Module) -> Result<Module>;
}

/// Whether an aspect's failure aborts the configuration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// Failure is fatal to the whole pass.
    Required,
    /// Failure is logged and the module keeps its pre-aspect state.
    Optional,
}

/// What happened when an aspect met a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AspectOutcome {
    /// The aspect ran and its result was kept.
    Applied,
    /// The module lacked the aspect's precondition.
    Skipped,
    /// An optional aspect failed; the failure was logged and swallowed.
    Tolerated {
        /// Rendered failure.
        reason: String,
    },
}

/// One aspect's outcome for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectRecord {
    /// Name of the aspect.
    pub aspect: &'static str,
    /// Outcome of the application.
    pub outcome: AspectOutcome,
}
