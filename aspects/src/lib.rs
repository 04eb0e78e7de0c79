//! Cross-cutting configuration aspects for Trellis modules.
//!
//! An aspect is a named, idempotent `Module -> Module` transformation. The
//! [`AspectRegistry`] keeps aspects in a fixed order and folds a module
//! through all of them, so the order and the idempotence of each step can be
//! tested on their own. The built-in set mirrors the order the build has
//! always relied on: runtime target, encoding, test framework, compiler
//! diagnostics, experimental opt-ins, unit coercion, and source-set
//! flattening.

mod aspect;
pub mod builtin;
mod error;
mod registry;
mod settings;

pub use aspect::{Aspect, AspectOutcome, AspectRecord, Tolerance};
pub use error::{AspectError, Result};
pub use registry::{
    AspectDescriptor, AspectRegistry, BUILTIN_ASPECTS, ConfiguredModule, builtin_aspect_names,
};
pub use settings::{
    AspectSettings, DEFAULT_COMPILER_FLAGS, DEFAULT_ENCODING, DEFAULT_OPT_INS, DEFAULT_RUNTIME_TARGET,
};
