//! Shared build-state model for Trellis orchestration.
//!
//! The types in this crate describe what the external build tool hands to the
//! orchestrator once a module has finished configuring itself: the module's
//! build state, its compilation targets and their outputs, the resolved
//! dependency closure for the designated platform, and the module's public
//! API surface. Everything here is plain data; orchestration lives in the
//! `trellis-aspects` and `trellis-orchestrator` crates.

pub mod api;
pub mod entry;
pub mod error;
pub mod module;
pub mod platform;

pub use api::{ApiSnapshot, ApiSurface, ApiSymbol, SymbolKey, normalise_annotation};
pub use entry::{Entry, EntryData};
pub use error::{ModelError, Result};
pub use module::{
    BuildState, CompilationOutput, CompilationTarget, CompileOutcome, CompilerSettings,
    Coordinate, DependencyClosure, LanguageSettings, Module, ModuleId, ModuleKind,
    ResolvedArtifact, SourceSet, TestRunner, TestSettings, UnitCoercion, plugins,
};
pub use platform::PlatformTag;
