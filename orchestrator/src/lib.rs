//! Trellis build orchestration.
//!
//! This crate drives a multi-module, multi-platform build once every module
//! has configured itself. It applies the aspect registry to every module,
//! merges the designated platform's outputs with the dependency closure into
//! one artifact per qualifying module, and gates public API changes for an
//! allow-listed subset of modules.
//!
//! # Modules
//!
//! - [`assembly`] - Merged-artifact assembly and packaging
//! - [`cli`] - Command-line argument definitions
//! - [`collector`] - Collecting modules through the ready signal
//! - [`configurator`] - Applying aspects to every module
//! - [`error`] - Orchestration error types
//! - [`gate`] - API surface gate and documentation policy
//! - [`inputs`] - Loading module descriptors
//! - [`output`] - CLI output helpers
//! - [`pipeline`] - The end-to-end pipeline
//! - [`selector`] - Designated-platform target selection
//! - [`tasks`] - Dependency-ordered build tasks

pub mod assembly;
pub mod cli;
pub mod collector;
pub mod configurator;
pub mod error;
pub mod gate;
pub mod inputs;
pub mod output;
pub mod pipeline;
pub mod selector;
pub mod tasks;

pub use error::{OrchestratorError, Result};
pub use pipeline::{AssemblyReport, PipelineContext};
