//! Project-wide configuration for Trellis build orchestration.
//!
//! The orchestrator reads one `trellis.toml` per project. This crate owns its
//! schema and loading rules so the CLI and tests share a single source of
//! truth.

pub mod config;

pub use config::{
    ApiConfig, AspectsConfig, CONFIG_FILE_NAME, CompilerConfig, ConfigError, DocsConfig,
    ProjectConfig, RuntimeConfig, UNSPECIFIED_VERSION,
};
