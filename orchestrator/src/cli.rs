//! CLI argument definitions for the Trellis orchestrator.
//!
//! Every subcommand reads the project configuration and the module
//! descriptors written by the external build tool, then runs one stage of
//! the pipeline.

use crate::inputs::DESCRIPTOR_FILE_NAME;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use trellis::CONFIG_FILE_NAME;

/// Orchestrate multi-module, multi-platform builds.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXIT STATUS:\n",
    "  0  success\n",
    "  1  orchestration failure (configuration, assembly, I/O)\n",
    "  2  the API check found breaking changes\n\n",
    "EXAMPLES:\n",
    "  Show how every aspect applied to every module:\n",
    "    $ trellis configure\n\n",
    "  Write merged artifacts:\n",
    "    $ trellis assemble --out-dir build/libs\n\n",
    "  Record and then check API snapshots:\n",
    "    $ trellis api-dump --api-dir api\n",
    "    $ trellis api-check --api-dir api",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output on stderr.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the aspect pass and print the configuration report.
    Configure(CommonArgs),

    /// Assemble and write merged artifacts for the designated platform.
    Assemble(AssembleArgs),

    /// Check allow-listed modules against recorded API snapshots.
    ApiCheck(ApiArgs),

    /// Record API snapshots for allow-listed modules.
    ApiDump(ApiArgs),

    /// Print the documentation policy as JSON.
    DocsPolicy(CommonArgs),
}

impl Command {
    /// Arguments shared by every subcommand.
    #[must_use]
    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Configure(common) | Self::DocsPolicy(common) => common,
            Self::Assemble(args) => &args.common,
            Self::ApiCheck(args) | Self::ApiDump(args) => &args.common,
        }
    }
}

/// Inputs every subcommand reads.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CommonArgs {
    /// Project configuration file.
    #[arg(long, value_name = "FILE", default_value = CONFIG_FILE_NAME)]
    pub config: Utf8PathBuf,

    /// Module descriptor file written by the build tool.
    #[arg(long, value_name = "FILE", default_value = DESCRIPTOR_FILE_NAME)]
    pub modules: Utf8PathBuf,
}

/// Arguments for `assemble`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AssembleArgs {
    /// Shared inputs.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory receiving merged artifacts.
    #[arg(long, value_name = "DIR", default_value = "build/libs")]
    pub out_dir: Utf8PathBuf,
}

/// Arguments for `api-check` and `api-dump`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ApiArgs {
    /// Shared inputs.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory holding API snapshots.
    #[arg(long, value_name = "DIR", default_value = "api")]
    pub api_dir: Utf8PathBuf,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
