//! Trellis CLI entrypoint.
//!
//! Loads the project configuration and module descriptors, then runs the
//! requested pipeline stage. Results go to stdout; progress and errors go to
//! stderr.

use clap::Parser;
use std::io::Write;
use trellis::ProjectConfig;
use trellis_common::Module;
use trellis_orchestrator::cli::{ApiArgs, AssembleArgs, Cli, Command, CommonArgs};
use trellis_orchestrator::error::{OrchestratorError, Result};
use trellis_orchestrator::gate::FsSnapshotStore;
use trellis_orchestrator::inputs::load_descriptors;
use trellis_orchestrator::output::{dump_message, success_message, write_stderr_line};
use trellis_orchestrator::pipeline::PipelineContext;

/// Exit status when the API check fails.
const GATE_FAILED_EXIT_CODE: i32 = 2;

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Success,
    GateFailed,
}

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<RunOutcome> {
    let (context, modules) = load_inputs(cli.command.common(), cli.quiet, stderr)?;

    match &cli.command {
        Command::Configure(_) => {
            let report = context.configure(modules)?;
            write_stdout(stdout, &report)?;
            Ok(RunOutcome::Success)
        }
        Command::Assemble(args) => assemble(&context, modules, args, cli.quiet, stderr),
        Command::ApiCheck(args) => {
            let report = context.check_api(&modules, FsSnapshotStore::new(args.api_dir.clone()))?;
            write_stdout(stdout, &report)?;
            Ok(if report.is_pass() {
                RunOutcome::Success
            } else {
                RunOutcome::GateFailed
            })
        }
        Command::ApiDump(args) => dump(&context, &modules, args, cli.quiet, stderr),
        Command::DocsPolicy(_) => {
            let policy = context.docs_policy()?;
            let json = serde_json::to_string_pretty(&policy).map_err(|err| {
                OrchestratorError::WriteFailed {
                    source: std::io::Error::other(err),
                }
            })?;
            write_stdout(stdout, json)?;
            Ok(RunOutcome::Success)
        }
    }
}

fn load_inputs(
    common: &CommonArgs,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<(PipelineContext, Vec<Module>)> {
    let config = ProjectConfig::load_from(&common.config)?;
    let context = PipelineContext::from_config(config)?;
    let modules = load_descriptors(&common.modules)?;
    if !quiet {
        write_stderr_line(
            stderr,
            format!(
                "Loaded {} module(s) from {}; designated platform {}",
                modules.len(),
                common.modules,
                context.config().designated_platform
            ),
        );
    }
    Ok((context, modules))
}

fn assemble(
    context: &PipelineContext,
    modules: Vec<Module>,
    args: &AssembleArgs,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<RunOutcome> {
    let configured = context.configure(modules)?.into_modules();
    let report = context.assemble(&configured, &args.out_dir)?;
    if !quiet {
        write_stderr_line(stderr, &report.tasks);
    }
    let report = report.into_result()?;
    if !quiet {
        for artifact in &report.artifacts {
            write_stderr_line(
                stderr,
                format!("  {} (sha256 {})", artifact.archive_path, artifact.sha256),
            );
        }
        write_stderr_line(
            stderr,
            success_message(report.artifacts.len(), &args.out_dir),
        );
    }
    Ok(RunOutcome::Success)
}

fn dump(
    context: &PipelineContext,
    modules: &[Module],
    args: &ApiArgs,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<RunOutcome> {
    let snapshots = context.dump_api(modules, FsSnapshotStore::new(args.api_dir.clone()))?;
    if !quiet {
        write_stderr_line(stderr, dump_message(snapshots.len(), &args.api_dir));
    }
    Ok(RunOutcome::Success)
}

fn write_stdout(stdout: &mut dyn Write, message: impl std::fmt::Display) -> Result<()> {
    writeln!(stdout, "{message}").map_err(|source| OrchestratorError::WriteFailed { source })
}

fn exit_code_for_run_result(result: Result<RunOutcome>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(RunOutcome::Success) => 0,
        Ok(RunOutcome::GateFailed) => GATE_FAILED_EXIT_CODE,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
