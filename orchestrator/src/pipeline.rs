//! Orchestration pipeline tying the components together.
//!
//! A [`PipelineContext`] is built once from the project configuration. It
//! owns the aspect registry and the finalised API gate policy, and exposes
//! one operation per CLI command. Phase one (collecting ready modules) always
//! precedes phase two (configuration, assembly); the gate runs over the
//! collected descriptors.

use crate::assembly::{ArtifactAssembler, PackageOutput, package_assembly};
use crate::collector::collect_descriptors;
use crate::configurator::{
    ConfigurationReport, ConfiguratorConfig, ProjectConfigurator, ProjectCoordinates,
};
use crate::error::{OrchestratorError, Result};
use crate::gate::{ApiGatePolicy, ApiSurfaceGate, DocumentationPolicy, GateReport, SnapshotStore};
use crate::selector::PlatformOutputSelector;
use crate::tasks::{TaskGraph, TaskId, TaskReport};
use camino::Utf8Path;
use log::info;
use std::collections::HashMap;
use trellis::ProjectConfig;
use trellis_aspects::AspectRegistry;
use trellis_common::{ApiSnapshot, CompileOutcome, Module, ModuleId};

/// Everything a pipeline run needs, derived once from [`ProjectConfig`].
pub struct PipelineContext {
    config: ProjectConfig,
    registry: AspectRegistry,
    policy: ApiGatePolicy,
}

impl PipelineContext {
    /// Validate `config` and derive the registry and gate policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, names an unknown
    /// optional aspect, or carries a malformed package pattern.
    pub fn from_config(config: ProjectConfig) -> Result<Self> {
        config.validate()?;
        let registry = AspectRegistry::builtin(&config.aspect_settings()?)
            .with_optional(config.aspects.optional.as_slice())?;
        let policy = ApiGatePolicy::new(
            config.allowed_modules()?,
            config.api.ignored_packages.as_slice(),
            config.api.non_public_markers.as_slice(),
        )?;
        info!(
            "pipeline ready: {} aspect(s), designated platform {}",
            registry.len(),
            config.designated_platform
        );
        Ok(Self {
            config,
            registry,
            policy,
        })
    }

    /// The project configuration.
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The aspect registry.
    #[must_use]
    pub fn registry(&self) -> &AspectRegistry {
        &self.registry
    }

    /// The finalised API gate policy.
    #[must_use]
    pub fn policy(&self) -> &ApiGatePolicy {
        &self.policy
    }

    /// Selector for the designated platform.
    #[must_use]
    pub fn selector(&self) -> PlatformOutputSelector {
        PlatformOutputSelector::new(self.config.designated_platform)
    }

    /// Collect `modules` through the ready signal and run the aspect pass.
    ///
    /// # Errors
    ///
    /// Returns an error if collection fails or a required aspect fails.
    pub fn configure(&self, modules: Vec<Module>) -> Result<ConfigurationReport> {
        let ready = collect_descriptors(modules)?;
        let configurator = ProjectConfigurator::new(
            &self.registry,
            ConfiguratorConfig {
                coordinates: ProjectCoordinates {
                    group: self.config.group().map(str::to_owned),
                    version: self.config.version.clone(),
                },
            },
        );
        configurator.configure(ready)
    }

    /// Assemble and package every qualifying module into `out_dir`.
    ///
    /// Tasks that fail are reported in the returned [`AssemblyReport`]; use
    /// [`AssemblyReport::into_result`] to treat them as fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the task graph is malformed or an artifact cannot
    /// be written.
    pub fn assemble(&self, modules: &[Module], out_dir: &Utf8Path) -> Result<AssemblyReport> {
        let assembler = ArtifactAssembler::new(self.selector());
        let (graph, by_id) = task_graph(&assembler, modules)?;

        let mut artifacts = Vec::new();
        let mut fatal = None;
        let tasks = graph.run(|task| {
            let Some(module) = by_id.get(task.module()) else {
                return Err(format!("module {} is not part of the build", task.module()));
            };
            match task {
                TaskId::Compile { target, .. } => compile_status(module, target),
                TaskId::Assemble { .. } => {
                    let outcome = assembler
                        .assemble(module)
                        .map_err(OrchestratorError::from)
                        .and_then(|assembly| {
                            assembly
                                .map(|assembly| {
                                    package_assembly(&assembly, out_dir, &self.config.version)
                                })
                                .transpose()
                                .map_err(OrchestratorError::from)
                        });
                    match outcome {
                        Ok(output) => {
                            artifacts.extend(output);
                            Ok(())
                        }
                        Err(err) => {
                            let reason = err.to_string();
                            fatal.get_or_insert(err);
                            Err(reason)
                        }
                    }
                }
            }
        })?;

        if let Some(err) = fatal {
            return Err(err);
        }
        Ok(AssemblyReport { tasks, artifacts })
    }

    /// Check allow-listed modules against snapshots in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be read.
    pub fn check_api<S: SnapshotStore>(&self, modules: &[Module], store: S) -> Result<GateReport> {
        Ok(ApiSurfaceGate::new(&self.policy, store).check(modules)?)
    }

    /// Record snapshots of allow-listed modules into `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be written.
    pub fn dump_api<S: SnapshotStore>(
        &self,
        modules: &[Module],
        store: S,
    ) -> Result<Vec<ApiSnapshot>> {
        Ok(ApiSurfaceGate::new(&self.policy, store).dump(modules)?)
    }

    /// The documentation policy sharing the gate's package exclusions.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid documented module name or pattern.
    pub fn docs_policy(&self) -> Result<DocumentationPolicy> {
        Ok(DocumentationPolicy::new(
            self.config.documented_modules()?,
            &self.policy,
            self.config.docs.suppressed_packages.as_slice(),
            self.config.docs.skip_deprecated.as_deref(),
        )?)
    }
}

fn task_graph<'m>(
    assembler: &ArtifactAssembler,
    modules: &'m [Module],
) -> Result<(TaskGraph, HashMap<&'m ModuleId, &'m Module>)> {
    let mut graph = TaskGraph::new();
    let mut by_id = HashMap::new();
    for module in modules {
        by_id.insert(&module.id, module);
        let Some(selected) = assembler.plan(module) else {
            continue;
        };
        let compiles: Vec<TaskId> = selected
            .iter()
            .map(|target| TaskId::compile(&module.id, target.name.as_str()))
            .collect();
        for compile in &compiles {
            graph.add_task(compile.clone(), [])?;
        }
        graph.add_task(TaskId::assemble(&module.id), compiles)?;
    }
    Ok((graph, by_id))
}

fn compile_status(module: &Module, target: &str) -> std::result::Result<(), String> {
    match module
        .targets
        .iter()
        .find(|candidate| candidate.name == target)
        .map(|candidate| &candidate.output)
    {
        Some(CompileOutcome::Compiled(_)) => Ok(()),
        Some(CompileOutcome::Failed { reason }) => Err(reason.clone()),
        None => Err(format!("module {} has no target {target}", module.id)),
    }
}

/// Result of [`PipelineContext::assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Per-task outcomes.
    pub tasks: TaskReport,
    /// Written artifacts, in execution order.
    pub artifacts: Vec<PackageOutput>,
}

impl AssemblyReport {
    /// Turn failed or skipped tasks into [`OrchestratorError::BuildFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::BuildFailed`] unless every task
    /// succeeded.
    pub fn into_result(self) -> Result<Self> {
        if self.tasks.is_success() {
            Ok(self)
        } else {
            Err(OrchestratorError::BuildFailed {
                failed: self.tasks.failed_count(),
                skipped: self.tasks.skipped_count(),
            })
        }
    }
}
