//! Applying the aspect registry to every ready module.
//!
//! The configurator stamps the project coordinates onto each module and then
//! folds it through the registry. Modules are processed in declaration order
//! and only accepted as [`ReadyModule`]s, so every aspect runs once per module
//! and only after that module configured itself.

use crate::collector::ReadyModule;
use crate::error::Result;
use log::{info, warn};
use std::fmt;
use trellis_aspects::{AspectOutcome, AspectRegistry, ConfiguredModule};
use trellis_common::Module;

/// Group and version stamped onto every module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCoordinates {
    /// Project group, if any.
    pub group: Option<String>,
    /// Project version.
    pub version: String,
}

/// Configuration settings for the configurator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguratorConfig {
    /// Coordinates stamped before any aspect runs.
    pub coordinates: ProjectCoordinates,
}

/// Drives the aspect registry over every module.
pub struct ProjectConfigurator<'r> {
    registry: &'r AspectRegistry,
    config: ConfiguratorConfig,
}

impl<'r> ProjectConfigurator<'r> {
    /// Create a configurator for `registry`.
    #[must_use]
    pub fn new(registry: &'r AspectRegistry, config: ConfiguratorConfig) -> Self {
        Self { registry, config }
    }

    /// Configure a single ready module.
    ///
    /// # Errors
    ///
    /// Returns the first failure of a required aspect.
    pub fn configure_module(&self, ready: ReadyModule) -> Result<ConfiguredModule> {
        let module = self.stamp(ready.into_module());
        let configured = self.registry.apply_all(module)?;
        for record in &configured.records {
            if let AspectOutcome::Tolerated { reason } = &record.outcome {
                warn!(
                    "module {}: tolerated failure of {}: {reason}",
                    configured.module.id, record.aspect
                );
            }
        }
        Ok(configured)
    }

    /// Configure every module in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first failure of a required aspect; later modules are not
    /// configured.
    pub fn configure(&self, modules: Vec<ReadyModule>) -> Result<ConfigurationReport> {
        info!(
            "configuring {} module(s) with {} aspect(s)",
            modules.len(),
            self.registry.len()
        );
        let modules = modules
            .into_iter()
            .map(|ready| self.configure_module(ready))
            .collect::<Result<Vec<_>>>()?;
        Ok(ConfigurationReport { modules })
    }

    fn stamp(&self, mut module: Module) -> Module {
        let coordinates = &self.config.coordinates;
        module.state.group.clone_from(&coordinates.group);
        module.state.version = Some(coordinates.version.clone());
        module
    }
}

/// Outcome of a configuration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationReport {
    modules: Vec<ConfiguredModule>,
}

impl ConfigurationReport {
    /// Configured modules with their aspect records, in declaration order.
    #[must_use]
    pub fn modules(&self) -> &[ConfiguredModule] {
        &self.modules
    }

    /// Consume the report and return the configured descriptors.
    #[must_use]
    pub fn into_modules(self) -> Vec<Module> {
        self.modules
            .into_iter()
            .map(|configured| configured.module)
            .collect()
    }

    /// Number of tolerated optional-aspect failures across all modules.
    #[must_use]
    pub fn tolerated_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|configured| &configured.records)
            .filter(|record| matches!(record.outcome, AspectOutcome::Tolerated { .. }))
            .count()
    }
}

impl fmt::Display for ConfigurationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for configured in &self.modules {
            writeln!(f, "{}:", configured.module.id)?;
            for record in &configured.records {
                match &record.outcome {
                    AspectOutcome::Applied => writeln!(f, "  applied    {}", record.aspect)?,
                    AspectOutcome::Skipped => writeln!(f, "  skipped    {}", record.aspect)?,
                    AspectOutcome::Tolerated { reason } => {
                        writeln!(f, "  tolerated  {} ({reason})", record.aspect)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::collect_descriptors;
    use rstest::{fixture, rstest};
    use trellis_aspects::AspectSettings;
    use trellis_common::{CompilationTarget, ModuleId, ModuleKind, PlatformTag, plugins};

    #[fixture]
    fn registry() -> AspectRegistry {
        AspectRegistry::builtin(&AspectSettings::default())
    }

    fn config() -> ConfiguratorConfig {
        ConfiguratorConfig {
            coordinates: ProjectCoordinates {
                group: Some("net.example".to_owned()),
                version: "2.0.0".to_owned(),
            },
        }
    }

    fn module(name: &str, kind: ModuleKind) -> Module {
        Module::new(ModuleId::new(name).expect("valid id"), kind)
            .with_target(CompilationTarget::compiled("jvm", PlatformTag::Jvm, vec![]))
    }

    #[rstest]
    fn stamps_coordinates_before_aspects(registry: AspectRegistry) {
        let ready = collect_descriptors(vec![module("api", ModuleKind::Multiplatform)])
            .expect("collected");
        let report = ProjectConfigurator::new(&registry, config())
            .configure(ready)
            .expect("configures");

        let module = report.into_modules().remove(0);
        assert_eq!(module.state.group.as_deref(), Some("net.example"));
        assert_eq!(module.state.version.as_deref(), Some("2.0.0"));
        assert_eq!(module.state.encoding.as_deref(), Some("UTF-8"));
    }

    #[rstest]
    fn every_module_gets_one_record_per_aspect(registry: AspectRegistry) {
        let ready = collect_descriptors(vec![
            module("api", ModuleKind::Multiplatform),
            module("console", ModuleKind::JvmOnly).with_plugin(plugins::BLOCKING_BRIDGE),
        ])
        .expect("collected");
        let report = ProjectConfigurator::new(&registry, config())
            .configure(ready)
            .expect("configures");

        for configured in report.modules() {
            let names: Vec<_> = configured.records.iter().map(|record| record.aspect).collect();
            let expected: Vec<_> = registry.names().collect();
            assert_eq!(names, expected, "module {}", configured.module.id);
        }
        assert_eq!(report.tolerated_count(), 1, "only api lacks the blocking bridge");
    }

    #[rstest]
    fn required_failure_aborts_the_pass(registry: AspectRegistry) {
        let registry = registry.with_optional::<&str>(&[]).expect("valid");
        let ready = collect_descriptors(vec![module("api", ModuleKind::Multiplatform)])
            .expect("collected");

        let outcome = ProjectConfigurator::new(&registry, config()).configure(ready);
        assert!(outcome.is_err());
    }

    #[rstest]
    fn report_lists_outcomes(registry: AspectRegistry) {
        let ready = collect_descriptors(vec![module("api", ModuleKind::Multiplatform)])
            .expect("collected");
        let report = ProjectConfigurator::new(&registry, config())
            .configure(ready)
            .expect("configures");

        let text = report.to_string();
        assert!(text.starts_with("api:\n"));
        assert!(text.contains("applied    encoding"));
        assert!(text.contains("tolerated  unit-coercion"));
        assert!(text.contains("skipped    flatten-source-sets"));
    }
}
