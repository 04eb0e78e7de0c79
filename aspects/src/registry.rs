//! The ordered aspect registry and the fold that applies it.

use crate::aspect::{Aspect, AspectOutcome, AspectRecord, Tolerance};
use crate::builtin::{
    CompilerDiagnosticsAspect, EncodingAspect, ExperimentalOptInAspect, FlattenSourceSetsAspect,
    RuntimeTargetAspect, TestFrameworkAspect, UnitCoercionAspect,
};
use crate::error::{AspectError, Result};
use crate::settings::AspectSettings;
use log::{debug, trace};
use trellis_common::Module;

/// Minimal metadata describing a built-in aspect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AspectDescriptor {
    /// Canonical aspect name.
    pub name: &'static str,
    /// Default tolerance of the aspect.
    pub tolerance: Tolerance,
}

/// The built-in aspects in application order.
pub const BUILTIN_ASPECTS: &[AspectDescriptor] = &[
    AspectDescriptor {
        name: RuntimeTargetAspect::NAME,
        tolerance: Tolerance::Required,
    },
    AspectDescriptor {
        name: EncodingAspect::NAME,
        tolerance: Tolerance::Required,
    },
    AspectDescriptor {
        name: TestFrameworkAspect::NAME,
        tolerance: Tolerance::Required,
    },
    AspectDescriptor {
        name: CompilerDiagnosticsAspect::NAME,
        tolerance: Tolerance::Required,
    },
    AspectDescriptor {
        name: ExperimentalOptInAspect::NAME,
        tolerance: Tolerance::Required,
    },
    AspectDescriptor {
        name: UnitCoercionAspect::NAME,
        tolerance: Tolerance::Optional,
    },
    AspectDescriptor {
        name: FlattenSourceSetsAspect::NAME,
        tolerance: Tolerance::Required,
    },
];

/// Returns the built-in aspect names in application order.
///
/// # Examples
///
/// ```
/// use trellis_aspects::builtin_aspect_names;
///
/// let names: Vec<_> = builtin_aspect_names().collect();
/// assert_eq!(names.first(), Some(&"runtime-target"));
/// assert_eq!(names.last(), Some(&"flatten-source-sets"));
/// ```
#[must_use = "Discarding the iterator hides registry wiring errors"]
pub fn builtin_aspect_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_ASPECTS.iter().map(|descriptor| descriptor.name)
}

struct RegisteredAspect {
    aspect: Box<dyn Aspect>,
    tolerance: Tolerance,
}

/// A module after the registry has folded it through every aspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredModule {
    /// The configured module.
    pub module: Module,
    /// One record per registered aspect, in registry order.
    pub records: Vec<AspectRecord>,
}

/// An ordered set of uniquely named aspects.
#[derive(Default)]
pub struct AspectRegistry {
    entries: Vec<RegisteredAspect>,
}

impl AspectRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the registry of built-in aspects with their default tolerances.
    #[must_use]
    pub fn builtin(settings: &AspectSettings) -> Self {
        let aspects: Vec<Box<dyn Aspect>> = vec![
            Box::new(RuntimeTargetAspect::new(settings.runtime_target())),
            Box::new(EncodingAspect::new(settings.encoding())),
            Box::new(TestFrameworkAspect),
            Box::new(CompilerDiagnosticsAspect::new(
                settings.compiler_flags().to_vec(),
            )),
            Box::new(ExperimentalOptInAspect::new(settings.opt_ins().to_vec())),
            Box::new(UnitCoercionAspect),
            Box::new(FlattenSourceSetsAspect),
        ];

        let entries = aspects
            .into_iter()
            .zip(BUILTIN_ASPECTS)
            .map(|(aspect, descriptor)| RegisteredAspect {
                aspect,
                tolerance: descriptor.tolerance,
            })
            .collect();
        Self { entries }
    }

    /// Append an aspect to the end of the application order.
    ///
    /// # Errors
    ///
    /// Returns [`AspectError::DuplicateAspect`] if an aspect with the same
    /// name is already registered.
    pub fn register(&mut self, aspect: Box<dyn Aspect>, tolerance: Tolerance) -> Result<()> {
        let name = aspect.name();
        if self.contains(name) {
            return Err(AspectError::DuplicateAspect {
                name: name.to_owned(),
            });
        }
        self.entries.push(RegisteredAspect { aspect, tolerance });
        Ok(())
    }

    /// Replace every tolerance: aspects named in `optional` become optional,
    /// all others required.
    ///
    /// # Errors
    ///
    /// Returns [`AspectError::UnknownAspect`] if `optional` names an aspect
    /// that is not registered.
    pub fn with_optional<S: AsRef<str>>(mut self, optional: &[S]) -> Result<Self> {
        if let Some(unknown) = optional
            .iter()
            .map(AsRef::as_ref)
            .find(|name| !self.contains(name))
        {
            return Err(AspectError::UnknownAspect {
                name: unknown.to_owned(),
                registered: self.names().collect::<Vec<_>>().join(", "),
            });
        }
        for entry in &mut self.entries {
            let name = entry.aspect.name();
            entry.tolerance = if optional.iter().any(|candidate| candidate.as_ref() == name) {
                Tolerance::Optional
            } else {
                Tolerance::Required
            };
        }
        Ok(self)
    }

    /// Whether an aspect named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.aspect.name() == name)
    }

    /// Registered names in application order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.aspect.name())
    }

    /// Tolerance of the aspect named `name`, if registered.
    #[must_use]
    pub fn tolerance_of(&self, name: &str) -> Option<Tolerance> {
        self.entries
            .iter()
            .find(|entry| entry.aspect.name() == name)
            .map(|entry| entry.tolerance)
    }

    /// Number of registered aspects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold `module` through every aspect in registration order.
    ///
    /// Aspects whose precondition does not hold are skipped. A failing
    /// optional aspect is logged and the module keeps the state it had before
    /// that aspect ran.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a required aspect.
    pub fn apply_all(&self, module: Module) -> Result<ConfiguredModule> {
        let records = Vec::with_capacity(self.entries.len());
        let (module, records) = self
            .entries
            .iter()
            .try_fold((module, records), |(module, mut records), entry| {
                let (module, outcome) = entry.apply(module)?;
                records.push(AspectRecord {
                    aspect: entry.aspect.name(),
                    outcome,
                });
                Ok((module, records))
            })?;
        Ok(ConfiguredModule { module, records })
    }
}

impl RegisteredAspect {
    fn apply(&self, module: Module) -> Result<(Module, AspectOutcome)> {
        let name = self.aspect.name();
        if !self.aspect.is_applicable(&module) {
            debug!("aspect {name}: precondition not met for module {}", module.id);
            return Ok((module, AspectOutcome::Skipped));
        }

        trace!("aspect {name}: applying to module {}", module.id);
        match self.tolerance {
            Tolerance::Required => Ok((self.aspect.apply(module)?, AspectOutcome::Applied)),
            Tolerance::Optional => {
                let fallback = module.clone();
                match self.aspect.apply(module) {
                    Ok(configured) => Ok((configured, AspectOutcome::Applied)),
                    Err(err) => {
                        debug!("optional aspect {name} failed for module {}: {err}", fallback.id);
                        Ok((
                            fallback,
                            AspectOutcome::Tolerated {
                                reason: err.to_string(),
                            },
                        ))
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for AspectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (entry.aspect.name(), entry.tolerance)),
            )
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
