//! Merging designated-platform outputs with the dependency closure.
//!
//! An assembly exists for a module only when the module compiles for several
//! platforms and exposes a dependency closure resolved for the designated
//! platform. The merged entry set is the union of the selected compilation
//! outputs (in target declaration order) followed by the closure artifacts
//! (in resolver order). The first entry with a given name wins, and
//! signature metadata is dropped because it would no longer match the merged
//! contents.

use super::error::AssemblyError;
use crate::selector::PlatformOutputSelector;
use log::{debug, trace};
use std::collections::HashSet;
use trellis_common::{CompilationTarget, CompileOutcome, Coordinate, Entry, Module, ModuleId};

/// File-name suffix of signature metadata, compared case-insensitively.
pub const SIGNATURE_SUFFIX: &str = ".sf";

/// Whether `name` is signature metadata that must not be merged.
///
/// Only the final path segment is inspected.
///
/// # Examples
///
/// ```
/// use trellis_orchestrator::assembly::is_signature_metadata;
///
/// assert!(is_signature_metadata("META-INF/SIGNER.SF"));
/// assert!(is_signature_metadata("META-INF/signer.sf"));
/// assert!(!is_signature_metadata("META-INF/SIGNER.RSA"));
/// assert!(!is_signature_metadata("sf/Api.class"));
/// ```
#[must_use]
pub fn is_signature_metadata(name: &str) -> bool {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    file_name.to_ascii_lowercase().ends_with(SIGNATURE_SUFFIX)
}

/// The merged contents of one module's deployable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactAssembly {
    module: ModuleId,
    selected_targets: Vec<String>,
    dependencies: Vec<Coordinate>,
    entries: Vec<Entry>,
    excluded: Vec<String>,
}

impl ArtifactAssembly {
    /// Module the assembly belongs to.
    #[must_use]
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Names of the merged compilation targets, in declaration order.
    #[must_use]
    pub fn selected_targets(&self) -> &[String] {
        &self.selected_targets
    }

    /// Coordinates of the merged dependency artifacts, in resolver order.
    #[must_use]
    pub fn dependencies(&self) -> &[Coordinate] {
        &self.dependencies
    }

    /// Merged entries in merge order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Names of entries dropped as signature metadata.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Merged entry names in merge order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

/// Builds [`ArtifactAssembly`] values for qualifying modules.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactAssembler {
    selector: PlatformOutputSelector,
}

impl ArtifactAssembler {
    /// Create an assembler using `selector` to pick targets.
    #[must_use]
    pub fn new(selector: PlatformOutputSelector) -> Self {
        Self { selector }
    }

    /// The targets an assembly of `module` depends on, or `None` when the
    /// module does not qualify for an assembly.
    ///
    /// A qualifying module with no matching targets yields an empty list: its
    /// assembly contains only the dependency closure.
    #[must_use]
    pub fn plan<'m>(&self, module: &'m Module) -> Option<Vec<&'m CompilationTarget>> {
        let designated = self.selector.designated();
        let has_closure = module
            .dependency_closure
            .as_ref()
            .is_some_and(|closure| closure.platform == designated);

        if module.is_multiplatform() && has_closure {
            Some(self.selector.select(module))
        } else {
            debug!(
                "module {}: no {designated} assembly (multiplatform: {}, closure: {has_closure})",
                module.id,
                module.is_multiplatform()
            );
            None
        }
    }

    /// Assemble `module`, returning `None` when it does not qualify.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::UpstreamCompilationFailed`] if any selected
    /// target failed to compile. No partial assembly is produced.
    pub fn assemble(&self, module: &Module) -> Result<Option<ArtifactAssembly>, AssemblyError> {
        let Some(selected) = self.plan(module) else {
            return Ok(None);
        };

        let mut outputs = Vec::with_capacity(selected.len());
        for target in &selected {
            match &target.output {
                CompileOutcome::Compiled(output) => outputs.push(output),
                CompileOutcome::Failed { reason } => {
                    return Err(AssemblyError::UpstreamCompilationFailed {
                        module: module.id.clone(),
                        target: target.name.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        let closure = module.dependency_closure.as_ref();
        let candidates = outputs
            .iter()
            .flat_map(|output| output.entries.iter())
            .chain(closure.into_iter().flat_map(|closure| closure.entries()));

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut excluded = Vec::new();
        for entry in candidates {
            if !seen.insert(entry.name.as_str()) {
                trace!("module {}: keeping first {}", module.id, entry.name);
                continue;
            }
            if is_signature_metadata(&entry.name) {
                excluded.push(entry.name.clone());
            } else {
                entries.push(entry.clone());
            }
        }

        debug!(
            "module {}: assembled {} entries from {} target(s), dropped {}",
            module.id,
            entries.len(),
            selected.len(),
            excluded.len()
        );

        Ok(Some(ArtifactAssembly {
            module: module.id.clone(),
            selected_targets: selected.iter().map(|target| target.name.clone()).collect(),
            dependencies: closure
                .map(|closure| {
                    closure
                        .artifacts
                        .iter()
                        .map(|artifact| artifact.coordinate.clone())
                        .collect()
                })
                .unwrap_or_default(),
            entries,
            excluded,
        }))
    }
}
