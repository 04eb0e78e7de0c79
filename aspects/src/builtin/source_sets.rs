//! Source-set layout normalisation for JVM-only modules.
//!
//! JVM-only modules keep their sources directly under the module root:
//! `src/` and `resources/` for `main`, `test/` and `testResources/` for
//! `test`. Other source sets are left untouched.

use crate::aspect::Aspect;
use crate::error::Result;
use camino::Utf8PathBuf;
use trellis_common::Module;

/// Flattens the `main` and `test` source-set directories of JVM-only modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenSourceSetsAspect;

impl FlattenSourceSetsAspect {
    /// Aspect name.
    pub const NAME: &'static str = "flatten-source-sets";
}

/// Flattened `(sources, resources)` directories for a source set, if any.
fn flattened_layout(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "main" => Some(("src", "resources")),
        "test" => Some(("test", "testResources")),
        _ => None,
    }
}

impl Aspect for FlattenSourceSetsAspect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_applicable(&self, module: &Module) -> bool {
        module.is_jvm_only()
    }

    fn apply(&self, mut module: Module) -> Result<Module> {
        for source_set in &mut module.state.source_sets {
            if let Some((sources, resources)) = flattened_layout(&source_set.name) {
                source_set.source_dir = Utf8PathBuf::from(sources);
                source_set.resource_dir = Utf8PathBuf::from(resources);
            }
        }
        Ok(module)
    }
}
