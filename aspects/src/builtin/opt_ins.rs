//! Experimental-API opt-ins.

use super::push_unique;
use crate::aspect::Aspect;
use crate::error::Result;
use trellis_common::Module;

/// Adds opt-in annotations to the language settings of every source set.
#[derive(Debug, Clone)]
pub struct ExperimentalOptInAspect {
    annotations: Vec<String>,
}

impl ExperimentalOptInAspect {
    /// Aspect name.
    pub const NAME: &'static str = "experimental-opt-ins";

    /// Create the aspect for `annotations`.
    #[must_use]
    pub fn new(annotations: Vec<String>) -> Self {
        Self { annotations }
    }
}

impl Aspect for ExperimentalOptInAspect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_applicable(&self, module: &Module) -> bool {
        !module.state.source_sets.is_empty()
    }

    fn apply(&self, mut module: Module) -> Result<Module> {
        for source_set in &mut module.state.source_sets {
            for annotation in &self.annotations {
                push_unique(&mut source_set.language.opt_ins, annotation);
            }
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::fixtures::{bare, multiplatform};

    #[test]
    fn every_source_set_receives_the_opt_ins() {
        let aspect = ExperimentalOptInAspect::new(vec!["kotlin.RequiresOptIn".to_owned()]);
        let module = aspect.apply(multiplatform("core")).expect("applies");
        assert!(
            module
                .state
                .source_sets
                .iter()
                .all(|set| set.language.opt_ins == ["kotlin.RequiresOptIn".to_owned()])
        );
    }

    #[test]
    fn modules_without_source_sets_are_skipped() {
        let aspect = ExperimentalOptInAspect::new(vec![]);
        assert!(!aspect.is_applicable(&bare("bom")));
    }
}
