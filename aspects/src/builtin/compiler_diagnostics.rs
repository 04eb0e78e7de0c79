//! Compiler diagnostics flags.

use super::push_unique;
use crate::aspect::Aspect;
use crate::error::Result;
use trellis_common::Module;

/// Adds the configured compiler flags to every compilation target.
#[derive(Debug, Clone)]
pub struct CompilerDiagnosticsAspect {
    flags: Vec<String>,
}

impl CompilerDiagnosticsAspect {
    /// Aspect name.
    pub const NAME: &'static str = "compiler-diagnostics";

    /// Create the aspect for `flags`.
    #[must_use]
    pub fn new(flags: Vec<String>) -> Self {
        Self { flags }
    }
}

impl Aspect for CompilerDiagnosticsAspect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_applicable(&self, module: &Module) -> bool {
        !module.targets.is_empty()
    }

    fn apply(&self, mut module: Module) -> Result<Module> {
        for target in &mut module.targets {
            for flag in &self.flags {
                push_unique(&mut target.compiler.flags, flag);
            }
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::fixtures::multiplatform;

    #[test]
    fn keeps_existing_flags_and_order() {
        let mut module = multiplatform("core");
        if let Some(target) = module.targets.first_mut() {
            target.compiler.flags.push("-Xexisting".to_owned());
        }
        let aspect = CompilerDiagnosticsAspect::new(vec!["-progressive".to_owned()]);
        let module = aspect.apply(module).expect("applies");

        let flags = module.targets.first().map(|target| target.compiler.flags.clone());
        assert_eq!(
            flags,
            Some(vec!["-Xexisting".to_owned(), "-progressive".to_owned()])
        );
    }
}
