//! Runtime-target selection for JVM-family compilations.

use crate::aspect::Aspect;
use crate::error::Result;
use trellis_common::Module;

/// Sets the runtime target version on every JVM-family compilation.
#[derive(Debug, Clone)]
pub struct RuntimeTargetAspect {
    version: String,
}

impl RuntimeTargetAspect {
    /// Aspect name.
    pub const NAME: &'static str = "runtime-target";

    /// Create the aspect for `version`.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Aspect for RuntimeTargetAspect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_applicable(&self, module: &Module) -> bool {
        module.is_jvm_only()
            || module
                .targets
                .iter()
                .any(|target| target.platform.is_jvm_family())
    }

    fn apply(&self, mut module: Module) -> Result<Module> {
        for target in module
            .targets
            .iter_mut()
            .filter(|target| target.platform.is_jvm_family())
        {
            target.compiler.runtime_target = Some(self.version.clone());
        }
        if module.is_jvm_only() {
            module.state.runtime_target = Some(self.version.clone());
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::fixtures::{bare, jvm_only, multiplatform};
    use trellis_common::PlatformTag;

    #[test]
    fn sets_version_on_jvm_targets_only() {
        let aspect = RuntimeTargetAspect::new("1.8");
        let module = aspect.apply(multiplatform("core")).expect("applies");

        for target in &module.targets {
            let expected = (target.platform == PlatformTag::Jvm).then(|| "1.8".to_owned());
            assert_eq!(target.compiler.runtime_target, expected, "target {}", target.name);
        }
        assert!(module.state.runtime_target.is_none());
    }

    #[test]
    fn jvm_only_modules_get_module_level_target() {
        let aspect = RuntimeTargetAspect::new("11");
        let module = aspect.apply(jvm_only("console")).expect("applies");
        assert_eq!(module.state.runtime_target.as_deref(), Some("11"));
    }

    #[test]
    fn modules_without_jvm_output_are_not_applicable() {
        let aspect = RuntimeTargetAspect::new("1.8");
        assert!(!aspect.is_applicable(&bare("docs")));
    }
}
