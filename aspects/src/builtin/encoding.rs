//! Source encoding.

use crate::aspect::Aspect;
use crate::error::Result;
use trellis_common::Module;

/// Sets the source file encoding of modules that compile anything.
#[derive(Debug, Clone)]
pub struct EncodingAspect {
    encoding: String,
}

impl EncodingAspect {
    /// Aspect name.
    pub const NAME: &'static str = "encoding";

    /// Create the aspect for `encoding`.
    #[must_use]
    pub fn new(encoding: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
        }
    }
}

impl Aspect for EncodingAspect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_applicable(&self, module: &Module) -> bool {
        !module.targets.is_empty()
    }

    fn apply(&self, mut module: Module) -> Result<Module> {
        module.state.encoding = Some(self.encoding.clone());
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::fixtures::{bare, multiplatform};
    use trellis_common::{ModuleId, ModuleKind};

    #[test]
    fn sets_encoding() {
        let module = EncodingAspect::new("UTF-8")
            .apply(multiplatform("core"))
            .expect("applies");
        assert_eq!(module.state.encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn skips_modules_without_compilations() {
        assert!(!EncodingAspect::new("UTF-8").is_applicable(&bare("bom")));
    }

    #[test]
    fn jvm_only_modules_need_a_compilation_too() {
        let module = Module::new(ModuleId::new("console").expect("valid id"), ModuleKind::JvmOnly);
        assert!(!EncodingAspect::new("UTF-8").is_applicable(&module));
    }
}
