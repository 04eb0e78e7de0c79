//! Blocking-bridge unit coercion.
//!
//! This is the one built-in aspect that depends on an optional plugin. On a
//! module without the blocking-bridge plugin it fails with
//! [`AspectError::CapabilityUnavailable`]; the registry tolerates that
//! failure by default.

use crate::aspect::Aspect;
use crate::error::{AspectError, Result};
use trellis_common::{Module, UnitCoercion, plugins};

/// Sets the blocking-bridge unit coercion to compatibility mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCoercionAspect;

impl UnitCoercionAspect {
    /// Aspect name.
    pub const NAME: &'static str = "unit-coercion";
}

impl Aspect for UnitCoercionAspect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, mut module: Module) -> Result<Module> {
        if !module.has_plugin(plugins::BLOCKING_BRIDGE) {
            return Err(AspectError::CapabilityUnavailable {
                aspect: Self::NAME,
                module: module.id,
                capability: plugins::BLOCKING_BRIDGE,
            });
        }
        module.state.unit_coercion = Some(UnitCoercion::Compatibility);
        Ok(module)
    }
}
