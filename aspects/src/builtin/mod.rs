//! The built-in aspects, one module per concern.
//!
//! Each aspect is idempotent and skips modules that lack its precondition.
//! Only [`UnitCoercionAspect`] can fail on an ordinary module: it needs the
//! blocking-bridge plugin, which is optional.

mod compiler_diagnostics;
mod encoding;
mod opt_ins;
mod runtime_target;
mod source_sets;
mod test_framework;
mod unit_coercion;

pub use compiler_diagnostics::CompilerDiagnosticsAspect;
pub use encoding::EncodingAspect;
pub use opt_ins::ExperimentalOptInAspect;
pub use runtime_target::RuntimeTargetAspect;
pub use source_sets::FlattenSourceSetsAspect;
pub use test_framework::{TEST_FRAMEWORK_DEPENDENCY, TestFrameworkAspect};
pub use unit_coercion::UnitCoercionAspect;

/// Push `value` onto `values` unless it is already present.
fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_owned());
    }
}
