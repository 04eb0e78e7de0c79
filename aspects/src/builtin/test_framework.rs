//! Test-framework wiring.

use super::push_unique;
use crate::aspect::Aspect;
use crate::error::Result;
use trellis_common::{Module, TestRunner, TestSettings, plugins};

/// Dependency notation added to every test source set.
pub const TEST_FRAMEWORK_DEPENDENCY: &str = "org.jetbrains.kotlin:kotlin-test-junit5";

/// Wires the JUnit platform runner into modules that use the test framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestFrameworkAspect;

impl TestFrameworkAspect {
    /// Aspect name.
    pub const NAME: &'static str = "test-framework";
}

/// Test source sets are `test` itself or anything ending in `Test`.
fn is_test_source_set(name: &str) -> bool {
    name == "test" || name.ends_with("Test")
}

impl Aspect for TestFrameworkAspect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_applicable(&self, module: &Module) -> bool {
        module.has_plugin(plugins::TEST_FRAMEWORK)
    }

    fn apply(&self, mut module: Module) -> Result<Module> {
        module.state.test = Some(TestSettings {
            runner: TestRunner::JunitPlatform,
        });
        for source_set in module
            .state
            .source_sets
            .iter_mut()
            .filter(|set| is_test_source_set(&set.name))
        {
            push_unique(&mut source_set.dependencies, TEST_FRAMEWORK_DEPENDENCY);
        }
        Ok(module)
    }
}
