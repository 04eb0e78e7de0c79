//! Selecting the compilation targets of the designated platform.

use trellis_common::{CompilationTarget, Module, PlatformTag};

/// Picks the targets whose platform equals the designated platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformOutputSelector {
    designated: PlatformTag,
}

impl PlatformOutputSelector {
    /// Create a selector for `designated`.
    #[must_use]
    pub fn new(designated: PlatformTag) -> Self {
        Self { designated }
    }

    /// The designated platform.
    #[must_use]
    pub fn designated(&self) -> PlatformTag {
        self.designated
    }

    /// Targets of `module` compiling for the designated platform, in
    /// declaration order.
    #[must_use]
    pub fn select<'m>(&self, module: &'m Module) -> Vec<&'m CompilationTarget> {
        module.targets_on(self.designated).collect()
    }
}
