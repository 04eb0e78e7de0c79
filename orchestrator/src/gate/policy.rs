//! The project-wide API gate policy.
//!
//! The policy ignores every module unless it is allow-listed. Inside an
//! allow-listed module a symbol is still excluded when its package matches an
//! exclusion pattern or it carries a non-public marker annotation. The policy
//! is built once and never mutated afterwards.

use super::error::GateError;
use std::collections::BTreeSet;
use trellis_common::{ApiSymbol, ModuleId, normalise_annotation};

/// A package exclusion rule.
///
/// A pattern matches a package when the glob matches it, when it names the
/// package exactly, or when the package is nested below it. `internal.*`
/// therefore matches `internal.foo`, and `net.example.internal` matches
/// `net.example.internal.impl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePattern {
    raw: String,
    glob: glob::Pattern,
}

impl PackagePattern {
    /// Parse a package pattern.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidPackagePattern`] for malformed globs.
    pub fn new(raw: &str) -> Result<Self, GateError> {
        let raw = raw.trim();
        let glob = glob::Pattern::new(raw).map_err(|source| GateError::InvalidPackagePattern {
            pattern: raw.to_owned(),
            source,
        })?;
        Ok(Self {
            raw: raw.to_owned(),
            glob,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `package` is covered by this pattern.
    #[must_use]
    pub fn matches(&self, package: &str) -> bool {
        self.glob.matches(package)
            || package == self.raw
            || package
                .strip_prefix(self.raw.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Immutable policy deciding which symbols the gate evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiGatePolicy {
    allow: BTreeSet<ModuleId>,
    exclude_packages: Vec<PackagePattern>,
    exclude_markers: BTreeSet<String>,
}

impl ApiGatePolicy {
    /// Build a policy.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidPackagePattern`] if a package pattern
    /// cannot be parsed.
    pub fn new<S: AsRef<str>>(
        allow: impl IntoIterator<Item = ModuleId>,
        exclude_packages: &[S],
        exclude_markers: &[S],
    ) -> Result<Self, GateError> {
        let exclude_packages = exclude_packages
            .iter()
            .map(|raw| PackagePattern::new(raw.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            allow: allow.into_iter().collect(),
            exclude_packages,
            exclude_markers: exclude_markers
                .iter()
                .map(|marker| normalise_annotation(marker.as_ref()))
                .collect(),
        })
    }

    /// The allow-listed modules, sorted by name.
    pub fn allowed(&self) -> impl Iterator<Item = &ModuleId> {
        self.allow.iter()
    }

    /// The package exclusion patterns.
    #[must_use]
    pub fn exclude_packages(&self) -> &[PackagePattern] {
        &self.exclude_packages
    }

    /// The marker annotations, without `@`.
    pub fn exclude_markers(&self) -> impl Iterator<Item = &str> {
        self.exclude_markers.iter().map(String::as_str)
    }

    /// Whether the gate evaluates `module` at all.
    #[must_use]
    pub fn is_module_included(&self, module: &ModuleId) -> bool {
        self.allow.contains(module)
    }

    /// Whether `package` is excluded in every module.
    #[must_use]
    pub fn is_package_excluded(&self, package: &str) -> bool {
        self.exclude_packages
            .iter()
            .any(|pattern| pattern.matches(package))
    }

    /// Whether `symbol` carries a non-public marker annotation.
    #[must_use]
    pub fn is_marker_annotated(&self, symbol: &ApiSymbol) -> bool {
        self.exclude_markers
            .iter()
            .any(|marker| symbol.has_annotation(marker))
    }

    /// Whether `symbol` of `module` is subject to the gate.
    #[must_use]
    pub fn includes(&self, module: &ModuleId, symbol: &ApiSymbol) -> bool {
        self.is_module_included(module)
            && !self.is_package_excluded(&symbol.package)
            && !self.is_marker_annotated(symbol)
    }

    /// The symbols of `module` subject to the gate.
    pub fn filter_symbols<'s>(
        &'s self,
        module: &'s ModuleId,
        symbols: &'s [ApiSymbol],
    ) -> impl Iterator<Item = &'s ApiSymbol> + 's {
        symbols
            .iter()
            .filter(move |symbol| self.includes(module, symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn id(name: &str) -> ModuleId {
        ModuleId::new(name).expect("valid id")
    }

    #[fixture]
    fn policy() -> ApiGatePolicy {
        ApiGatePolicy::new([id("x")], &["internal.*", "net.example.impl"], &["@Internal"])
            .expect("valid policy")
    }

    #[test]
    fn default_policy_ignores_everything() {
        let policy = ApiGatePolicy::default();
        let symbol = ApiSymbol::new("api", "foo", "fun foo()");
        assert!(!policy.includes(&id("x"), &symbol));
    }

    #[rstest]
    #[case::glob("internal.foo", true)]
    #[case::glob_nested("internal.foo.bar", true)]
    #[case::literal("net.example.impl", true)]
    #[case::nested("net.example.impl.detail", true)]
    #[case::sibling_prefix("net.example.implementation", false)]
    #[case::unrelated("api", false)]
    fn package_exclusion(policy: ApiGatePolicy, #[case] package: &str, #[case] excluded: bool) {
        assert_eq!(policy.is_package_excluded(package), excluded);
    }

    #[rstest]
    #[case::included("x", ApiSymbol::new("api", "foo", "fun foo()"), true)]
    #[case::not_allowed("y", ApiSymbol::new("api", "foo", "fun foo()"), false)]
    #[case::excluded_package("x", ApiSymbol::new("internal.foo", "bar", "fun bar()"), false)]
    #[case::marker("x", ApiSymbol::new("api", "foo", "fun foo()").annotated("Internal"), false)]
    #[case::marker_sigil("x", ApiSymbol::new("api", "foo", "fun foo()").annotated("@Internal"), false)]
    fn inclusion_predicate(
        policy: ApiGatePolicy,
        #[case] module: &str,
        #[case] symbol: ApiSymbol,
        #[case] expected: bool,
    ) {
        assert_eq!(policy.includes(&id(module), &symbol), expected);
    }

    #[rstest]
    fn filter_keeps_only_included_symbols(policy: ApiGatePolicy) {
        let symbols = vec![
            ApiSymbol::new("api", "foo", "fun foo()"),
            ApiSymbol::new("internal.x", "bar", "fun bar()"),
        ];
        let module = id("x");
        let kept: Vec<&str> = policy
            .filter_symbols(&module, &symbols)
            .map(|symbol| symbol.name.as_str())
            .collect();
        assert_eq!(kept, vec!["foo"]);
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let err = ApiGatePolicy::new(Vec::new(), &["[oops"], &[]).expect_err("bad glob");
        assert!(matches!(err, GateError::InvalidPackagePattern { .. }));
    }
}
