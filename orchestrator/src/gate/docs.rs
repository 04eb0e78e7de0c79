//! Documentation generator policy derived from the API gate exclusions.
//!
//! Documentation hides the same packages the API gate ignores, plus any
//! documentation-only suppressions. Each rule becomes a per-package option
//! whose regular expression must match the whole package name.

use super::error::GateError;
use super::policy::{ApiGatePolicy, PackagePattern};
use log::debug;
use regex::Regex;
use serde::Serialize;
use trellis_common::{ApiSymbol, ModuleId};

/// Output directory for HTML documentation.
pub const HTML_OUTPUT_DIR: &str = "build/docs/html";

/// Output directory for GitHub-flavoured Markdown documentation.
pub const GFM_OUTPUT_DIR: &str = "build/docs/gfm";

/// One per-package option handed to the documentation generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageOption {
    /// Regular expression matched against whole package names.
    pub matching_regex: String,
    /// Whether matching packages are left out entirely.
    pub suppress: bool,
    /// Whether deprecated members of matching packages are left out.
    pub skip_deprecated: bool,
}

/// Turn a package name or `*` glob into a regular expression.
///
/// # Examples
///
/// ```
/// use trellis_orchestrator::gate::docs::package_regex;
///
/// assert_eq!(package_regex("net.example.internal"), r"net\.example\.internal");
/// assert_eq!(package_regex("internal.*"), r"internal\..*");
/// ```
#[must_use]
pub fn package_regex(package: &str) -> String {
    regex::escape(package.trim()).replace(r"\*", ".*")
}

/// What the documentation generator documents and how.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentationPolicy {
    modules: Vec<ModuleId>,
    html_dir: &'static str,
    gfm_dir: &'static str,
    package_options: Vec<PackageOption>,
    non_public_markers: Vec<String>,
    #[serde(skip)]
    matchers: Vec<Regex>,
}

impl DocumentationPolicy {
    /// Derive the documentation policy.
    ///
    /// `modules` generate documentation. Every package excluded by
    /// `gate` and every entry of `extra_suppressed` is suppressed. When
    /// `skip_deprecated` is set, deprecated members of matching packages are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidDocsPattern`] if a rule is not a valid
    /// regular expression.
    pub fn new<S: AsRef<str>>(
        modules: Vec<ModuleId>,
        gate: &ApiGatePolicy,
        extra_suppressed: &[S],
        skip_deprecated: Option<&str>,
    ) -> Result<Self, GateError> {
        let mut package_options = Vec::new();
        if let Some(pattern) = skip_deprecated {
            package_options.push(PackageOption {
                matching_regex: pattern.to_owned(),
                suppress: false,
                skip_deprecated: true,
            });
        }

        let suppressed = gate
            .exclude_packages()
            .iter()
            .map(PackagePattern::as_str)
            .chain(extra_suppressed.iter().map(AsRef::as_ref));
        for package in suppressed {
            let matching_regex = package_regex(package);
            if package_options
                .iter()
                .any(|option| option.suppress && option.matching_regex == matching_regex)
            {
                continue;
            }
            package_options.push(PackageOption {
                matching_regex,
                suppress: true,
                skip_deprecated: false,
            });
        }

        let matchers = package_options
            .iter()
            .map(|option| compile(&option.matching_regex))
            .collect::<Result<_, _>>()?;
        debug!(
            "documentation policy: {} module(s), {} package option(s)",
            modules.len(),
            package_options.len()
        );

        Ok(Self {
            modules,
            html_dir: HTML_OUTPUT_DIR,
            gfm_dir: GFM_OUTPUT_DIR,
            package_options,
            non_public_markers: gate.exclude_markers().map(str::to_owned).collect(),
            matchers,
        })
    }

    /// Modules that generate documentation.
    #[must_use]
    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    /// Per-package options in the order they are applied.
    #[must_use]
    pub fn package_options(&self) -> &[PackageOption] {
        &self.package_options
    }

    /// Whether `package` is left out of the documentation.
    #[must_use]
    pub fn is_suppressed(&self, package: &str) -> bool {
        self.matching(package).any(|option| option.suppress)
    }

    /// Whether deprecated members of `package` are left out.
    #[must_use]
    pub fn skips_deprecated(&self, package: &str) -> bool {
        self.matching(package).any(|option| option.skip_deprecated)
    }

    /// Whether `symbol` of `module` appears in the documentation.
    #[must_use]
    pub fn documents(&self, module: &ModuleId, symbol: &ApiSymbol) -> bool {
        self.modules.contains(module)
            && !self.is_suppressed(&symbol.package)
            && !self
                .non_public_markers
                .iter()
                .any(|marker| symbol.has_annotation(marker))
    }

    fn matching<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a PackageOption> {
        self.package_options
            .iter()
            .zip(&self.matchers)
            .filter(move |(_, matcher)| matcher.is_match(package))
            .map(|(option, _)| option)
    }
}

fn compile(pattern: &str) -> Result<Regex, GateError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| GateError::InvalidDocsPattern {
        pattern: pattern.to_owned(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn id(name: &str) -> ModuleId {
        ModuleId::new(name).expect("valid id")
    }

    #[fixture]
    fn policy() -> DocumentationPolicy {
        let gate = ApiGatePolicy::new(
            [id("api")],
            &["net.example.internal", "impl.*"],
            &["net.example.InternalApi"],
        )
        .expect("valid gate policy");
        DocumentationPolicy::new(
            vec![id("api")],
            &gate,
            &["net.example.compiler.common", "net.example.internal"],
            Some(r"net\.example\..*"),
        )
        .expect("valid docs policy")
    }

    #[rstest]
    fn options_start_with_skip_deprecated_then_suppressions(policy: DocumentationPolicy) {
        let regexes: Vec<(&str, bool)> = policy
            .package_options()
            .iter()
            .map(|option| (option.matching_regex.as_str(), option.suppress))
            .collect();
        assert_eq!(
            regexes,
            vec![
                (r"net\.example\..*", false),
                (r"net\.example\.internal", true),
                (r"impl\..*", true),
                (r"net\.example\.compiler\.common", true),
            ]
        );
    }

    #[rstest]
    #[case::gate_exclusion("net.example.internal", true)]
    #[case::glob("impl.detail", true)]
    #[case::docs_only("net.example.compiler.common", true)]
    #[case::whole_name_only("net.example.internal.message", false)]
    #[case::public("net.example.api", false)]
    fn suppression(policy: DocumentationPolicy, #[case] package: &str, #[case] suppressed: bool) {
        assert_eq!(policy.is_suppressed(package), suppressed);
    }

    #[rstest]
    fn skip_deprecated_applies_to_matching_packages(policy: DocumentationPolicy) {
        assert!(policy.skips_deprecated("net.example.api"));
        assert!(!policy.skips_deprecated("org.other"));
    }

    #[rstest]
    fn marker_annotated_symbols_are_not_documented(policy: DocumentationPolicy) {
        let public = ApiSymbol::new("net.example.api", "Bot", "class Bot");
        let internal = public.clone().annotated("net.example.InternalApi");
        assert!(policy.documents(&id("api"), &public));
        assert!(!policy.documents(&id("api"), &internal));
        assert!(!policy.documents(&id("console"), &public));
    }

    #[rstest]
    fn serialises_output_directories(policy: DocumentationPolicy) {
        let json = serde_json::to_value(&policy).expect("serialisable");
        assert_eq!(json["html_dir"], "build/docs/html");
        assert_eq!(json["gfm_dir"], "build/docs/gfm");
        assert!(json.get("matchers").is_none());
    }

    #[test]
    fn invalid_skip_deprecated_pattern_is_rejected() {
        let err = DocumentationPolicy::new::<&str>(
            Vec::new(),
            &ApiGatePolicy::default(),
            &[],
            Some("net.(example"),
        )
        .expect_err("unbalanced group");
        assert!(matches!(err, GateError::InvalidDocsPattern { .. }));
    }
}
