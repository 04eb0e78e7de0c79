//! Module descriptors handed over once a module has configured itself.
//!
//! A [`Module`] bundles everything the orchestrator reads about one project
//! module: its identifier and kind, the plugins it applied, its mutable
//! [`BuildState`], its compilation targets, the resolved dependency closure
//! for the designated platform (when the module exposes one) and its current
//! public API surface.
//!
//! Descriptors are values. Configuration aspects consume a module and return
//! the updated module, so a descriptor observed by one phase is never changed
//! behind its back by another.

use crate::api::ApiSurface;
use crate::entry::Entry;
use crate::error::{ModelError, Result};
use crate::platform::PlatformTag;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Well-known plugin identifiers that aspects look for.
pub mod plugins {
    /// The multi-target compilation plugin.
    pub const MULTIPLATFORM: &str = "kotlin-multiplatform";
    /// The single-target JVM compilation plugin.
    pub const JVM: &str = "kotlin-jvm";
    /// The test-framework integration.
    pub const TEST_FRAMEWORK: &str = "kotlin-test";
    /// The optional blocking-bridge compiler plugin.
    pub const BLOCKING_BRIDGE: &str = "blocking-bridge";
}

/// A semantic module name.
///
/// Module names must be non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module identifier, rejecting empty or whitespace-bearing names.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidModuleId`] when the name is unusable.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidModuleId { value: name });
        }
        Ok(Self(name))
    }

    /// Get the module name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModuleId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ModuleId {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a module compiles its sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    /// Several compilation targets for different runtimes.
    Multiplatform,
    /// A single JVM compilation.
    JvmOnly,
    /// Anything else (aggregators, documentation-only modules).
    #[default]
    Other,
}

/// Runner used to execute a module's tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestRunner {
    /// The JUnit platform launcher.
    JunitPlatform,
}

/// Test wiring applied by the test-framework aspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSettings {
    /// Runner used for the module's test tasks.
    pub runner: TestRunner,
}

/// Return-type coercion mode of the blocking-bridge plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitCoercion {
    /// Coerce `Unit` to `void` for binary compatibility.
    Compatibility,
}

/// Language settings attached to a source set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSettings {
    /// Fully qualified opt-in annotations, in application order.
    #[serde(default)]
    pub opt_ins: Vec<String>,
}

/// A named group of sources and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet {
    /// Source set name, such as `main` or `jvmTest`.
    pub name: String,
    /// Directory holding the sources, relative to the module root.
    pub source_dir: Utf8PathBuf,
    /// Directory holding the resources, relative to the module root.
    pub resource_dir: Utf8PathBuf,
    /// Language settings for this source set.
    #[serde(default)]
    pub language: LanguageSettings,
    /// Declared dependency notations.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl SourceSet {
    /// Create a source set using the conventional `src/<name>/...` layout.
    #[must_use]
    pub fn conventional(name: impl Into<String>) -> Self {
        let name = name.into();
        let root = Utf8PathBuf::from("src").join(&name);
        Self {
            source_dir: root.join("kotlin"),
            resource_dir: root.join("resources"),
            name,
            language: LanguageSettings::default(),
            dependencies: Vec::new(),
        }
    }
}

/// Module-level configuration that aspects read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildState {
    /// Project group stamped onto the module.
    pub group: Option<String>,
    /// Project version stamped onto the module.
    pub version: Option<String>,
    /// Runtime target version for JVM-only modules.
    pub runtime_target: Option<String>,
    /// Source file encoding.
    pub encoding: Option<String>,
    /// Test wiring, when a test framework is present.
    pub test: Option<TestSettings>,
    /// Blocking-bridge coercion mode, when the plugin is present.
    pub unit_coercion: Option<UnitCoercion>,
    /// Declared source sets.
    pub source_sets: Vec<SourceSet>,
}

/// Per-target compiler options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Runtime target version for JVM-family targets.
    pub runtime_target: Option<String>,
    /// Free-form compiler flags, in application order.
    pub flags: Vec<String>,
}

/// Entries produced by one target's main compilation.
///
/// Outputs either list their entries inline or name a `directory` whose
/// files become entries when the descriptor is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationOutput {
    /// Produced entries.
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Output directory to read entries from, relative to the descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<Utf8PathBuf>,
}

impl CompilationOutput {
    /// Create an output from entries.
    #[must_use]
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            directory: None,
        }
    }
}

/// Result of a target's compile step, as reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CompileOutcome {
    /// Compilation finished and produced output.
    Compiled(CompilationOutput),
    /// Compilation failed.
    Failed {
        /// Compiler-provided failure description.
        reason: String,
    },
}

/// One compilation target of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationTarget {
    /// Target name, such as `jvm` or `js`.
    pub name: String,
    /// Runtime platform the target compiles for.
    pub platform: PlatformTag,
    /// Outcome of the target's main compile step.
    pub output: CompileOutcome,
    /// Compiler options for this target.
    #[serde(default)]
    pub compiler: CompilerSettings,
}

impl CompilationTarget {
    /// Create a successfully compiled target with the given entries.
    #[must_use]
    pub fn compiled(name: impl Into<String>, platform: PlatformTag, entries: Vec<Entry>) -> Self {
        Self {
            name: name.into(),
            platform,
            output: CompileOutcome::Compiled(CompilationOutput::new(entries)),
            compiler: CompilerSettings::default(),
        }
    }

    /// Create a target whose compile step failed.
    #[must_use]
    pub fn failed(name: impl Into<String>, platform: PlatformTag, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform,
            output: CompileOutcome::Failed {
                reason: reason.into(),
            },
            compiler: CompilerSettings::default(),
        }
    }
}

/// A resolved dependency coordinate `group:name:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    group: String,
    name: String,
    version: String,
}

impl Coordinate {
    /// Return the group component.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Return the name component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl FromStr for Coordinate {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(':').collect();
        let [group, name, version] = parts.as_slice() else {
            return Err(ModelError::InvalidCoordinate {
                value: value.to_owned(),
                reason: "expected three ':'-separated parts",
            });
        };
        if [group, name, version].iter().any(|part| part.is_empty()) {
            return Err(ModelError::InvalidCoordinate {
                value: value.to_owned(),
                reason: "coordinate parts must not be empty",
            });
        }
        Ok(Self {
            group: (*group).to_owned(),
            name: (*name).to_owned(),
            version: (*version).to_owned(),
        })
    }
}

impl TryFrom<String> for Coordinate {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Coordinate> for String {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_string()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// One resolved dependency artifact and its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    /// Coordinate the resolver supplied the artifact for.
    pub coordinate: Coordinate,
    /// Entries contained in the artifact.
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Jar or zip file to read entries from, relative to the descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<Utf8PathBuf>,
}

/// The resolved runtime dependency closure of a module for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyClosure {
    /// Platform the closure was resolved for.
    pub platform: PlatformTag,
    /// Resolved artifacts, in resolver order.
    #[serde(default)]
    pub artifacts: Vec<ResolvedArtifact>,
}

impl DependencyClosure {
    /// Create an empty closure for `platform`.
    #[must_use]
    pub fn new(platform: PlatformTag) -> Self {
        Self {
            platform,
            artifacts: Vec::new(),
        }
    }

    /// Add a resolved artifact.
    #[must_use]
    pub fn with_artifact(mut self, coordinate: Coordinate, entries: Vec<Entry>) -> Self {
        self.artifacts.push(ResolvedArtifact {
            coordinate,
            entries,
            archive: None,
        });
        self
    }

    /// Iterate over every entry of every artifact, in resolver order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.artifacts.iter().flat_map(|artifact| artifact.entries.iter())
    }
}

/// Everything the orchestrator knows about one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module identifier.
    pub id: ModuleId,
    /// How the module compiles.
    #[serde(default)]
    pub kind: ModuleKind,
    /// Applied plugin identifiers.
    #[serde(default)]
    pub plugins: BTreeSet<String>,
    /// Mutable build configuration.
    #[serde(default)]
    pub state: BuildState,
    /// Compilation targets, in declaration order.
    #[serde(default)]
    pub targets: Vec<CompilationTarget>,
    /// Resolved runtime dependencies for the designated platform, if the
    /// module exposes that dependency configuration.
    #[serde(default)]
    pub dependency_closure: Option<DependencyClosure>,
    /// Public API surface of the current build.
    #[serde(default)]
    pub api: Option<ApiSurface>,
}

impl Module {
    /// Create an empty module descriptor.
    #[must_use]
    pub fn new(id: ModuleId, kind: ModuleKind) -> Self {
        Self {
            id,
            kind,
            plugins: BTreeSet::new(),
            state: BuildState::default(),
            targets: Vec::new(),
            dependency_closure: None,
            api: None,
        }
    }

    /// Record an applied plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugins.insert(plugin.into());
        self
    }

    /// Add a compilation target.
    #[must_use]
    pub fn with_target(mut self, target: CompilationTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Add a source set.
    #[must_use]
    pub fn with_source_set(mut self, source_set: SourceSet) -> Self {
        self.state.source_sets.push(source_set);
        self
    }

    /// Attach the designated-platform dependency closure.
    #[must_use]
    pub fn with_dependency_closure(mut self, closure: DependencyClosure) -> Self {
        self.dependency_closure = Some(closure);
        self
    }

    /// Attach the current public API surface.
    #[must_use]
    pub fn with_api(mut self, api: ApiSurface) -> Self {
        self.api = Some(api);
        self
    }

    /// Whether the module applied `plugin`.
    #[must_use]
    pub fn has_plugin(&self, plugin: &str) -> bool {
        self.plugins.contains(plugin)
    }

    /// Whether the module compiles for several runtimes.
    #[must_use]
    pub fn is_multiplatform(&self) -> bool {
        self.kind == ModuleKind::Multiplatform
    }

    /// Whether the module is a single-target JVM module.
    #[must_use]
    pub fn is_jvm_only(&self) -> bool {
        self.kind == ModuleKind::JvmOnly
    }

    /// Iterate over targets compiling for `platform`, in declaration order.
    pub fn targets_on(&self, platform: PlatformTag) -> impl Iterator<Item = &CompilationTarget> {
        self.targets
            .iter()
            .filter(move |target| target.platform == platform)
    }
}
