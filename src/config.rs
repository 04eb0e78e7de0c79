//! Project-wide configuration loaded from `trellis.toml`.
//!
//! `ProjectConfig` captures everything the orchestrator needs to know about
//! the project as a whole: coordinates stamped onto every module, the
//! designated platform for merged artifacts, the values written by the
//! built-in aspects, which aspects may fail without aborting configuration,
//! and the API gate and documentation policies. Every table is optional and
//! falls back to the build's baseline, so an absent file yields a usable
//! configuration.

use camino::Utf8Path;
use log::debug;
use serde::Deserialize;
use std::io;
use thiserror::Error;
use trellis_aspects::{
    AspectError, AspectSettings, DEFAULT_COMPILER_FLAGS, DEFAULT_ENCODING, DEFAULT_OPT_INS,
    DEFAULT_RUNTIME_TARGET,
};
use trellis_common::{ModelError, ModuleId, PlatformTag};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "trellis.toml";

/// Version stamped onto modules when none is configured.
pub const UNSPECIFIED_VERSION: &str = "unspecified";

/// Errors raised while loading or interpreting project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid TOML or has unknown keys.
    #[error("invalid configuration{}: {source}", location(.path.as_deref()))]
    Parse {
        /// Path of the configuration file, when parsed from disk.
        path: Option<String>,
        /// Parser failure.
        #[source]
        source: toml::de::Error,
    },

    /// A module name in the configuration is malformed.
    #[error("invalid module name in [{section}]: {source}")]
    InvalidModule {
        /// Table the name appeared in.
        section: &'static str,
        /// Validation failure.
        #[source]
        source: ModelError,
    },

    /// The runtime or compiler tables hold unusable values.
    #[error("invalid aspect settings: {0}")]
    InvalidSettings(#[from] AspectError),

    /// The project version is blank.
    #[error("project version must not be blank")]
    BlankVersion,
}

fn location(path: Option<&str>) -> String {
    path.map(|path| format!(" in {path}")).unwrap_or_default()
}

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Project configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Group stamped onto every module. Blank means "no group".
    pub group: String,
    /// Version stamped onto every module and used in artifact names.
    pub version: String,
    /// Platform whose outputs are merged into deployable artifacts.
    pub designated_platform: PlatformTag,
    /// Runtime settings for the built-in aspects.
    pub runtime: RuntimeConfig,
    /// Compiler settings for the built-in aspects.
    pub compiler: CompilerConfig,
    /// Aspect tolerance overrides.
    pub aspects: AspectsConfig,
    /// API compatibility gate.
    pub api: ApiConfig,
    /// Documentation generator policy.
    pub docs: DocsConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            group: String::new(),
            version: UNSPECIFIED_VERSION.to_owned(),
            designated_platform: PlatformTag::Jvm,
            runtime: RuntimeConfig::default(),
            compiler: CompilerConfig::default(),
            aspects: AspectsConfig::default(),
            api: ApiConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

/// Runtime target and source encoding.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Runtime target version for JVM-family compilations.
    pub target: String,
    /// Source file encoding.
    pub encoding: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_RUNTIME_TARGET.to_owned(),
            encoding: DEFAULT_ENCODING.to_owned(),
        }
    }
}

/// Compiler flags and opt-in annotations.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Flags added to every compilation target.
    pub flags: Vec<String>,
    /// Opt-in annotations added to every source set.
    pub opt_ins: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            flags: owned(DEFAULT_COMPILER_FLAGS),
            opt_ins: owned(DEFAULT_OPT_INS),
        }
    }
}

/// Which aspects may fail without aborting configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AspectsConfig {
    /// Names of optional aspects; every other aspect is required.
    pub optional: Vec<String>,
}

impl Default for AspectsConfig {
    fn default() -> Self {
        Self {
            optional: vec!["unit-coercion".to_owned()],
        }
    }
}

/// API compatibility gate settings.
///
/// The gate ignores every module unless it is listed in `allow`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Modules subjected to the gate.
    pub allow: Vec<String>,
    /// Package patterns excluded from the gate and from documentation.
    pub ignored_packages: Vec<String>,
    /// Annotations that mark a declaration as non-public.
    pub non_public_markers: Vec<String>,
}

/// Documentation generator settings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Modules that generate documentation.
    pub modules: Vec<String>,
    /// Packages suppressed in documentation only.
    pub suppressed_packages: Vec<String>,
    /// Regular expression of packages whose deprecated members are skipped.
    pub skip_deprecated: Option<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|&value| value.to_owned()).collect()
}

fn module_ids(section: &'static str, names: &[String]) -> Result<Vec<ModuleId>> {
    names
        .iter()
        .map(|name| {
            ModuleId::new(name.as_str())
                .map_err(|source| ConfigError::InvalidModule { section, source })
        })
        .collect()
}

impl ProjectConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file exists but cannot be read
    /// and [`ConfigError::Parse`] when its contents are invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use trellis::ProjectConfig;
    ///
    /// let config = ProjectConfig::load_from(Utf8Path::new("does/not/exist.toml"))?;
    /// assert_eq!(config, ProjectConfig::default());
    /// # Ok::<(), trellis::ConfigError>(())
    /// ```
    pub fn load_from(path: &Utf8Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no configuration at {path}; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_string(),
                    source,
                });
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: Some(path.to_string()),
            source,
        })
    }

    /// Load configuration using the supplied loader.
    ///
    /// This exists so tests can simulate the file system without touching it.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use trellis::ProjectConfig;
    ///
    /// let config = ProjectConfig::load_with(Utf8Path::new("trellis.toml"), |_| {
    ///     Ok(ProjectConfig::default())
    /// })?;
    /// assert_eq!(config.version, "unspecified");
    /// # Ok::<(), trellis::ConfigError>(())
    /// ```
    pub fn load_with<F>(path: &Utf8Path, loader: F) -> Result<Self>
    where
        F: FnOnce(&Utf8Path) -> Result<Self>,
    {
        loader(path)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the string is invalid.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Check values the type system cannot: module names, the version, and
    /// aspect settings.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::BlankVersion);
        }
        self.allowed_modules()?;
        self.documented_modules()?;
        self.aspect_settings()?;
        Ok(())
    }

    /// The group to stamp onto modules, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        let group = self.group.trim();
        (!group.is_empty()).then_some(group)
    }

    /// Modules subjected to the API gate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidModule`] for a malformed name.
    pub fn allowed_modules(&self) -> Result<Vec<ModuleId>> {
        module_ids("api", &self.api.allow)
    }

    /// Modules that generate documentation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidModule`] for a malformed name.
    pub fn documented_modules(&self) -> Result<Vec<ModuleId>> {
        module_ids("docs", &self.docs.modules)
    }

    /// Validated settings for the built-in aspects.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSettings`] when a runtime or compiler
    /// value is rejected.
    pub fn aspect_settings(&self) -> Result<AspectSettings> {
        Ok(AspectSettings::new(
            self.runtime.target.as_str(),
            self.runtime.encoding.as_str(),
            self.compiler.flags.clone(),
            self.compiler.opt_ins.clone(),
        )?)
    }
}
