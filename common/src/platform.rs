//! Runtime platform tags for compilation targets.
//!
//! A module may compile the same sources for several runtimes. Each
//! compilation target carries exactly one [`PlatformTag`]; artifact assembly
//! picks the targets whose tag equals the project's designated platform.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Textual forms accepted by [`PlatformTag::from_str`], in declaration order.
const SUPPORTED_PLATFORMS: &[&str] = &["common", "jvm", "android-jvm", "js", "native", "wasm"];

/// The runtime a compilation target produces output for.
///
/// # Examples
///
/// ```
/// use trellis_common::PlatformTag;
///
/// let tag: PlatformTag = "android-jvm".parse().expect("known platform");
/// assert!(tag.is_jvm_family());
/// assert_eq!(tag.as_str(), "android-jvm");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformTag {
    /// Platform-independent metadata compilation.
    Common,
    /// The Java virtual machine.
    #[default]
    Jvm,
    /// Android's JVM flavour.
    AndroidJvm,
    /// JavaScript.
    Js,
    /// Native binaries.
    Native,
    /// WebAssembly.
    Wasm,
}

impl PlatformTag {
    /// Return the canonical textual form of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Jvm => "jvm",
            Self::AndroidJvm => "android-jvm",
            Self::Js => "js",
            Self::Native => "native",
            Self::Wasm => "wasm",
        }
    }

    /// Whether the platform runs on a Java virtual machine.
    ///
    /// Runtime-target selection only makes sense for these platforms.
    #[must_use]
    pub const fn is_jvm_family(self) -> bool {
        matches!(self, Self::Jvm | Self::AndroidJvm)
    }

    /// Return every accepted textual form.
    #[must_use]
    pub fn supported() -> &'static [&'static str] {
        SUPPORTED_PLATFORMS
    }
}

impl FromStr for PlatformTag {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "jvm" => Ok(Self::Jvm),
            "android-jvm" | "androidjvm" => Ok(Self::AndroidJvm),
            "js" => Ok(Self::Js),
            "native" => Ok(Self::Native),
            "wasm" => Ok(Self::Wasm),
            _ => Err(ModelError::UnknownPlatform {
                value: value.to_owned(),
                expected: SUPPORTED_PLATFORMS.join(", "),
            }),
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
