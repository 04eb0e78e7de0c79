//! Public API surface descriptions.
//!
//! A module's current public symbols arrive as an [`ApiSurface`]; a recorded
//! baseline is stored as an [`ApiSnapshot`]. Both are flat lists of
//! [`ApiSymbol`]s keyed by package and symbol name.

use crate::module::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity of a symbol across builds: its package and declared name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolKey {
    /// Dot-separated package name.
    pub package: String,
    /// Symbol name including parameter list, such as `foo()`.
    pub name: String,
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// One public declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSymbol {
    /// Dot-separated package name.
    pub package: String,
    /// Symbol name including parameter list.
    pub name: String,
    /// Full binary signature; any difference counts as a change.
    pub signature: String,
    /// Fully qualified annotations carried by the declaration.
    #[serde(default)]
    pub annotations: BTreeSet<String>,
}

impl ApiSymbol {
    /// Create a symbol without annotations.
    #[must_use]
    pub fn new(
        package: impl Into<String>,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            signature: signature.into(),
            annotations: BTreeSet::new(),
        }
    }

    /// Add an annotation. A leading `@` is dropped.
    #[must_use]
    pub fn annotated(mut self, annotation: &str) -> Self {
        self.annotations.insert(normalise_annotation(annotation));
        self
    }

    /// Return the symbol's identity.
    #[must_use]
    pub fn key(&self) -> SymbolKey {
        SymbolKey {
            package: self.package.clone(),
            name: self.name.clone(),
        }
    }

    /// Whether the symbol carries `annotation` (with or without a leading `@`).
    #[must_use]
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations
            .iter()
            .any(|candidate| normalise_annotation(candidate) == normalise_annotation(annotation))
    }
}

/// Strip the `@` sigil and surrounding whitespace from an annotation name.
#[must_use]
pub fn normalise_annotation(annotation: &str) -> String {
    annotation.trim().trim_start_matches('@').to_owned()
}

/// The public symbols of one module in the current build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSurface {
    /// Public declarations.
    #[serde(default)]
    pub symbols: Vec<ApiSymbol>,
}

impl ApiSurface {
    /// Create a surface from symbols.
    #[must_use]
    pub fn new(symbols: Vec<ApiSymbol>) -> Self {
        Self { symbols }
    }
}

/// A recorded baseline of a module's public symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSnapshot {
    /// Module the snapshot was recorded for.
    pub module: ModuleId,
    /// Recorded declarations, sorted by key.
    pub symbols: Vec<ApiSymbol>,
}

impl ApiSnapshot {
    /// Create a snapshot, sorting symbols by key so recordings are stable.
    #[must_use]
    pub fn new(module: ModuleId, mut symbols: Vec<ApiSymbol>) -> Self {
        symbols.sort_by_key(ApiSymbol::key);
        Self { module, symbols }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_ignore_sigil() {
        let symbol = ApiSymbol::new("api", "foo()", "fun foo(): Unit").annotated("@Internal");
        assert!(symbol.has_annotation("Internal"));
        assert!(symbol.has_annotation("@Internal"));
        assert!(!symbol.has_annotation("Experimental"));
    }

    #[test]
    fn key_display_joins_package_and_name() {
        let symbol = ApiSymbol::new("net.example", "foo()", "sig");
        assert_eq!(symbol.key().to_string(), "net.example.foo()");

        let root = ApiSymbol::new("", "bar()", "sig");
        assert_eq!(root.key().to_string(), "bar()");
    }

    #[test]
    fn snapshot_sorts_symbols() {
        let module = ModuleId::new("api").expect("valid id");
        let snapshot = ApiSnapshot::new(
            module,
            vec![
                ApiSymbol::new("b", "z()", "sig"),
                ApiSymbol::new("a", "y()", "sig"),
            ],
        );
        let packages: Vec<&str> = snapshot
            .symbols
            .iter()
            .map(|symbol| symbol.package.as_str())
            .collect();
        assert_eq!(packages, vec!["a", "b"]);
    }
}
