//! Comparing current API surfaces against recorded snapshots.

use super::error::GateError;
use super::policy::ApiGatePolicy;
use super::snapshot::SnapshotStore;
use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use trellis_common::{ApiSnapshot, ApiSymbol, Module, ModuleId, SymbolKey};

/// How a symbol differs from its recorded baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// The symbol was recorded but is gone.
    Removed {
        /// Recorded signature.
        previous: String,
    },
    /// The symbol is present but its declaration differs.
    Changed {
        /// Recorded signature.
        previous: String,
        /// Current signature.
        current: String,
    },
    /// The symbol is new since the snapshot.
    Added {
        /// Current signature.
        current: String,
    },
}

/// One symbol-level difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolChange {
    /// Module declaring the symbol.
    pub module: ModuleId,
    /// Symbol identity.
    pub key: SymbolKey,
    /// What changed.
    pub kind: ChangeKind,
}

impl SymbolChange {
    /// Whether the change breaks consumers of the recorded API.
    #[must_use]
    pub fn is_breaking(&self) -> bool {
        !matches!(self.kind, ChangeKind::Added { .. })
    }
}

impl fmt::Display for SymbolChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChangeKind::Removed { previous } => write!(f, "- {}: {previous}", self.key),
            ChangeKind::Changed { previous, current } => {
                write!(f, "~ {}: {previous} -> {current}", self.key)
            }
            ChangeKind::Added { current } => write!(f, "+ {}: {current}", self.key),
        }
    }
}

/// Differences between `previous` and `current` symbols of `module`,
/// ordered by symbol key.
#[must_use]
pub fn diff_symbols<'a>(
    module: &ModuleId,
    previous: impl IntoIterator<Item = &'a ApiSymbol>,
    current: impl IntoIterator<Item = &'a ApiSymbol>,
) -> Vec<SymbolChange> {
    let previous: BTreeMap<SymbolKey, &ApiSymbol> =
        previous.into_iter().map(|symbol| (symbol.key(), symbol)).collect();
    let current: BTreeMap<SymbolKey, &ApiSymbol> =
        current.into_iter().map(|symbol| (symbol.key(), symbol)).collect();
    let keys: BTreeSet<&SymbolKey> = previous.keys().chain(current.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let kind = match (previous.get(key), current.get(key)) {
                (Some(before), None) => ChangeKind::Removed {
                    previous: before.signature.clone(),
                },
                (None, Some(after)) => ChangeKind::Added {
                    current: after.signature.clone(),
                },
                (Some(before), Some(after)) if before.signature != after.signature => {
                    ChangeKind::Changed {
                        previous: before.signature.clone(),
                        current: after.signature.clone(),
                    }
                }
                _ => return None,
            };
            Some(SymbolChange {
                module: module.clone(),
                key: key.clone(),
                kind,
            })
        })
        .collect()
}

/// Result of checking one allow-listed module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCheck {
    /// Checked module.
    pub module: ModuleId,
    /// Differences against the snapshot.
    pub changes: Vec<SymbolChange>,
    /// Whether no snapshot was recorded for the module.
    pub missing_snapshot: bool,
}

impl ModuleCheck {
    /// Whether the module passes the gate.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        !self.missing_snapshot && !self.changes.iter().any(SymbolChange::is_breaking)
    }
}

/// Outcome of an API check across the project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateReport {
    modules: Vec<ModuleCheck>,
}

impl GateReport {
    /// Per-module results, in declaration order. Only allow-listed modules
    /// appear.
    #[must_use]
    pub fn modules(&self) -> &[ModuleCheck] {
        &self.modules
    }

    /// Whether every evaluated module passes.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.modules.iter().all(ModuleCheck::is_pass)
    }

    /// Every breaking change across modules.
    pub fn breaking_changes(&self) -> impl Iterator<Item = &SymbolChange> {
        self.modules
            .iter()
            .flat_map(|check| &check.changes)
            .filter(|change| change.is_breaking())
    }
}

impl fmt::Display for GateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.modules {
            if check.missing_snapshot {
                writeln!(
                    f,
                    "{}: no recorded snapshot; run `trellis api-dump` to record one",
                    check.module
                )?;
                continue;
            }
            let breaking = check.changes.iter().filter(|change| change.is_breaking()).count();
            if check.changes.is_empty() {
                writeln!(f, "{}: ok", check.module)?;
            } else {
                writeln!(f, "{}: {breaking} breaking change(s)", check.module)?;
            }
            for change in &check.changes {
                writeln!(f, "  {change}")?;
            }
        }
        write!(f, "{}", if self.is_pass() { "PASS" } else { "FAIL" })
    }
}

/// The API compatibility gate.
pub struct ApiSurfaceGate<'p, S> {
    policy: &'p ApiGatePolicy,
    store: S,
}

impl<'p, S: SnapshotStore> ApiSurfaceGate<'p, S> {
    /// Create a gate applying `policy` with snapshots from `store`.
    #[must_use]
    pub fn new(policy: &'p ApiGatePolicy, store: S) -> Self {
        Self { policy, store }
    }

    /// The policy in force.
    #[must_use]
    pub fn policy(&self) -> &ApiGatePolicy {
        self.policy
    }

    /// Check every allow-listed module of `modules` against its snapshot.
    ///
    /// Modules outside the allow-list are never evaluated and their
    /// snapshots are never read. Excluded symbols are dropped from both the
    /// snapshot and the current surface before comparison.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if a snapshot cannot be read.
    pub fn check(&self, modules: &[Module]) -> Result<GateReport, GateError> {
        self.warn_missing_modules(modules);
        let mut checks = Vec::new();
        for module in self.included(modules) {
            let current = self.current_symbols(module);
            let check = match self.store.load(&module.id)? {
                Some(snapshot) => ModuleCheck {
                    module: module.id.clone(),
                    changes: diff_symbols(
                        &module.id,
                        self.policy.filter_symbols(&module.id, &snapshot.symbols),
                        current.iter().copied(),
                    ),
                    missing_snapshot: false,
                },
                None => ModuleCheck {
                    module: module.id.clone(),
                    changes: Vec::new(),
                    missing_snapshot: true,
                },
            };
            debug!(
                "module {}: {} change(s), pass: {}",
                module.id,
                check.changes.len(),
                check.is_pass()
            );
            checks.push(check);
        }
        let report = GateReport { modules: checks };
        info!(
            "API check evaluated {} module(s): {}",
            report.modules.len(),
            if report.is_pass() { "pass" } else { "fail" }
        );
        Ok(report)
    }

    /// Record filtered snapshots of every allow-listed module of `modules`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if a snapshot cannot be written.
    pub fn dump(&self, modules: &[Module]) -> Result<Vec<ApiSnapshot>, GateError> {
        self.warn_missing_modules(modules);
        self.included(modules)
            .map(|module| {
                let symbols = self
                    .current_symbols(module)
                    .into_iter()
                    .cloned()
                    .collect();
                let snapshot = ApiSnapshot::new(module.id.clone(), symbols);
                self.store.save(&snapshot)?;
                info!(
                    "recorded {} symbol(s) for module {}",
                    snapshot.symbols.len(),
                    module.id
                );
                Ok(snapshot)
            })
            .collect()
    }

    fn included<'m>(&self, modules: &'m [Module]) -> impl Iterator<Item = &'m Module> {
        modules.iter().filter(|module| {
            let included = self.policy.is_module_included(&module.id);
            if !included {
                trace!("module {} is not allow-listed; skipping", module.id);
            }
            included
        })
    }

    fn current_symbols<'m>(&'m self, module: &'m Module) -> Vec<&'m ApiSymbol> {
        module
            .api
            .as_ref()
            .map(|surface| {
                self.policy
                    .filter_symbols(&module.id, &surface.symbols)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn warn_missing_modules(&self, modules: &[Module]) {
        for allowed in self.policy.allowed() {
            if !modules.iter().any(|module| &module.id == allowed) {
                warn!("allow-listed module {allowed} is not part of the build");
            }
        }
    }
}
