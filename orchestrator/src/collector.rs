//! Phase one: collecting module descriptors as modules become ready.
//!
//! Every module configures itself independently and then hands its
//! descriptor to the collector through a [`ReadySignal`]. Only once every
//! declared module has signalled does orchestration begin, and only
//! [`ReadyModule`] values, which the collector alone can create, are accepted
//! by the configurator. A module can therefore never be orchestrated before
//! its own configuration has finished.

use crate::error::{OrchestratorError, Result};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{self, Receiver, Sender};
use trellis_common::{Module, ModuleId};

/// A module whose own configuration has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyModule(Module);

impl ReadyModule {
    /// The module's identifier.
    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.0.id
    }

    /// Borrow the descriptor.
    #[must_use]
    pub fn module(&self) -> &Module {
        &self.0
    }

    /// Take ownership of the descriptor.
    #[must_use]
    pub fn into_module(self) -> Module {
        self.0
    }
}

/// Sending half handed to modules so they can report completion.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    sender: Sender<Module>,
}

impl ReadySignal {
    /// Report that `module` has finished configuring itself.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::CollectorClosed`] if the collector has
    /// already been dropped.
    pub fn module_ready(&self, module: Module) -> Result<()> {
        trace!("module {} signalled ready", module.id);
        self.sender
            .send(module)
            .map_err(|err| OrchestratorError::CollectorClosed { module: err.0.id })
    }
}

/// Receiving half that gathers ready modules in declaration order.
#[derive(Debug)]
pub struct ModuleCollector {
    declared: Vec<ModuleId>,
    receiver: Receiver<Module>,
}

impl ModuleCollector {
    /// Create a collector expecting exactly the `declared` modules.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::DuplicateModule`] if a name is declared
    /// twice.
    pub fn new(declared: Vec<ModuleId>) -> Result<(Self, ReadySignal)> {
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = declared.iter().find(|id| !seen.insert(*id)) {
            return Err(OrchestratorError::DuplicateModule {
                module: duplicate.clone(),
            });
        }

        let (sender, receiver) = mpsc::channel();
        Ok((Self { declared, receiver }, ReadySignal { sender }))
    }

    /// Block until every [`ReadySignal`] has been dropped, then return the
    /// ready modules in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if a module signals twice, signals without being
    /// declared, or never signals at all.
    pub fn collect(self) -> Result<Vec<ReadyModule>> {
        let declared: BTreeSet<&ModuleId> = self.declared.iter().collect();
        let mut ready = BTreeMap::new();

        for module in self.receiver {
            if !declared.contains(&module.id) {
                return Err(OrchestratorError::UndeclaredModule { module: module.id });
            }
            if ready.contains_key(&module.id) {
                return Err(OrchestratorError::DuplicateReady { module: module.id });
            }
            debug!("module {} is ready", module.id);
            ready.insert(module.id.clone(), module);
        }

        self.declared
            .into_iter()
            .map(|id| {
                ready
                    .remove(&id)
                    .map(ReadyModule)
                    .ok_or(OrchestratorError::ModuleNotReady { module: id })
            })
            .collect()
    }
}

/// Collect already-configured descriptors, letting each module signal from
/// its own thread.
///
/// Declaration order is the order of `modules`.
///
/// # Errors
///
/// Returns an error if two descriptors share a name.
pub fn collect_descriptors(modules: Vec<Module>) -> Result<Vec<ReadyModule>> {
    let declared = modules.iter().map(|module| module.id.clone()).collect();
    let (collector, signal) = ModuleCollector::new(declared)?;

    std::thread::scope(|scope| {
        let handles: Vec<_> = modules
            .into_iter()
            .map(|module| {
                let signal = signal.clone();
                scope.spawn(move || signal.module_ready(module))
            })
            .collect();
        drop(signal);
        handles.into_iter().try_for_each(|handle| {
            handle
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    })?;

    collector.collect()
}
