//! Build task graph with dependency-ordered execution.
//!
//! Each assembly task depends on the compilation tasks of the targets it
//! merges. Tasks run in topological order; a task whose dependency did not
//! succeed is skipped rather than run, so a failed compilation surfaces as a
//! blocked assembly instead of a partial artifact.

use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use thiserror::Error;
use trellis_common::ModuleId;

/// Identifier of a build task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    /// Compilation of one target of a module.
    Compile {
        /// Owning module.
        module: ModuleId,
        /// Target name.
        target: String,
    },
    /// Assembly of a module's merged artifact.
    Assemble {
        /// Owning module.
        module: ModuleId,
    },
}

impl TaskId {
    /// Compilation task for `target` of `module`.
    #[must_use]
    pub fn compile(module: &ModuleId, target: impl Into<String>) -> Self {
        Self::Compile {
            module: module.clone(),
            target: target.into(),
        }
    }

    /// Assembly task of `module`.
    #[must_use]
    pub fn assemble(module: &ModuleId) -> Self {
        Self::Assemble {
            module: module.clone(),
        }
    }

    /// Module owning the task.
    #[must_use]
    pub fn module(&self) -> &ModuleId {
        match self {
            Self::Compile { module, .. } | Self::Assemble { module } => module,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile { module, target } => write!(f, "{module}:compile-{target}"),
            Self::Assemble { module } => write!(f, "{module}:assemble"),
        }
    }
}

/// Errors describing a malformed task graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskGraphError {
    /// The same task was added twice.
    #[error("task {task} is registered more than once")]
    DuplicateTask {
        /// Repeated task.
        task: TaskId,
    },

    /// A task depends on a task that was never added.
    #[error("task {task} depends on unknown task {dependency}")]
    UnknownDependency {
        /// Dependent task.
        task: TaskId,
        /// Missing dependency.
        dependency: TaskId,
    },

    /// The dependencies form a cycle.
    #[error("task dependencies form a cycle through {}", join(.remaining))]
    Cycle {
        /// Tasks that could not be ordered.
        remaining: Vec<TaskId>,
    },
}

fn join(tasks: &[TaskId]) -> String {
    tasks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Final state of a task after [`TaskGraph::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task ran and succeeded.
    Succeeded,
    /// The task ran and failed.
    Failed {
        /// Failure description.
        reason: String,
    },
    /// The task did not run because a dependency did not succeed.
    Skipped {
        /// First dependency that did not succeed.
        blocked_by: TaskId,
    },
}

#[derive(Debug, Clone)]
struct TaskNode {
    id: TaskId,
    dependencies: Vec<TaskId>,
}

/// A set of tasks and the dependencies between them.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: Vec<TaskNode>,
    positions: HashMap<TaskId, usize>,
}

impl TaskGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `task` depending on `dependencies`.
    ///
    /// Dependencies may be added after their dependents; they are resolved
    /// when the graph is ordered.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGraphError::DuplicateTask`] if `task` is already present.
    pub fn add_task(
        &mut self,
        task: TaskId,
        dependencies: impl IntoIterator<Item = TaskId>,
    ) -> Result<(), TaskGraphError> {
        if self.positions.contains_key(&task) {
            return Err(TaskGraphError::DuplicateTask { task });
        }
        self.positions.insert(task.clone(), self.nodes.len());
        self.nodes.push(TaskNode {
            id: task,
            dependencies: dependencies.into_iter().collect(),
        });
        Ok(())
    }

    /// Whether `task` is part of the graph.
    #[must_use]
    pub fn contains(&self, task: &TaskId) -> bool {
        self.positions.contains_key(task)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tasks in dependency order, ties broken by insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGraphError::UnknownDependency`] for dangling edges and
    /// [`TaskGraphError::Cycle`] when no order exists.
    pub fn execution_order(&self) -> Result<Vec<&TaskId>, TaskGraphError> {
        let mut in_degree = vec![0_usize; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for (position, node) in self.nodes.iter().enumerate() {
            for dependency in &node.dependencies {
                let Some(&upstream) = self.positions.get(dependency) else {
                    return Err(TaskGraphError::UnknownDependency {
                        task: node.id.clone(),
                        dependency: dependency.clone(),
                    });
                };
                if let Some(list) = dependents.get_mut(upstream) {
                    list.push(position);
                }
                if let Some(degree) = in_degree.get_mut(position) {
                    *degree += 1;
                }
            }
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(position, _)| position)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(position) = queue.pop_front() {
            order.push(position);
            for &dependent in dependents.get(position).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let remaining = self
                .nodes
                .iter()
                .zip(&in_degree)
                .filter(|(_, degree)| **degree > 0)
                .map(|(node, _)| node.id.clone())
                .collect();
            return Err(TaskGraphError::Cycle { remaining });
        }

        Ok(order
            .into_iter()
            .filter_map(|position| self.nodes.get(position).map(|node| &node.id))
            .collect())
    }

    /// Run every task in dependency order.
    ///
    /// `execute` is called only for tasks whose dependencies all succeeded;
    /// it returns `Err(reason)` to mark the task failed.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskGraphError`] if the graph cannot be ordered. Task
    /// failures are reported in the [`TaskReport`], not as errors.
    pub fn run<F>(&self, mut execute: F) -> Result<TaskReport, TaskGraphError>
    where
        F: FnMut(&TaskId) -> Result<(), String>,
    {
        let order = self.execution_order()?;
        let mut statuses: HashMap<&TaskId, TaskStatus> = HashMap::with_capacity(order.len());
        let mut outcomes = Vec::with_capacity(order.len());

        for task in order {
            let blocked_by = self
                .dependencies_of(task)
                .find(|dependency| !matches!(statuses.get(dependency), Some(TaskStatus::Succeeded)));

            let status = if let Some(blocker) = blocked_by {
                debug!("skipping {task}: {blocker} did not succeed");
                TaskStatus::Skipped {
                    blocked_by: blocker.clone(),
                }
            } else {
                match execute(task) {
                    Ok(()) => TaskStatus::Succeeded,
                    Err(reason) => {
                        warn!("task {task} failed: {reason}");
                        TaskStatus::Failed { reason }
                    }
                }
            };

            statuses.insert(task, status.clone());
            outcomes.push((task.clone(), status));
        }

        Ok(TaskReport { outcomes })
    }

    fn dependencies_of(&self, task: &TaskId) -> impl Iterator<Item = &TaskId> {
        self.positions
            .get(task)
            .and_then(|&position| self.nodes.get(position))
            .into_iter()
            .flat_map(|node| node.dependencies.iter())
    }
}

/// Per-task results of a [`TaskGraph::run`], in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskReport {
    outcomes: Vec<(TaskId, TaskStatus)>,
}

impl TaskReport {
    /// Every task with its final status.
    #[must_use]
    pub fn outcomes(&self) -> &[(TaskId, TaskStatus)] {
        &self.outcomes
    }

    /// Status of `task`, if it was part of the run.
    #[must_use]
    pub fn status_of(&self, task: &TaskId) -> Option<&TaskStatus> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == task)
            .map(|(_, status)| status)
    }

    /// Number of failed tasks.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, TaskStatus::Failed { .. }))
    }

    /// Number of skipped tasks.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|status| matches!(status, TaskStatus::Skipped { .. }))
    }

    /// Whether every task succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, status)| *status == TaskStatus::Succeeded)
    }

    fn count(&self, predicate: impl Fn(&TaskStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, status)| predicate(status))
            .count()
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (task, status) in &self.outcomes {
            match status {
                TaskStatus::Succeeded => writeln!(f, "{task}: ok")?,
                TaskStatus::Failed { reason } => writeln!(f, "{task}: FAILED ({reason})")?,
                TaskStatus::Skipped { blocked_by } => {
                    writeln!(f, "{task}: skipped (blocked by {blocked_by})")?;
                }
            }
        }
        Ok(())
    }
}
