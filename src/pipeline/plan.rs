//! Dependency graph and wave planning.
//!
//! A task depends on another when it reads a resource the other writes.
//! Two tasks writing the same resource are ordered by declaration. The
//! plan layers the graph into waves (Kahn): every task of a wave only
//! depends on tasks of earlier waves.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{PipelineError, Task, TaskId};

/// Immediate dependencies and dependents per task.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    /// Declaration order.
    order: Vec<TaskId>,
    deps: BTreeMap<TaskId, BTreeSet<TaskId>>,
    dependents: BTreeMap<TaskId, BTreeSet<TaskId>>,
}

impl TaskGraph {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let order: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        let mut deps: BTreeMap<TaskId, BTreeSet<TaskId>> =
            order.iter().map(|id| (*id, BTreeSet::new())).collect();
        let mut dependents = deps.clone();

        for (j, later) in tasks.iter().enumerate() {
            for (i, other) in tasks.iter().enumerate() {
                if i == j {
                    continue;
                }
                let reads_output = later.reads.iter().any(|r| other.writes.contains(r));
                let same_write = i < j && later.writes.iter().any(|w| other.writes.contains(w));
                if reads_output || same_write {
                    deps.entry(later.id).or_default().insert(other.id);
                    dependents.entry(other.id).or_default().insert(later.id);
                }
            }
        }

        Self {
            order,
            deps,
            dependents,
        }
    }

    pub fn tasks(&self) -> &[TaskId] {
        &self.order
    }

    pub fn dependents_of(&self, id: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.dependents.get(&id).into_iter().flatten().copied()
    }

    /// `roots` plus everything that transitively depends on them.
    pub fn with_dependents(&self, roots: impl IntoIterator<Item = TaskId>) -> BTreeSet<TaskId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<TaskId> = roots.into_iter().collect();
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(self.dependents_of(id));
            }
        }
        seen
    }

    /// Kahn layering. Ties inside a wave keep declaration order.
    fn layers(&self) -> Result<Vec<Vec<TaskId>>, PipelineError> {
        let mut indegree: BTreeMap<TaskId, usize> = self
            .order
            .iter()
            .map(|id| (*id, self.deps.get(id).map_or(0, BTreeSet::len)))
            .collect();
        let mut waves = Vec::new();
        let mut placed = 0;

        loop {
            let ready: Vec<TaskId> = self
                .order
                .iter()
                .copied()
                .filter(|id| indegree.get(id) == Some(&0))
                .collect();
            if ready.is_empty() {
                break;
            }
            for id in &ready {
                indegree.remove(id);
                for dependent in self.dependents_of(*id) {
                    if let Some(n) = indegree.get_mut(&dependent) {
                        *n -= 1;
                    }
                }
            }
            placed += ready.len();
            waves.push(ready);
        }

        if placed != self.order.len() {
            let stuck = self
                .order
                .iter()
                .copied()
                .filter(|id| indegree.contains_key(id))
                .collect();
            return Err(PipelineError::Cycle(stuck));
        }
        Ok(waves)
    }
}

/// Ordered waves of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    waves: Vec<Vec<TaskId>>,
}

impl Plan {
    /// Plan every task of `graph`.
    ///
    /// Sequential plans put each task in its own wave, in topological
    /// order (declaration order where the graph allows it).
    pub fn build(graph: &TaskGraph, parallel: bool) -> Result<Self, PipelineError> {
        let layers = graph.layers()?;
        let waves = if parallel {
            layers
        } else {
            layers.into_iter().flatten().map(|id| vec![id]).collect()
        };
        Ok(Self { waves })
    }

    pub fn waves(&self) -> &[Vec<TaskId>] {
        &self.waves
    }

    /// Keep only `selected` tasks, dropping emptied waves.
    pub fn restrict(&self, selected: &BTreeSet<TaskId>) -> Self {
        let waves = self
            .waves
            .iter()
            .map(|wave| {
                wave.iter()
                    .copied()
                    .filter(|id| selected.contains(id))
                    .collect::<Vec<_>>()
            })
            .filter(|wave| !wave.is_empty())
            .collect();
        Self { waves }
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

/// `[styles, scripts] -> [cachebust]`
impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let waves: Vec<String> = self
            .waves
            .iter()
            .map(|wave| {
                let names: Vec<&str> = wave.iter().map(|t| t.name()).collect();
                format!("[{}]", names.join(", "))
            })
            .collect();
        f.write_str(&waves.join(" -> "))
    }
}
