//! Dependency graph for tasks
//!
//! Each task is a node and each dependency `d` of task `t` is an edge
//! `d -> t` ("d must be done before t"). Dependencies on ids that are not in
//! the snapshot are dropped when the graph is built and never create nodes.
//!
//! Ordering uses Kahn's algorithm. Among nodes that are free at the same
//! time, the smallest id is emitted first; callers should treat that
//! tie-break as an implementation detail.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use thiserror::Error;

use super::id::TaskId;
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Cycle detected in dependencies among tasks: {}", join_ids(.0))]
    CycleDetected(Vec<TaskId>),
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default, Clone)]
struct Node {
    /// Incoming edges: tasks this node waits on
    dependencies: BTreeSet<TaskId>,
    /// Outgoing edges: tasks waiting on this node
    dependents: BTreeSet<TaskId>,
}

/// A dependency graph over one snapshot of tasks
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    nodes: BTreeMap<TaskId, Node>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a collection of tasks
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::new();

        // First pass: add all nodes
        let tasks: Vec<_> = tasks.into_iter().collect();
        for task in &tasks {
            graph.add_task(task.id);
        }

        // Second pass: add edges whose source is a known node
        for task in &tasks {
            for dep_id in &task.dependencies {
                graph.add_edge(*dep_id, task.id);
            }
        }

        graph
    }

    /// Adds a task to the graph
    pub fn add_task(&mut self, task_id: TaskId) {
        self.nodes.entry(task_id).or_default();
    }

    /// Adds the edge `depends_on -> task`, ignoring it if either end is unknown
    ///
    /// Returns true if the edge was added. A task depending on itself is
    /// recorded as a self-loop so that ordering reports it as a cycle.
    pub fn add_edge(&mut self, depends_on: TaskId, task: TaskId) -> bool {
        if !self.nodes.contains_key(&depends_on) || !self.nodes.contains_key(&task) {
            return false;
        }

        if let Some(node) = self.nodes.get_mut(&depends_on) {
            node.dependents.insert(task);
        }
        if let Some(node) = self.nodes.get_mut(&task) {
            node.dependencies.insert(depends_on);
        }
        true
    }

    /// Adds a dependency edge only if it keeps the graph acyclic
    ///
    /// On rejection the graph is unchanged and the error lists the tasks on
    /// the would-be cycle, starting from `task`.
    pub fn try_add_dependency(
        &mut self,
        task: TaskId,
        depends_on: TaskId,
    ) -> Result<bool, GraphError> {
        if task == depends_on {
            return Err(GraphError::CycleDetected(vec![task]));
        }

        // The new edge closes a loop iff `depends_on` is already downstream of `task`
        if let Some(path) = self.path(task, depends_on) {
            return Err(GraphError::CycleDetected(path));
        }

        Ok(self.add_edge(depends_on, task))
    }

    /// Finds a path `from -> ... -> to` along dependency edges
    fn path(&self, from: TaskId, to: TaskId) -> Option<Vec<TaskId>> {
        let mut stack = vec![(from, vec![from])];
        let mut seen = BTreeSet::new();

        while let Some((current, trail)) = stack.pop() {
            if current == to {
                return Some(trail);
            }
            if !seen.insert(current) {
                continue;
            }
            for next in self.dependents(&current) {
                let mut next_trail = trail.clone();
                next_trail.push(next);
                stack.push((next, next_trail));
            }
        }

        None
    }

    /// Returns the direct dependencies of a task
    pub fn dependencies(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.nodes
            .get(task_id)
            .map(|node| node.dependencies.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the direct dependents of a task (tasks that depend on it)
    pub fn dependents(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.nodes
            .get(task_id)
            .map(|node| node.dependents.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns all tasks in topological order (dependencies before dependents)
    pub fn topological_order(&self) -> Result<Vec<TaskId>, GraphError> {
        let mut in_degree: BTreeMap<TaskId, usize> = self
            .nodes
            .iter()
            .map(|(id, node)| (*id, node.dependencies.len()))
            .collect();

        let mut ready: BinaryHeap<Reverse<TaskId>> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| Reverse(id))
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(Reverse(id)) = ready.pop() {
            sorted.push(id);
            for dependent in self.dependents(&id) {
                if let Some(deg) = in_degree.get_mut(&dependent) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let unresolved: Vec<TaskId> = in_degree
                .into_iter()
                .filter(|(_, deg)| *deg > 0)
                .map(|(id, _)| id)
                .collect();
            tracing::warn!(
                tasks = %join_ids(&unresolved),
                "cycle detected in task dependencies"
            );
            return Err(GraphError::CycleDetected(unresolved));
        }

        Ok(sorted)
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.nodes.contains_key(task_id)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.dependents.len()).sum()
    }
}
