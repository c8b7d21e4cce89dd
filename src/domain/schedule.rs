//! Scheduling engine
//!
//! Three pure functions over a snapshot of tasks:
//!
//! - [`order_by_priority`] - open tasks by priority, then deadline, then id
//! - [`order_by_dependency`] - all tasks in dependency order, failing on cycles
//! - [`suggest_top`] - the best open tasks to work on today
//!
//! None of them mutate the snapshot or touch storage. Callers take one
//! snapshot from the task store and hand the same slice to each function.

use std::cmp::{Ordering, Reverse};

use chrono::NaiveDate;
use serde::Serialize;

use super::graph::{DependencyGraph, GraphError};
use super::id::TaskId;
use super::task::{completion_map, Task};

/// Number of suggestions returned when the caller has no preference
pub const DEFAULT_SUGGESTIONS: usize = 5;

/// Score penalty per unfinished prerequisite
const UNMET_DEPENDENCY_PENALTY: i64 = 3;

/// Deadlines closer than this many days start adding urgency
const URGENCY_WINDOW_DAYS: i64 = 5;

/// A task placed in an ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub title: String,
}

impl From<&Task> for ScheduledTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
        }
    }
}

/// A scored recommendation for today
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub score: i64,
    pub id: TaskId,
    pub title: String,
    /// Estimated hours
    pub duration: f64,
}

/// Orders open tasks by priority (high first), deadline (early first), then id
pub fn order_by_priority(tasks: &[Task]) -> Vec<ScheduledTask> {
    let mut open: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    open.sort_by_key(|t| (Reverse(t.priority), t.deadline, t.id));

    tracing::debug!(open = open.len(), total = tasks.len(), "ordered tasks by priority");

    open.into_iter().map(ScheduledTask::from).collect()
}

/// Orders every task so that prerequisites come before the tasks that need them
///
/// Completed tasks are included. Dependencies on unknown ids are ignored.
/// Any cycle, including a task that lists itself, fails the whole call; no
/// partial ordering is produced.
pub fn order_by_dependency(tasks: &[Task]) -> Result<Vec<ScheduledTask>, GraphError> {
    let graph = DependencyGraph::from_tasks(tasks);
    tracing::debug!(
        tasks = graph.len(),
        edges = graph.edge_count(),
        "built dependency graph"
    );

    let order = graph.topological_order()?;

    let by_id: std::collections::HashMap<TaskId, &Task> =
        tasks.iter().map(|t| (t.id, t)).collect();

    Ok(order
        .into_iter()
        .filter_map(|id| by_id.get(&id).map(|t| ScheduledTask::from(*t)))
        .collect())
}

/// Scores one task for "do today" ranking
///
/// `priority * 2 + max(0, 5 - days_left) - 3 * unmet`, where `unmet` counts
/// prerequisites that exist in `tasks` and are still open. Overdue tasks keep
/// gaining urgency the longer they are late.
pub fn score_task(task: &Task, tasks: &[Task], today: NaiveDate) -> i64 {
    let completion = completion_map(tasks);
    score_with(task, &completion, today)
}

fn score_with(
    task: &Task,
    completion: &std::collections::HashMap<TaskId, bool>,
    today: NaiveDate,
) -> i64 {
    let importance = i64::from(task.priority) * 2;
    let urgency = (URGENCY_WINDOW_DAYS - task.days_left(today)).max(0);
    let unmet = task.unmet_dependencies(completion).count() as i64;

    importance + urgency - UNMET_DEPENDENCY_PENALTY * unmet
}

/// Returns up to `k` open tasks with the highest scores
///
/// Sorted by score descending; equal scores go to the lower id.
pub fn suggest_top(tasks: &[Task], today: NaiveDate, k: usize) -> Vec<Suggestion> {
    let completion = completion_map(tasks);

    let mut scored: Vec<Suggestion> = tasks
        .iter()
        .filter(|t| !t.completed)
        .map(|t| Suggestion {
            score: score_with(t, &completion, today),
            id: t.id,
            title: t.title.clone(),
            duration: t.duration,
        })
        .collect();

    scored.sort_by(compare_suggestions);
    scored.truncate(k);

    tracing::debug!(returned = scored.len(), limit = k, %today, "scored suggestions");

    scored
}

fn compare_suggestions(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

/// Total estimated hours of a set of suggestions
pub fn total_duration(suggestions: &[Suggestion]) -> f64 {
    suggestions.iter().map(|s| s.duration).sum()
}
