//! Task domain model
//!
//! Tasks are the units of work the planner orders and scores. Each carries an
//! effort estimate, a deadline, a priority and a set of prerequisite tasks.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::TaskId;

/// Lowest accepted priority
pub const MIN_PRIORITY: u8 = 1;

/// Highest accepted priority
pub const MAX_PRIORITY: u8 = 5;

/// A task as held by the task store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Estimated effort in hours
    #[serde(default)]
    pub duration: f64,

    /// Due date
    pub deadline: NaiveDate,

    /// Importance, higher is more important
    pub priority: u8,

    /// Tasks that must complete before this one
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dependencies: BTreeSet<TaskId>,

    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates an incomplete task with no dependencies and zero duration
    pub fn new(id: TaskId, title: impl Into<String>, deadline: NaiveDate, priority: u8) -> Self {
        Self {
            id,
            title: title.into(),
            duration: 0.0,
            deadline,
            priority,
            dependencies: BTreeSet::new(),
            completed: false,
        }
    }

    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration = hours;
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies.extend(deps);
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Marks the task as done
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Marks the task as not done
    pub fn reopen(&mut self) {
        self.completed = false;
    }

    /// Adds a dependency, returning false if it was already present
    pub fn add_dependency(&mut self, task_id: TaskId) -> bool {
        self.dependencies.insert(task_id)
    }

    /// Removes a dependency, returning false if it was not present
    pub fn remove_dependency(&mut self, task_id: &TaskId) -> bool {
        self.dependencies.remove(task_id)
    }

    /// Whole days until the deadline; negative once overdue
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// Returns true if the deadline has passed and the task is still open
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline < today
    }

    /// Dependencies that point at a known task which is not yet completed
    ///
    /// `completion` maps every known task to its completed flag. Unknown ids
    /// never block.
    pub fn unmet_dependencies<'a>(
        &'a self,
        completion: &'a HashMap<TaskId, bool>,
    ) -> impl Iterator<Item = TaskId> + 'a {
        self.dependencies
            .iter()
            .copied()
            .filter(move |dep| matches!(completion.get(dep), Some(false)))
    }

    /// Returns true if this task is open and every known dependency is done
    pub fn is_ready(&self, completion: &HashMap<TaskId, bool>) -> bool {
        !self.completed && self.unmet_dependencies(completion).next().is_none()
    }

    /// Returns true if this task is open and waits on at least one known dependency
    pub fn is_blocked(&self, completion: &HashMap<TaskId, bool>) -> bool {
        !self.completed && self.unmet_dependencies(completion).next().is_some()
    }
}

/// Builds the id -> completed lookup used by readiness and scoring
pub fn completion_map(tasks: &[Task]) -> HashMap<TaskId, bool> {
    tasks.iter().map(|t| (t.id, t.completed)).collect()
}

/// Parses a comma-separated dependency list such as `"1, 2,#3"`
///
/// Tokens that are not task ids are skipped rather than rejected, so a stray
/// separator or label in user input does not lose the valid ids around it.
pub fn parse_dependency_list(input: &str) -> BTreeSet<TaskId> {
    input
        .split(',')
        .filter_map(|token| token.parse::<TaskId>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: u32) -> Task {
        Task::new(TaskId::new(id), format!("Task {}", id), date(2024, 3, 10), 3)
    }

    #[test]
    fn new_task_is_open() {
        let t = task(1);
        assert!(!t.completed);
        assert!(t.dependencies.is_empty());
        assert_eq!(t.duration, 0.0);
    }

    #[test]
    fn complete_and_reopen() {
        let mut t = task(1);
        t.complete();
        assert!(t.completed);
        t.reopen();
        assert!(!t.completed);
    }

    #[test]
    fn dependency_edits_report_changes() {
        let mut t = task(1);
        assert!(t.add_dependency(TaskId::new(2)));
        assert!(!t.add_dependency(TaskId::new(2)));
        assert!(t.remove_dependency(&TaskId::new(2)));
        assert!(!t.remove_dependency(&TaskId::new(2)));
    }

    #[test]
    fn days_left_can_be_negative() {
        let t = task(1);
        assert_eq!(t.days_left(date(2024, 3, 10)), 0);
        assert_eq!(t.days_left(date(2024, 3, 7)), 3);
        assert_eq!(t.days_left(date(2024, 3, 20)), -10);
        assert!(t.is_overdue(date(2024, 3, 11)));
        assert!(!t.is_overdue(date(2024, 3, 10)));
    }

    #[test]
    fn unknown_dependencies_never_block() {
        let first = task(1);
        let second = task(2).with_dependencies([TaskId::new(1), TaskId::new(99)]);
        let tasks = vec![first, second.clone()];

        let completion = completion_map(&tasks);
        let unmet: Vec<_> = second.unmet_dependencies(&completion).collect();
        assert_eq!(unmet, vec![TaskId::new(1)]);
        assert!(second.is_blocked(&completion));

        let tasks = vec![task(1).completed(), second.clone()];
        let completion = completion_map(&tasks);
        assert!(second.is_ready(&completion));
    }

    #[test]
    fn completed_tasks_are_neither_ready_nor_blocked() {
        let t = task(1).with_dependencies([TaskId::new(2)]).completed();
        let tasks = vec![t.clone(), task(2)];
        let completion = completion_map(&tasks);

        assert!(!t.is_ready(&completion));
        assert!(!t.is_blocked(&completion));
    }

    #[test]
    fn parse_dependency_list_skips_junk() {
        let deps = parse_dependency_list("1, 2,x,,#5, 3.5");
        let expected: BTreeSet<_> = [1, 2, 5].into_iter().map(TaskId::new).collect();
        assert_eq!(deps, expected);
        assert!(parse_dependency_list("").is_empty());
    }

    #[test]
    fn serde_uses_plain_fields() {
        let t = task(4).with_duration(1.5).with_dependencies([TaskId::new(2)]);
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["id"], 4);
        assert_eq!(json["deadline"], "2024-03-10");
        assert_eq!(json["dependencies"], serde_json::json!([2]));

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"id":1,"title":"Read","deadline":"2024-01-02","priority":2}"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert!(t.dependencies.is_empty());
        assert!(!t.completed);
        assert_eq!(t.duration, 0.0);
    }
}
