//! Domain models for the planner
//!
//! Contains the scheduling engine and task model without any I/O concerns.

mod id;
mod task;
mod graph;
mod schedule;
mod stats;

pub use id::{TaskId, IdError};
pub use task::{completion_map, parse_dependency_list, Task, MAX_PRIORITY, MIN_PRIORITY};
pub use graph::{DependencyGraph, GraphError};
pub use schedule::{
    order_by_dependency, order_by_priority, score_task, suggest_top, total_duration,
    ScheduledTask, Suggestion, DEFAULT_SUGGESTIONS,
};
pub use stats::ProductivityStats;
