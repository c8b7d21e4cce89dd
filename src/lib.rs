//! Study Planner - a local-first task planner
//!
//! The planner keeps tasks with deadlines, priorities, effort estimates and
//! prerequisites. The engine in [`domain`] orders a snapshot of them and
//! picks what to work on today; [`storage`] persists them per project.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{
    order_by_dependency, order_by_priority, suggest_top, GraphError, ScheduledTask, Suggestion,
    Task, TaskId,
};
pub use storage::{JsonlStore, MemoryStore, TaskStore};
