//! # Storage Layer
//!
//! Task persistence and project configuration for the planner.
//!
//! The scheduling engine never reads storage itself. Callers take a snapshot
//! through [`TaskStore::list_tasks`] and pass it to the engine functions.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.planner/tasks.jsonl` |
//! | Config | TOML | `.planner/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`JsonlStore`] uses file locking (`fs2`) for concurrent access
//! - Full rewrites are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .planner/
//! ├── tasks.jsonl           # All tasks in JSONL format
//! ├── config.toml           # Project configuration
//! └── .gitignore
//! ```

mod jsonl;
mod config;
mod project;

use anyhow::Result;

use crate::domain::Task;

pub use jsonl::{JsonlStore, NewTask, StoreError};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{Project, ProjectError};

/// Read access to the full set of tasks
pub trait TaskStore {
    /// Returns a snapshot of every task, sorted by id
    fn list_tasks(&self) -> Result<Vec<Task>>;
}

/// A task store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
}

impl MemoryStore {
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut tasks: Vec<Task> = tasks.into_iter().collect();
        tasks.sort_by_key(|t| t.id);
        Self { tasks }
    }

    /// Inserts or replaces a task by id
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.binary_search_by_key(&task.id, |t| t.id) {
            Ok(idx) => self.tasks[idx] = task,
            Err(idx) => self.tasks.insert(idx, task),
        }
    }
}

impl TaskStore for MemoryStore {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.clone())
    }
}
