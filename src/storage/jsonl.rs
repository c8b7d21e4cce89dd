//! JSONL storage for tasks
//!
//! Tasks are stored in `.planner/tasks.jsonl` with one JSON object per line.
//! A later line for the same id replaces an earlier one, so single-task
//! updates can be appended and compacted on the next full rewrite.
//! Uses file locking for concurrent access safety.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use thiserror::Error;

use super::TaskStore;
use crate::domain::{Task, TaskId, MAX_PRIORITY, MIN_PRIORITY};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Task '{title}' already exists for {deadline}")]
    Duplicate { title: String, deadline: NaiveDate },

    #[error("Priority must be between 1 and 5, got {0}")]
    InvalidPriority(u8),

    #[error("Duration must be a non-negative number of hours, got {0}")]
    InvalidDuration(f64),

    #[error("No task ids left after {0}")]
    IdsExhausted(TaskId),
}

/// Fields for a task that does not have an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub duration: f64,
    pub deadline: NaiveDate,
    pub priority: u8,
    pub dependencies: BTreeSet<TaskId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, deadline: NaiveDate, priority: u8) -> Self {
        Self {
            title: title.into(),
            duration: 0.0,
            deadline,
            priority,
            dependencies: BTreeSet::new(),
        }
    }

    fn validate(&self) -> Result<(), StoreError> {
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(StoreError::InvalidPriority(self.priority));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(StoreError::InvalidDuration(self.duration));
        }
        Ok(())
    }

    fn into_task(self, id: TaskId) -> Task {
        Task::new(id, self.title, self.deadline, self.priority)
            .with_duration(self.duration)
            .with_dependencies(self.dependencies)
    }
}

/// Store for task data in JSONL format
pub struct JsonlStore {
    path: PathBuf,
    reject_duplicates: bool,
}

impl JsonlStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reject_duplicates: true,
        }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".planner").join("tasks.jsonl"))
    }

    /// Sets whether [`add`](Self::add) refuses a second task with the same title and deadline
    pub fn reject_duplicates(mut self, reject: bool) -> Self {
        self.reject_duplicates = reject;
        self
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all tasks from the store
    pub fn read_all(&self) -> Result<BTreeMap<TaskId, Task>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let reader = BufReader::new(&file);
        let mut tasks = BTreeMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            tasks.insert(task.id, task);
        }

        tracing::debug!(count = tasks.len(), path = %self.path.display(), "read task store");

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite)
    pub fn write_all(&self, tasks: &BTreeMap<TaskId, Task>) -> Result<()> {
        self.ensure_parent()?;

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on task store")?;

            let mut writer = BufWriter::new(&file);

            // BTreeMap iterates by id, which keeps diffs stable
            for task in tasks.values() {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single task line
    pub fn append(&self, task: &Task) -> Result<()> {
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .context("Failed to acquire write lock on task store")?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(task).context("Failed to serialize task")?;
        writeln!(writer, "{}", line).context("Failed to write task")?;

        writer.flush().context("Failed to flush task store")?;

        Ok(())
    }

    /// Validates and stores a new task under the next free id
    ///
    /// The id scan and the append take separate locks, so two processes
    /// adding at once can pick the same id; concurrent writers are unsupported.
    pub fn add(&self, new_task: NewTask) -> Result<Task> {
        new_task.validate()?;

        let tasks = self.read_all()?;

        if self.reject_duplicates
            && tasks
                .values()
                .any(|t| t.title == new_task.title && t.deadline == new_task.deadline)
        {
            return Err(StoreError::Duplicate {
                title: new_task.title,
                deadline: new_task.deadline,
            }
            .into());
        }

        let id = match tasks.keys().next_back() {
            Some(&last) => last.next().ok_or(StoreError::IdsExhausted(last))?,
            None => TaskId::new(1),
        };

        let task = new_task.into_task(id);
        self.append(&task)?;

        tracing::debug!(id = %task.id, title = %task.title, "added task");
        Ok(task)
    }

    /// Looks up a single task
    pub fn get(&self, id: TaskId) -> Result<Task> {
        self.read_all()?
            .remove(&id)
            .ok_or_else(|| StoreError::TaskNotFound(id).into())
    }

    /// Updates a single task (reads all, updates, writes all)
    pub fn update(&self, task: &Task) -> Result<()> {
        let mut tasks = self.read_all()?;
        if !tasks.contains_key(&task.id) {
            return Err(StoreError::TaskNotFound(task.id).into());
        }
        tasks.insert(task.id, task.clone());
        self.write_all(&tasks)
    }

    /// Marks a task as completed or not, returning the updated task
    pub fn set_completed(&self, id: TaskId, completed: bool) -> Result<Task> {
        let mut tasks = self.read_all()?;
        let task = tasks.get_mut(&id).ok_or(StoreError::TaskNotFound(id))?;

        if completed {
            task.complete();
        } else {
            task.reopen();
        }
        let updated = task.clone();

        self.write_all(&tasks)?;
        Ok(updated)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl TaskStore for JsonlStore {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.read_all()?.into_values().collect())
    }
}
