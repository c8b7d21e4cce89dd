//! Project management
//!
//! Handles project initialization and provides access to the task store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, JsonlStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a planner project. Run 'planner init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# Planner configuration

# Number of tasks shown by 'planner suggest'
suggest_count = 5

# Refuse a new task with the same title and deadline as an existing one
reject_duplicates = true
"#;

/// A planner project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".planner").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let planner_dir = root.join(".planner");

        fs::create_dir_all(&planner_dir).with_context(|| {
            format!("Failed to create .planner directory: {}", planner_dir.display())
        })?;

        let config_path = planner_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = planner_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# Leftovers from interrupted writes\n*.tmp\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .planner directory path
    pub fn planner_dir(&self) -> PathBuf {
        self.root.join(".planner")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the task store, configured from the project settings
    pub fn task_store(&self) -> JsonlStore {
        JsonlStore::for_project(&self.root).reject_duplicates(self.config.project.reject_duplicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TaskStore;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.planner_dir().is_dir());
        assert!(project.planner_dir().join("config.toml").is_file());
        assert!(project.planner_dir().join(".gitignore").is_file());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap(); // Should not fail

        assert!(dir.path().join(".planner").is_dir());
    }

    #[test]
    fn init_writes_parseable_defaults() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().project.suggest_count, 5);
        assert!(project.config().project.reject_duplicates);
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn task_store_lives_in_planner_dir() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let store = project.task_store();
        assert!(store.path().ends_with(".planner/tasks.jsonl"));
        assert!(store.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn task_store_honors_duplicate_setting() {
        use crate::storage::NewTask;
        use chrono::NaiveDate;

        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();
        fs::write(
            dir.path().join(".planner").join("config.toml"),
            "reject_duplicates = false\n",
        )
        .unwrap();

        let project = Project::open(dir.path()).unwrap();
        let store = project.task_store();
        let deadline = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store.add(NewTask::new("Same", deadline, 2)).unwrap();
        store.add(NewTask::new("Same", deadline, 2)).unwrap();

        assert_eq!(store.list_tasks().unwrap().len(), 2);
    }
}
