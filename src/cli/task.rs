//! Task CLI commands

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{
    completion_map, order_by_dependency, parse_dependency_list, score_task, DependencyGraph,
    Task, TaskId,
};
use crate::storage::{NewTask, Project, StoreError, TaskStore};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   planner task add "Read chapter 3" --deadline 2024-05-01 --priority 4
    ///   planner task add "Write summary" --duration 1.5 --deps 1,2
    Add {
        /// Task title
        title: String,

        /// Due date (YYYY-MM-DD, defaults to today)
        #[arg(long, short)]
        deadline: Option<NaiveDate>,

        /// Estimated effort in hours
        #[arg(long, default_value_t = 0.0)]
        duration: f64,

        /// Priority from 1 (low) to 5 (high)
        #[arg(
            long,
            short,
            default_value_t = 1,
            value_parser = clap::value_parser!(u8).range(1..=5)
        )]
        priority: u8,

        /// Comma-separated IDs of tasks that must be done first
        #[arg(long, default_value = "")]
        deps: String,
    },

    /// List all tasks
    List,

    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Mark task as done
    Done {
        /// Task ID
        id: TaskId,
    },

    /// Mark task as not done
    Reopen {
        /// Task ID
        id: TaskId,
    },

    /// Add a dependency between tasks
    Dep {
        /// Task that will wait
        task: TaskId,

        /// Task that must be completed first
        depends_on: TaskId,
    },

    /// Remove a dependency
    Undep {
        /// Task to unblock
        task: TaskId,

        /// Dependency to remove
        depends_on: TaskId,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            deadline,
            duration,
            priority,
            deps,
        } => {
            let mut new_task =
                NewTask::new(title, deadline.unwrap_or_else(local_today), priority);
            new_task.duration = duration;
            new_task.dependencies = parse_dependency_list(&deps);
            add_task(output, new_task)
        }
        TaskCommands::List => list_tasks(output),
        TaskCommands::Show { id } => show_task(output, id),
        TaskCommands::Done { id } => set_completed(output, id, true),
        TaskCommands::Reopen { id } => set_completed(output, id, false),
        TaskCommands::Dep { task, depends_on } => add_dependency(output, task, depends_on),
        TaskCommands::Undep { task, depends_on } => remove_dependency(output, task, depends_on),
    }
}

pub(crate) fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn add_task(output: &Output, new_task: NewTask) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task = store.add(new_task)?;
    output.verbose_ctx("task", &format!("Stored task {} in {}", task.id, store.path().display()));

    let tasks = store.list_tasks()?;
    let unknown: Vec<TaskId> = task
        .dependencies
        .iter()
        .copied()
        .filter(|dep| !tasks.iter().any(|t| t.id == *dep))
        .collect();
    if !unknown.is_empty() {
        output.verbose_ctx(
            "task",
            &format!("Ignoring unknown dependencies for scheduling: {:?}", unknown),
        );
    }

    // A dependency on a not-yet-created id can close a loop once that id exists
    if let Err(e) = order_by_dependency(&tasks) {
        output.warning(&e.to_string());
    }

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Created task: {} - {}", task.id, task.title));
    }

    Ok(())
}

fn list_tasks(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().list_tasks()?;

    if output.is_json() {
        output.data(&tasks);
    } else if tasks.is_empty() {
        println!("No tasks");
    } else {
        println!(
            "{:<6} {:<8} {:<4} {:<12} {:>6}  TITLE",
            "ID", "STATUS", "PRI", "DEADLINE", "HOURS"
        );
        println!("{}", "-".repeat(70));

        for task in &tasks {
            let status = if task.completed { "done" } else { "todo" };
            let mut line = format!(
                "{:<6} {:<8} {:<4} {:<12} {:>6}  {}",
                task.id,
                status,
                task.priority,
                task.deadline.to_string(),
                task.duration,
                task.title
            );
            if !task.dependencies.is_empty() {
                line.push_str(&format!("  (after {})", join(&task.dependencies)));
            }
            println!("{}", line);
        }
    }

    Ok(())
}

fn show_task(output: &Output, id: TaskId) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().list_tasks()?;

    let task = tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or(StoreError::TaskNotFound(id))?;

    let completion = completion_map(&tasks);
    let is_ready = task.is_ready(&completion);
    let is_blocked = task.is_blocked(&completion);
    let today = local_today();
    let score = (!task.completed).then(|| score_task(task, &tasks, today));

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "duration": task.duration,
            "deadline": task.deadline,
            "priority": task.priority,
            "dependencies": task.dependencies,
            "completed": task.completed,
            "is_ready": is_ready,
            "is_blocked": is_blocked,
            "days_left": task.days_left(today),
            "score": score,
        }));
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        println!("Completed: {}", if task.completed { "yes" } else { "no" });
        println!("Priority: {}", task.priority);
        println!("Deadline: {} ({} days left)", task.deadline, task.days_left(today));
        println!("Estimated: {}h", task.duration);

        if !task.dependencies.is_empty() {
            println!("\nDepends on:");
            for dep in &task.dependencies {
                let dep_status = match completion.get(dep) {
                    Some(true) => "done",
                    Some(false) => "todo",
                    None => "unknown",
                };
                println!("  {} ({})", dep, dep_status);
            }
        }

        println!();
        if let Some(score) = score {
            println!("Score today: {}", score);
        }
        if is_ready {
            println!("Status: READY (all dependencies complete)");
        } else if is_blocked {
            println!("Status: BLOCKED (waiting on dependencies)");
        }
    }

    Ok(())
}

fn set_completed(output: &Output, id: TaskId, completed: bool) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task = store.set_completed(id, completed)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "completed": task.completed,
        }));
    } else if completed {
        output.success(&format!("Completed task: {}", task.id));
    } else {
        output.success(&format!("Reopened task: {}", task.id));
    }

    Ok(())
}

fn add_dependency(output: &Output, task_id: TaskId, depends_on: TaskId) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let mut tasks = store.read_all()?;

    // Verify both tasks exist
    if !tasks.contains_key(&task_id) {
        return Err(StoreError::TaskNotFound(task_id).into());
    }
    if !tasks.contains_key(&depends_on) {
        anyhow::bail!("Dependency task not found: {}", depends_on);
    }

    // Check for cycles using the graph
    let mut graph = DependencyGraph::from_tasks(tasks.values());
    graph.try_add_dependency(task_id, depends_on)?;

    let task: &mut Task = tasks
        .get_mut(&task_id)
        .ok_or(StoreError::TaskNotFound(task_id))?;
    task.add_dependency(depends_on);
    store.write_all(&tasks)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "depends_on": depends_on,
        }));
    } else {
        output.success(&format!("{} now depends on {}", task_id, depends_on));
    }

    Ok(())
}

fn remove_dependency(output: &Output, task_id: TaskId, depends_on: TaskId) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let mut task = store.get(task_id)?;

    if !task.remove_dependency(&depends_on) {
        output.verbose_ctx(
            "task",
            &format!("{} did not depend on {}", task_id, depends_on),
        );
    }
    store.update(&task)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "removed_dependency": depends_on,
        }));
    } else {
        output.success(&format!(
            "Removed dependency: {} no longer depends on {}",
            task_id, depends_on
        ));
    }

    Ok(())
}

fn join(ids: &std::collections::BTreeSet<TaskId>) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
