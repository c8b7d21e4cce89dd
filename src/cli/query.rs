//! Query commands (priority, order, suggest, stats)
//!
//! Each command takes one snapshot from the task store and hands it to the
//! scheduling engine.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::output::Output;
use super::task::local_today;
use crate::domain::{
    order_by_dependency, order_by_priority, suggest_top, total_duration, ProductivityStats,
    ScheduledTask, Task,
};
use crate::storage::{Project, TaskStore};

fn snapshot(output: &Output, context: &str) -> Result<(Project, Vec<Task>)> {
    let project = Project::open_current()?;
    output.verbose_ctx(
        context,
        &format!("Opened project at: {}", project.root().display()),
    );

    let tasks = project.task_store().list_tasks()?;
    output.verbose_ctx(context, &format!("Loaded {} tasks", tasks.len()));

    Ok((project, tasks))
}

fn print_schedule(output: &Output, heading: &str, schedule: &[ScheduledTask]) {
    if output.is_json() {
        output.data(&schedule);
    } else if schedule.is_empty() {
        println!("No tasks to schedule.");
    } else {
        println!("{} ({}):", heading, schedule.len());
        for (position, entry) in schedule.iter().enumerate() {
            println!("{:>3}. {:<6} {}", position + 1, entry.id, entry.title);
        }
    }
}

/// Show open tasks by priority and deadline
pub fn priority(output: &Output) -> Result<()> {
    let (_, tasks) = snapshot(output, "priority")?;

    let schedule = order_by_priority(&tasks);
    print_schedule(output, "By priority & deadline", &schedule);

    Ok(())
}

/// Show all tasks in dependency order
pub fn order(output: &Output) -> Result<()> {
    let (_, tasks) = snapshot(output, "order")?;

    match order_by_dependency(&tasks) {
        Ok(schedule) => {
            print_schedule(output, "By dependencies", &schedule);
            Ok(())
        }
        Err(e) => {
            // Machine readers still get a well-formed (empty) listing
            if output.is_json() {
                output.data(&Vec::<ScheduledTask>::new());
            }
            Err(e).context("Cannot schedule tasks by dependency")
        }
    }
}

/// Suggest what to work on today
pub fn suggest(output: &Output, count: Option<usize>, today: Option<NaiveDate>) -> Result<()> {
    let (project, tasks) = snapshot(output, "suggest")?;

    let count = count.unwrap_or(project.config().project.suggest_count);
    let today = today.unwrap_or_else(local_today);
    output.verbose_ctx("suggest", &format!("Scoring for {} (top {})", today, count));

    let suggestions = suggest_top(&tasks, today, count);
    let total_hours = total_duration(&suggestions);

    if output.is_json() {
        output.data(&serde_json::json!({
            "today": today,
            "suggestions": suggestions,
            "total_hours": total_hours,
        }));
    } else if suggestions.is_empty() {
        println!("No tasks to suggest. Everything is done.");
    } else {
        println!("Suggested for {}:", today);
        println!("{:<6} {:>5} {:>6}  TITLE", "ID", "SCORE", "HOURS");
        println!("{}", "-".repeat(50));
        for s in &suggestions {
            println!("{:<6} {:>5} {:>6}  {}", s.id, s.score, s.duration, s.title);
        }
        println!();
        println!("Total estimated time: {} hours", total_hours);
    }

    Ok(())
}

/// Show completion statistics
pub fn stats(output: &Output, today: Option<NaiveDate>) -> Result<()> {
    let (_, tasks) = snapshot(output, "stats")?;

    let today = today.unwrap_or_else(local_today);
    let stats = ProductivityStats::compute(&tasks, today);

    if output.is_json() {
        output.data(&stats);
    } else {
        println!("Productivity ({})", today);
        println!("{}", "=".repeat(40));
        println!();
        println!("Tasks: {} total, {} done", stats.total, stats.completed);
        println!("  Due today:       {}", stats.due_today);
        println!("  Done today:      {}", stats.completed_today);
        println!("  Overdue:         {}", stats.overdue);
        println!();
        println!(
            "Overall completion rate: {:.2}%",
            stats.overall_completion_rate * 100.0
        );
        println!(
            "Today's completion rate: {:.2}%",
            stats.daily_completion_rate * 100.0
        );
    }

    Ok(())
}
