//! Productivity statistics over a task snapshot

use chrono::NaiveDate;
use serde::Serialize;

use super::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityStats {
    pub total: usize,
    pub completed: usize,
    pub due_today: usize,
    pub completed_today: usize,
    /// Open tasks whose deadline has passed
    pub overdue: usize,
    /// Completed share of all tasks, 0.0 when there are none
    pub overall_completion_rate: f64,
    /// Completed share of tasks due today, 0.0 when none are due
    pub daily_completion_rate: f64,
}

impl ProductivityStats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let due_today = tasks.iter().filter(|t| t.deadline == today).count();
        let completed_today = tasks
            .iter()
            .filter(|t| t.deadline == today && t.completed)
            .count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();

        Self {
            total,
            completed,
            due_today,
            completed_today,
            overdue,
            overall_completion_rate: ratio(completed, total),
            daily_completion_rate: ratio(completed_today, due_today),
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
