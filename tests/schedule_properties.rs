//! Property tests for the scheduling engine

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use study_planner::domain::{score_task, GraphError};
use study_planner::{order_by_dependency, order_by_priority, suggest_top, Task, TaskId};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// (priority, deadline offset in days, completed, candidate dependency picks)
type TaskSeed = (u8, u64, bool, Vec<usize>);

fn seed_strategy() -> impl Strategy<Value = Vec<TaskSeed>> {
    prop::collection::vec(
        (
            1u8..=5,
            0u64..60,
            any::<bool>(),
            prop::collection::vec(any::<usize>(), 0..3),
        ),
        0..25,
    )
}

/// Builds tasks 1..=n where every dependency points at a lower id
fn acyclic_tasks(seeds: &[TaskSeed]) -> Vec<Task> {
    seeds
        .iter()
        .enumerate()
        .map(|(index, (priority, offset, completed, picks))| {
            let id = TaskId::new(index as u32 + 1);
            let deadline = base_date() + Days::new(*offset);
            let deps: Vec<TaskId> = if index == 0 {
                Vec::new()
            } else {
                picks
                    .iter()
                    .map(|pick| TaskId::new((pick % index) as u32 + 1))
                    .collect()
            };

            let mut task = Task::new(id, format!("Task {}", id), deadline, *priority)
                .with_duration(*offset as f64 / 4.0)
                .with_dependencies(deps);
            if *completed {
                task.complete();
            }
            task
        })
        .collect()
}

proptest! {
    #[test]
    fn priority_order_lists_open_tasks_sorted(seeds in seed_strategy()) {
        let tasks = acyclic_tasks(&seeds);
        let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

        let schedule = order_by_priority(&tasks);

        let open = tasks.iter().filter(|t| !t.completed).count();
        prop_assert_eq!(schedule.len(), open);
        prop_assert!(schedule.iter().all(|s| !by_id[&s.id].completed));

        let keys: Vec<_> = schedule
            .iter()
            .map(|s| {
                let task = by_id[&s.id];
                (Reverse(task.priority), task.deadline, task.id)
            })
            .collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn dependency_order_respects_every_edge(seeds in seed_strategy()) {
        let tasks = acyclic_tasks(&seeds);

        let schedule = order_by_dependency(&tasks).unwrap();
        prop_assert_eq!(schedule.len(), tasks.len());

        let position: HashMap<TaskId, usize> = schedule
            .iter()
            .enumerate()
            .map(|(pos, s)| (s.id, pos))
            .collect();
        for task in &tasks {
            for dep in &task.dependencies {
                prop_assert!(position[dep] < position[&task.id]);
            }
        }
    }

    #[test]
    fn back_edge_to_ancestor_is_a_cycle(seeds in seed_strategy(), pick in any::<usize>()) {
        let mut tasks = acyclic_tasks(&seeds);
        prop_assume!(!tasks.is_empty());

        // Find any task with a prerequisite and make that prerequisite wait on it
        let with_dep = tasks.iter().position(|t| !t.dependencies.is_empty());
        match with_dep {
            Some(index) => {
                let task_id = tasks[index].id;
                let deps: Vec<TaskId> = tasks[index].dependencies.iter().copied().collect();
                let target = deps[pick % deps.len()];
                let upstream = tasks.iter_mut().find(|t| t.id == target).unwrap();
                upstream.add_dependency(task_id);
            }
            None => {
                let index = pick % tasks.len();
                let id = tasks[index].id;
                tasks[index].add_dependency(id);
            }
        }

        let result = order_by_dependency(&tasks);
        prop_assert!(matches!(result, Err(GraphError::CycleDetected(ref ids)) if !ids.is_empty()));
    }

    #[test]
    fn suggestions_are_bounded_open_and_ranked(
        seeds in seed_strategy(),
        today_offset in 0u64..60,
        k in 0usize..10,
    ) {
        let tasks = acyclic_tasks(&seeds);
        let today = base_date() + Days::new(today_offset);
        let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

        let suggestions = suggest_top(&tasks, today, k);

        let open = tasks.iter().filter(|t| !t.completed).count();
        prop_assert_eq!(suggestions.len(), k.min(open));
        for s in &suggestions {
            let task = by_id[&s.id];
            prop_assert!(!task.completed);
            prop_assert_eq!(s.score, score_task(task, &tasks, today));
        }
        let ranked = suggestions.windows(2).all(|pair| {
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].id < pair[1].id)
        });
        prop_assert!(ranked);
    }

    #[test]
    fn queries_are_repeatable(seeds in seed_strategy(), today_offset in 0u64..60) {
        let tasks = acyclic_tasks(&seeds);
        let today = base_date() + Days::new(today_offset);

        prop_assert_eq!(order_by_priority(&tasks), order_by_priority(&tasks));
        prop_assert_eq!(order_by_dependency(&tasks), order_by_dependency(&tasks));
        prop_assert_eq!(suggest_top(&tasks, today, 5), suggest_top(&tasks, today, 5));
    }
}
