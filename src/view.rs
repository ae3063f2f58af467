//! View projection of the task collection.
//!
//! The controller calls [`CollectionObserver::collection_changed`] after each
//! successful mutation; observers render from the slice they are handed and
//! never reach back into the repository.

use std::cell::RefCell;

use serde::Serialize;

use crate::task::{Status, Task};

pub trait CollectionObserver {
    fn collection_changed(&self, tasks: &[Task]);
}

/// Counts shown in the task board header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Mean progress across all tasks, rounded down
    pub average_progress: u8,
}

impl BoardSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut summary = BoardSummary {
            total: tasks.len(),
            ..BoardSummary::default()
        };
        let mut progress_sum = 0u64;
        for task in tasks {
            match task.status {
                Status::Todo => summary.todo += 1,
                Status::InProgress => summary.in_progress += 1,
                Status::Completed => summary.completed += 1,
            }
            progress_sum += u64::from(task.progress);
        }
        if !tasks.is_empty() {
            summary.average_progress = (progress_sum / tasks.len() as u64) as u8;
        }
        summary
    }
}

/// Observer that keeps the latest rendered board
#[derive(Debug, Default)]
pub struct TaskBoard {
    summary: RefCell<Option<BoardSummary>>,
    refreshes: RefCell<usize>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary from the latest refresh, if any happened
    pub fn summary(&self) -> Option<BoardSummary> {
        *self.summary.borrow()
    }

    pub fn refreshes(&self) -> usize {
        *self.refreshes.borrow()
    }
}

impl CollectionObserver for TaskBoard {
    fn collection_changed(&self, tasks: &[Task]) {
        *self.summary.borrow_mut() = Some(BoardSummary::from_tasks(tasks));
        *self.refreshes.borrow_mut() += 1;
    }
}

/// One line per task for terminal listings
pub fn task_line(task: &Task) -> String {
    let marker = match task.status {
        Status::Todo => "[ ]",
        Status::InProgress => "[~]",
        Status::Completed => "[x]",
    };
    format!(
        "{marker} {} {} ({}, {}, {}%)",
        short_id(task),
        task.title,
        task.category,
        task.priority,
        task.progress
    )
}

/// First eight characters of the id
pub fn short_id(task: &Task) -> &str {
    let id = task.id.as_str();
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
