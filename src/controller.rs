//! Task lifecycle controller.
//!
//! Entry point for everything that changes tasks. It owns the repository,
//! and after every successful mutation it refreshes the registered views and
//! sends a notification. It never touches storage itself.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::notify::{Notification, NotificationSink};
use crate::repository::TaskRepository;
use crate::task::{Status, Task, TaskDraft, TaskId, TaskPatch};
use crate::view::CollectionObserver;

/// Typed task action, as raised by list items and shortcuts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Edit { id: TaskId, patch: TaskPatch },
    Delete { id: TaskId },
    Toggle { id: TaskId },
}

/// Result of a dispatched [`TaskAction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Updated(Task),
    Deleted { id: TaskId, removed: bool },
}

pub struct TaskController {
    repo: TaskRepository,
    sink: Rc<dyn NotificationSink>,
    observers: Vec<Rc<dyn CollectionObserver>>,
}

impl TaskController {
    pub fn new(repo: TaskRepository, sink: Rc<dyn NotificationSink>) -> Self {
        Self {
            repo,
            sink,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Rc<dyn CollectionObserver>) {
        self.observers.push(observer);
    }

    pub fn repository(&self) -> &TaskRepository {
        &self.repo
    }

    pub fn tasks(&self) -> &[Task] {
        self.repo.tasks()
    }

    pub fn create(&mut self, draft: TaskDraft) -> Result<Task> {
        let result = self.repo.add(draft);
        let task = self.report(result)?;
        self.after_mutation(Notification::success(format!("Task \"{}\" created", task.title)));
        Ok(task)
    }

    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        if patch.is_empty() {
            return self.report(Err(Error::InvalidArgument(
                "nothing to update".to_string(),
            )));
        }
        let result = self.repo.update(id, patch);
        let task = self.report(result)?;
        self.after_mutation(Notification::success(format!("Task \"{}\" updated", task.title)));
        Ok(task)
    }

    /// Delete a task; deleting an unknown id succeeds without changes
    pub fn delete(&mut self, id: &TaskId) -> bool {
        let removed = self.repo.remove(id);
        let notification = if removed {
            Notification::success("Task deleted")
        } else {
            Notification::info(format!("No task {id}; nothing deleted"))
        };
        self.after_mutation(notification);
        removed
    }

    /// Flip a task between completed and to-do
    ///
    /// Progress is left alone.
    pub fn toggle(&mut self, id: &TaskId) -> Result<Task> {
        let current = match self.repo.get(id) {
            Some(task) => task.status,
            None => return self.report(Err(Error::NotFound(id.to_string()))),
        };
        let next = if current == Status::Completed {
            Status::Todo
        } else {
            Status::Completed
        };
        let result = self.repo.update(id, TaskPatch::status(next));
        let task = self.report(result)?;
        let message = if next == Status::Completed {
            format!("Task \"{}\" completed", task.title)
        } else {
            format!("Task \"{}\" reopened", task.title)
        };
        self.after_mutation(Notification::success(message));
        Ok(task)
    }

    pub fn dispatch(&mut self, action: TaskAction) -> Result<ActionOutcome> {
        match action {
            TaskAction::Edit { id, patch } => self.update(&id, patch).map(ActionOutcome::Updated),
            TaskAction::Delete { id } => {
                let removed = self.delete(&id);
                Ok(ActionOutcome::Deleted { id, removed })
            }
            TaskAction::Toggle { id } => self.toggle(&id).map(ActionOutcome::Updated),
        }
    }

    fn after_mutation(&self, notification: Notification) {
        for observer in &self.observers {
            observer.collection_changed(self.repo.tasks());
        }
        self.sink.show(notification);
        if self.repo.save_failed() {
            self.sink.show(Notification::warning(
                "Changes could not be saved; they are kept for this session only",
            ));
        }
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.sink.show(Notification::error(err.to_string()));
        }
        result
    }
}
