//! studyflow task command implementations.

use serde::Serialize;

use crate::app::App;
use crate::error::{Error, Result};
use crate::notify::Notification;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::repository::MIN_SEARCH_LEN;
use crate::task::{Category, Priority, Status, Task, TaskDraft, TaskId, TaskPatch};
use crate::view::{short_id, task_line, BoardSummary};

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub json: bool,
    pub quiet: bool,
}

pub struct UpdateOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub progress: Option<u8>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub id: String,
    pub json: bool,
    pub quiet: bool,
}

pub struct ToggleOptions {
    pub id: String,
    pub json: bool,
    pub quiet: bool,
}

pub struct SearchOptions {
    pub query: String,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    total: usize,
    summary: BoardSummary,
    tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
struct TaskDeleteOutput {
    id: TaskId,
    removed: bool,
}

#[derive(Serialize)]
struct TaskSearchOutput<'a> {
    query: &'a str,
    total: usize,
    tasks: Vec<&'a Task>,
}

pub fn run_add(mut app: App, options: AddOptions) -> Result<()> {
    let category: Category = options.category.parse()?;
    let priority: Priority = options.priority.parse()?;
    let mut draft = TaskDraft::new(options.title, category, priority);
    if let Some(description) = options.description {
        draft = draft.with_description(description);
    }

    let task = app.tasks_mut().create(draft)?;

    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &task);
    human.push_notifications(app.drain_notifications());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task add",
        &task,
        Some(&human),
    )
}

pub fn run_list(app: App, options: ListOptions) -> Result<()> {
    let status = parse_filter::<Status>(options.status.as_deref())?;
    let category = parse_filter::<Category>(options.category.as_deref())?;
    let priority = parse_filter::<Priority>(options.priority.as_deref())?;

    let all = app.tasks().tasks();
    let tasks: Vec<&Task> = all
        .iter()
        .filter(|task| status.map_or(true, |status| task.status == status))
        .filter(|task| category.map_or(true, |category| task.category == category))
        .filter(|task| priority.map_or(true, |priority| task.priority == priority))
        .collect();

    let output = TaskListOutput {
        total: tasks.len(),
        summary: BoardSummary::from_tasks(all),
        tasks,
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", output.total.to_string());
    human.push_summary(
        "Board",
        format!(
            "{} to do, {} in progress, {} completed, {}% average progress",
            output.summary.todo,
            output.summary.in_progress,
            output.summary.completed,
            output.summary.average_progress
        ),
    );
    for task in &output.tasks {
        human.push_row(task_line(task));
    }
    if all.is_empty() {
        human.push_next_step("studyflow task add \"<title>\"");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &output,
        Some(&human),
    )
}

pub fn run_show(app: App, options: ShowOptions) -> Result<()> {
    let repo = app.tasks().repository();
    let id = repo.resolve(&options.id)?;
    let task = repo
        .get(&id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    let mut human = HumanOutput::new(format!("Task {}", short_id(task)));
    push_task_summary(&mut human, task);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        task,
        Some(&human),
    )
}

pub fn run_update(mut app: App, options: UpdateOptions) -> Result<()> {
    let id = app.tasks().repository().resolve(&options.id)?;
    let description = if options.clear_description {
        Some(None)
    } else {
        options.description.map(Some)
    };
    let patch = TaskPatch {
        title: options.title,
        description,
        category: parse_filter(options.category.as_deref())?,
        priority: parse_filter(options.priority.as_deref())?,
        status: parse_filter(options.status.as_deref())?,
        progress: options.progress,
    };

    let task = app.tasks_mut().update(&id, patch)?;

    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &task);
    human.push_notifications(app.drain_notifications());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task update",
        &task,
        Some(&human),
    )
}

pub fn run_delete(mut app: App, options: DeleteOptions) -> Result<()> {
    let id = match app.tasks().repository().resolve(&options.id) {
        Ok(id) => id,
        Err(Error::NotFound(_)) => TaskId::from(options.id.as_str()),
        Err(err) => return Err(err),
    };

    let removed = app.tasks_mut().delete(&id);
    let output = TaskDeleteOutput { id, removed };

    let header = if removed {
        "Task deleted"
    } else {
        "Nothing to delete"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", output.id.to_string());
    human.push_notifications(app.drain_notifications());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task delete",
        &output,
        Some(&human),
    )
}

pub fn run_toggle(mut app: App, options: ToggleOptions) -> Result<()> {
    let id = app.tasks().repository().resolve(&options.id)?;
    let task = app.tasks_mut().toggle(&id)?;

    let mut human = HumanOutput::new(format!("Task {}", task.status));
    push_task_summary(&mut human, &task);
    human.push_notifications(app.drain_notifications());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task toggle",
        &task,
        Some(&human),
    )
}

pub fn run_search(app: App, options: SearchOptions) -> Result<()> {
    let query = options.query.trim();
    let tasks = app.tasks().repository().search(query);

    if query.chars().count() < MIN_SEARCH_LEN {
        app.notify(Notification::warning(format!(
            "Queries shorter than {MIN_SEARCH_LEN} characters match nothing"
        )));
    }

    let mut human = HumanOutput::new(format!("Search: {query}"));
    human.push_summary("Matches", tasks.len().to_string());
    for task in &tasks {
        human.push_row(task_line(task));
    }
    human.push_notifications(app.drain_notifications());

    let output = TaskSearchOutput {
        query,
        total: tasks.len(),
        tasks,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task search",
        &output,
        Some(&human),
    )
}

fn parse_filter<T>(value: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = Error>,
{
    value.map(str::parse).transpose()
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Title", task.title.clone());
    if let Some(description) = task.description.as_deref() {
        human.push_summary("Description", description);
    }
    human.push_summary("Category", task.category.label());
    human.push_summary(
        "Priority",
        format!("{} ({})", task.priority.label(), task.priority.color()),
    );
    human.push_summary("Status", task.status.label());
    human.push_summary("Progress", format!("{}%", task.progress));
    human.push_summary("Created", task.created_at.to_rfc3339());
    human.push_summary("Updated", task.updated_at.to_rfc3339());
}
