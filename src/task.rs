//! Task records and the values that describe them.
//!
//! Tasks are persisted as one JSON array under the `tasks` key. Field names
//! are camelCase on disk (`createdAt`, `updatedAt`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TasksConfig;
use crate::error::{Error, Result};

/// Opaque task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Study,
    Assignment,
    #[serde(rename = "Exam Prep")]
    ExamPrep,
    Reading,
    Project,
    Research,
    Review,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Study,
        Category::Assignment,
        Category::ExamPrep,
        Category::Reading,
        Category::Project,
        Category::Research,
        Category::Review,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Study => "Study",
            Category::Assignment => "Assignment",
            Category::ExamPrep => "Exam Prep",
            Category::Reading => "Reading",
            Category::Project => "Project",
            Category::Research => "Research",
            Category::Review => "Review",
            Category::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn id(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Display color, as a hex string
    pub fn color(self) -> &'static str {
        match self {
            Priority::High => "#ef4444",
            Priority::Medium => "#f59e0b",
            Priority::Low => "#10b981",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Completed];

    pub fn id(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

/// Lowercase and drop separators so "Exam Prep", "exam-prep" and "exam_prep"
/// compare equal.
fn normalize_choice(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn choice_list(labels: impl Iterator<Item = &'static str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_choice(s);
        Category::ALL
            .into_iter()
            .find(|category| normalize_choice(category.label()) == wanted)
            .ok_or_else(|| {
                Error::validation(
                    "category",
                    format!(
                        "'{}' (expected one of: {})",
                        s.trim(),
                        choice_list(Category::ALL.iter().map(|c| c.label()))
                    ),
                )
            })
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_choice(s);
        Priority::ALL
            .into_iter()
            .find(|priority| priority.id() == wanted)
            .ok_or_else(|| {
                Error::validation(
                    "priority",
                    format!(
                        "'{}' (expected one of: {})",
                        s.trim(),
                        choice_list(Priority::ALL.iter().map(|p| p.id()))
                    ),
                )
            })
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_choice(s);
        Status::ALL
            .into_iter()
            .find(|status| {
                normalize_choice(status.id()) == wanted || normalize_choice(status.label()) == wanted
            })
            .ok_or_else(|| {
                Error::validation(
                    "status",
                    format!(
                        "'{}' (expected one of: {})",
                        s.trim(),
                        choice_list(Status::ALL.iter().map(|st| st.id()))
                    ),
                )
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, category: Category, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: None,
            category,
            priority,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update; `None` leaves a field untouched.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub progress: Option<u8>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.progress.is_none()
    }
}

/// Length limits applied to titles and descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLimits {
    pub max_tasks: usize,
    pub max_title_length: usize,
    pub max_description_length: usize,
}

impl Default for TaskLimits {
    fn default() -> Self {
        Self::from(&TasksConfig::default())
    }
}

impl From<&TasksConfig> for TaskLimits {
    fn from(config: &TasksConfig) -> Self {
        Self {
            max_tasks: config.max_tasks,
            max_title_length: config.max_title_length,
            max_description_length: config.max_description_length,
        }
    }
}

impl TaskLimits {
    /// Trimmed title, or a validation error
    pub fn check_title(&self, title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("title", "cannot be empty"));
        }
        let len = title.chars().count();
        if len > self.max_title_length {
            return Err(Error::validation(
                "title",
                format!(
                    "{len} characters exceeds the limit of {}",
                    self.max_title_length
                ),
            ));
        }
        Ok(title.to_string())
    }

    /// Trimmed description; blank descriptions become `None`
    pub fn check_description(&self, description: Option<&str>) -> Result<Option<String>> {
        let Some(description) = description.map(str::trim) else {
            return Ok(None);
        };
        if description.is_empty() {
            return Ok(None);
        }
        let len = description.chars().count();
        if len > self.max_description_length {
            return Err(Error::validation(
                "description",
                format!(
                    "{len} characters exceeds the limit of {}",
                    self.max_description_length
                ),
            ));
        }
        Ok(Some(description.to_string()))
    }
}

pub fn check_progress(progress: u8) -> Result<u8> {
    if progress > 100 {
        return Err(Error::validation(
            "progress",
            format!("{progress} is outside 0..=100"),
        ));
    }
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_labels_and_slugs() {
        assert_eq!("Exam Prep".parse::<Category>().unwrap(), Category::ExamPrep);
        assert_eq!("exam-prep".parse::<Category>().unwrap(), Category::ExamPrep);
        assert_eq!("READING".parse::<Category>().unwrap(), Category::Reading);
        assert!(matches!(
            "Exam".parse::<Category>(),
            Err(Error::Validation { field: "category", .. })
        ));
    }

    #[test]
    fn status_parses_ids_and_labels() {
        assert_eq!("To Do".parse::<Status>().unwrap(), Status::Todo);
        assert_eq!("todo".parse::<Status>().unwrap(), Status::Todo);
        assert_eq!("in_progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("In Progress".parse::<Status>().unwrap(), Status::InProgress);
        assert!("pending".parse::<Status>().is_err());
    }

    #[test]
    fn priority_colors() {
        assert_eq!(Priority::High.color(), "#ef4444");
        assert_eq!(Priority::Medium.color(), "#f59e0b");
        assert_eq!(Priority::Low.color(), "#10b981");
        assert_eq!("Medium".parse::<Priority>().unwrap(), Priority::Medium);
    }

    #[test]
    fn task_serializes_camel_case() {
        let now = Utc::now();
        let task = Task {
            id: TaskId::from("abc"),
            title: "Read Ch.1".to_string(),
            description: None,
            category: Category::ExamPrep,
            priority: Priority::Medium,
            status: Status::InProgress,
            progress: 40,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["category"], "Exam Prep");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["status"], "in_progress");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn title_limits_count_characters() {
        let limits = TaskLimits::default();
        assert_eq!(limits.check_title("  Read  ").unwrap(), "Read");
        assert!(limits.check_title("   ").is_err());
        assert!(limits.check_title(&"é".repeat(100)).is_ok());
        assert!(limits.check_title(&"é".repeat(101)).is_err());
    }

    #[test]
    fn description_limits() {
        let limits = TaskLimits::default();
        assert_eq!(limits.check_description(None).unwrap(), None);
        assert_eq!(limits.check_description(Some("  ")).unwrap(), None);
        assert_eq!(
            limits.check_description(Some(" notes ")).unwrap(),
            Some("notes".to_string())
        );
        assert!(limits.check_description(Some(&"x".repeat(1001))).is_err());
    }

    #[test]
    fn progress_bounds() {
        assert_eq!(check_progress(0).unwrap(), 0);
        assert_eq!(check_progress(100).unwrap(), 100);
        assert!(check_progress(101).is_err());
    }

    #[test]
    fn task_ids_are_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }
}
