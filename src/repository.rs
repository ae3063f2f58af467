//! Task repository: the in-memory collection and its persisted snapshot.
//!
//! The collection is ordered newest-first. Every mutation rewrites the whole
//! `tasks` key, so the stored value is always a complete collection. When the
//! store rejects a write the in-memory collection stays authoritative and
//! [`TaskRepository::save_failed`] reports it; the next mutation tries again
//! with the newer snapshot.

use std::collections::HashSet;
use std::rc::Rc;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::kv::KvStore;
use crate::task::{check_progress, Status, Task, TaskDraft, TaskId, TaskLimits, TaskPatch};

/// Logical key holding the task array
pub const TASKS_KEY: &str = "tasks";

/// Minimum query length for [`TaskRepository::search`]
pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug)]
pub struct TaskRepository {
    store: Rc<KvStore>,
    limits: TaskLimits,
    tasks: Vec<Task>,
    save_failed: bool,
}

impl TaskRepository {
    /// Create a repository and load whatever the store holds
    pub fn open(store: Rc<KvStore>, limits: TaskLimits) -> Self {
        let mut repo = Self {
            store,
            limits,
            tasks: Vec::new(),
            save_failed: false,
        };
        repo.load();
        repo
    }

    /// Replace the in-memory collection with the persisted one
    ///
    /// Missing or malformed data yields an empty collection. Records that do
    /// not decode as tasks, or whose title or description break the limits,
    /// are dropped one by one. Progress above 100 is clamped. Duplicate ids
    /// keep their first occurrence and anything past the capacity is dropped.
    pub fn load(&mut self) {
        let stored: Vec<serde_json::Value> = self.store.get(TASKS_KEY, Vec::new());
        let total = stored.len();

        let decoded: Vec<Task> = stored
            .into_iter()
            .filter_map(|record| serde_json::from_value::<Task>(record).ok())
            .collect();
        if decoded.len() != total {
            tracing::warn!(
                dropped = total - decoded.len(),
                "dropped stored records that are not tasks"
            );
        }

        let decoded_len = decoded.len();
        let repaired: Vec<Task> = decoded
            .into_iter()
            .filter_map(|task| self.repair(task))
            .collect();
        if repaired.len() != decoded_len {
            tracing::warn!(
                dropped = decoded_len - repaired.len(),
                "dropped tasks with invalid fields"
            );
        }

        let repaired_len = repaired.len();
        let mut seen = HashSet::new();
        let mut tasks: Vec<Task> = repaired
            .into_iter()
            .filter(|task| seen.insert(task.id.clone()))
            .collect();
        if tasks.len() != repaired_len {
            tracing::warn!(
                dropped = repaired_len - tasks.len(),
                "dropped tasks with duplicate ids"
            );
        }
        if tasks.len() > self.limits.max_tasks {
            tracing::warn!(
                kept = self.limits.max_tasks,
                dropped = tasks.len() - self.limits.max_tasks,
                "stored tasks exceed capacity"
            );
            tasks.truncate(self.limits.max_tasks);
        }

        tracing::debug!(count = tasks.len(), "loaded tasks");
        self.tasks = tasks;
    }

    /// Bring a stored task back within the field limits
    fn repair(&self, mut task: Task) -> Option<Task> {
        let title = match self.limits.check_title(&task.title) {
            Ok(title) => title,
            Err(err) => {
                tracing::warn!(id = %task.id, error = %err, "stored task has an invalid title");
                return None;
            }
        };
        let description = match self.limits.check_description(task.description.as_deref()) {
            Ok(description) => description,
            Err(err) => {
                tracing::warn!(
                    id = %task.id,
                    error = %err,
                    "stored task has an invalid description"
                );
                return None;
            }
        };
        if check_progress(task.progress).is_err() {
            tracing::warn!(id = %task.id, progress = task.progress, "clamped stored progress");
            task.progress = 100;
        }
        task.title = title;
        task.description = description;
        task.updated_at = task.updated_at.max(task.created_at);
        Some(task)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.limits.max_tasks
    }

    pub fn limits(&self) -> TaskLimits {
        self.limits
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve(&self, id_or_prefix: &str) -> Result<TaskId> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }
        if let Some(task) = self.tasks.iter().find(|task| task.id.as_str() == needle) {
            return Ok(task.id.clone());
        }

        let mut matches = self
            .tasks
            .iter()
            .filter(|task| task.id.as_str().starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(Error::InvalidArgument(format!(
                "task id prefix '{needle}' is ambiguous"
            ))),
            (None, _) => Err(Error::NotFound(needle.to_string())),
        }
    }

    /// Whether the last persist was rejected by the store
    pub fn save_failed(&self) -> bool {
        self.save_failed
    }

    /// Validate `draft`, create the task, and prepend it
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task> {
        let title = self.limits.check_title(&draft.title)?;
        let description = self
            .limits
            .check_description(draft.description.as_deref())?;

        if self.tasks.len() >= self.limits.max_tasks {
            return Err(Error::CapacityExceeded {
                max: self.limits.max_tasks,
            });
        }

        let mut id = TaskId::generate();
        while self.get(&id).is_some() {
            id = TaskId::generate();
        }

        let now = Utc::now();
        let task = Task {
            id,
            title,
            description,
            category: draft.category,
            priority: draft.priority,
            status: Status::Todo,
            progress: 0,
            created_at: now,
            updated_at: now,
        };

        self.tasks.insert(0, task.clone());
        self.persist();
        Ok(task)
    }

    /// Merge `patch` over the task with `id`
    ///
    /// Fields absent from the patch are left as they were. The whole patch is
    /// validated before anything changes.
    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let title = patch
            .title
            .as_deref()
            .map(|title| self.limits.check_title(title))
            .transpose()?;
        let description = match &patch.description {
            Some(description) => Some(self.limits.check_description(description.as_deref())?),
            None => None,
        };
        let progress = patch.progress.map(check_progress).transpose()?;

        let task = &mut self.tasks[index];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(progress) = progress {
            task.progress = progress;
        }
        task.updated_at = Utc::now().max(task.created_at);

        let updated = task.clone();
        self.persist();
        Ok(updated)
    }

    /// Remove the task with `id`; absent ids are a no-op
    ///
    /// Returns whether a task was removed.
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        let removed = self.tasks.len() != before;
        self.persist();
        removed
    }

    /// Tasks whose title or description contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<&Task> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }
        self.tasks
            .iter()
            .filter(|task| {
                task.title.to_lowercase().contains(&query)
                    || task
                        .description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    fn persist(&mut self) {
        let ok = self.store.set(TASKS_KEY, &self.tasks);
        if !ok {
            tracing::warn!(count = self.tasks.len(), "tasks kept in memory only");
        }
        self.save_failed = !ok;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryBackend;
    use crate::task::{Category, Priority};

    fn repo_with(backend: &Rc<MemoryBackend>, max_tasks: usize) -> TaskRepository {
        let limits = TaskLimits {
            max_tasks,
            ..TaskLimits::default()
        };
        TaskRepository::open(
            Rc::new(KvStore::new(Rc::clone(backend), "studyflow_")),
            limits,
        )
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft::new(title, Category::Study, Priority::Low)
    }

    #[test]
    fn add_sets_defaults() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);

        let task = repo
            .add(TaskDraft::new("Read Ch.1", Category::Reading, Priority::Medium))
            .unwrap();
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.progress, 0);
        assert!(!task.id.as_str().is_empty());
        assert_eq!(task.created_at, task.updated_at);
        assert!(backend.raw("studyflow_tasks").is_some());
    }

    #[test]
    fn invalid_draft_leaves_collection_untouched() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);

        let err = repo.add(draft(&"x".repeat(101))).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "title", .. }));
        assert!(repo.is_empty());
        assert!(backend.raw("studyflow_tasks").is_none());
    }

    #[test]
    fn update_validates_before_mutating() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        let task = repo.add(draft("Essay")).unwrap();

        let patch = TaskPatch {
            title: Some("Essay draft".to_string()),
            progress: Some(150),
            ..TaskPatch::default()
        };
        assert!(repo.update(&task.id, patch).is_err());
        assert_eq!(repo.get(&task.id).unwrap().title, "Essay");
    }

    #[test]
    fn update_can_clear_description() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        let task = repo.add(draft("Essay").with_description("outline")).unwrap();
        assert_eq!(task.description.as_deref(), Some("outline"));

        let patch = TaskPatch {
            description: Some(None),
            ..TaskPatch::default()
        };
        let updated = repo.update(&task.id, patch).unwrap();
        assert_eq!(updated.description, None);
    }

    #[test]
    fn update_missing_is_not_found() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        let err = repo
            .update(&TaskId::from("missing"), TaskPatch::status(Status::Completed))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "missing"));
    }

    #[test]
    fn load_drops_duplicates_and_overflow() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        let a = repo.add(draft("A")).unwrap();
        let b = repo.add(draft("B")).unwrap();

        let doubled = vec![b.clone(), a.clone(), b.clone()];
        backend.put_raw("studyflow_tasks", &serde_json::to_string(&doubled).unwrap());
        repo.load();
        assert_eq!(repo.len(), 2);

        let small = repo_with(&backend, 1);
        assert_eq!(small.len(), 1);
        assert_eq!(small.tasks()[0].id, b.id);
    }

    #[test]
    fn load_clamps_progress_and_drops_oversized_fields() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        let a = repo.add(draft("A")).unwrap();
        let b = repo.add(draft("B")).unwrap();

        let mut overdone = a.clone();
        overdone.progress = 250;
        let mut wordy = b.clone();
        wordy.title = "x".repeat(101);
        backend.put_raw(
            "studyflow_tasks",
            &serde_json::to_string(&vec![wordy, overdone]).unwrap(),
        );

        let mut reopened = repo_with(&backend, 10);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&a.id).unwrap().progress, 100);

        reopened
            .update(&a.id, TaskPatch::status(Status::InProgress))
            .unwrap();
        let stored: Vec<Task> =
            serde_json::from_str(&backend.raw("studyflow_tasks").unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].progress, 100);
    }

    #[test]
    fn one_bad_record_does_not_discard_the_rest() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        repo.add(draft("A")).unwrap();
        repo.add(draft("B")).unwrap();
        repo.add(draft("C")).unwrap();

        let mut records: Vec<serde_json::Value> =
            serde_json::from_str(&backend.raw("studyflow_tasks").unwrap()).unwrap();
        records[1]["category"] = serde_json::Value::String("Math".to_string());
        backend.put_raw("studyflow_tasks", &serde_json::to_string(&records).unwrap());

        let mut reopened = repo_with(&backend, 10);
        let titles: Vec<&str> = reopened.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);

        reopened.add(draft("D")).unwrap();
        let stored: Vec<Task> =
            serde_json::from_str(&backend.raw("studyflow_tasks").unwrap()).unwrap();
        let titles: Vec<&str> = stored.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["D", "C", "A"]);
    }

    #[test]
    fn resolve_accepts_unique_prefixes() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        let task = repo.add(draft("Essay")).unwrap();

        assert_eq!(repo.resolve(task.id.as_str()).unwrap(), task.id);
        assert_eq!(repo.resolve(&task.id.as_str()[..8]).unwrap(), task.id);
        assert!(matches!(repo.resolve("zzzz"), Err(Error::NotFound(_))));
        assert!(matches!(repo.resolve("  "), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn malformed_store_loads_empty() {
        let backend = Rc::new(MemoryBackend::new());
        backend.put_raw("studyflow_tasks", "{\"tasks\": 3}");
        let repo = repo_with(&backend, 10);
        assert!(repo.is_empty());
    }

    #[test]
    fn failed_save_keeps_memory_state() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        repo.add(draft("A")).unwrap();
        assert!(!repo.save_failed());

        backend.set_failing(true);
        let b = repo.add(draft("B")).unwrap();
        assert!(repo.save_failed());
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get(&b.id).unwrap().title, "B");

        backend.set_failing(false);
        repo.update(&b.id, TaskPatch::status(Status::InProgress)).unwrap();
        assert!(!repo.save_failed());

        let reloaded = repo_with(&backend, 10);
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn search_matches_title_and_description() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = repo_with(&backend, 10);
        repo.add(draft("Linear algebra")).unwrap();
        repo.add(draft("Essay").with_description("History of ALGEBRA"))
            .unwrap();
        repo.add(draft("Lab report")).unwrap();

        assert_eq!(repo.search("algebra").len(), 2);
        assert_eq!(repo.search("lab").len(), 1);
        assert!(repo.search("a").is_empty());
        assert!(repo.search("chemistry").is_empty());
    }
}
