use std::rc::Rc;

use studyflow::error::Error;
use studyflow::kv::{FileBackend, KvStore, MemoryBackend};
use studyflow::repository::{TaskRepository, TASKS_KEY};
use studyflow::task::{
    Category, Priority, Status, Task, TaskDraft, TaskId, TaskLimits, TaskPatch,
};

fn memory_repo(max_tasks: usize) -> (Rc<MemoryBackend>, TaskRepository) {
    let backend = Rc::new(MemoryBackend::new());
    let store = Rc::new(KvStore::new(Rc::clone(&backend), "studyflow_"));
    let limits = TaskLimits {
        max_tasks,
        ..TaskLimits::default()
    };
    (backend, TaskRepository::open(store, limits))
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft::new(title, Category::Study, Priority::Medium)
}

fn titles(repo: &TaskRepository) -> Vec<&str> {
    repo.tasks().iter().map(|task| task.title.as_str()).collect()
}

#[test]
fn adds_count_up_to_capacity() {
    let (_backend, mut repo) = memory_repo(3);
    for i in 0..3 {
        repo.add(draft(&format!("Task {i}"))).expect("add");
        assert_eq!(repo.len(), i + 1);
    }

    let before = repo.tasks().to_vec();
    let err = repo.add(draft("One too many")).unwrap_err();
    assert!(matches!(err, Error::CapacityExceeded { max: 3 }));
    assert_eq!(repo.tasks(), before.as_slice());
}

#[test]
fn add_then_reload_round_trips_every_field() {
    let dir = tempfile::tempdir().expect("tempdir");
    let open = || {
        let store = Rc::new(KvStore::new(
            FileBackend::in_data_dir(dir.path()),
            "studyflow_",
        ));
        TaskRepository::open(store, TaskLimits::default())
    };

    let mut repo = open();
    let plain = repo.add(draft("Flashcards")).expect("add");
    let described = repo
        .add(
            TaskDraft::new("Lab write-up", Category::Assignment, Priority::High)
                .with_description("Sections 2 and 3"),
        )
        .expect("add");
    repo.update(
        &described.id,
        TaskPatch {
            status: Some(Status::InProgress),
            progress: Some(35),
            ..TaskPatch::default()
        },
    )
    .expect("update");

    let expected: Vec<Task> = repo.tasks().to_vec();
    let reloaded = open();
    assert_eq!(reloaded.tasks(), expected.as_slice());
    assert_eq!(reloaded.get(&plain.id), Some(&plain));
}

#[test]
fn status_update_changes_only_status_and_updated_at() {
    let (_backend, mut repo) = memory_repo(10);
    let before = repo
        .add(draft("Essay").with_description("Intro and outline"))
        .expect("add");

    let after = repo
        .update(&before.id, TaskPatch::status(Status::Completed))
        .expect("update");

    assert_eq!(after.status, Status::Completed);
    assert!(after.updated_at >= before.updated_at);
    assert_eq!(
        Task {
            status: before.status,
            updated_at: before.updated_at,
            ..after.clone()
        },
        before
    );
}

#[test]
fn removing_unknown_id_is_a_byte_for_byte_no_op() {
    let (backend, mut repo) = memory_repo(10);
    repo.add(draft("A")).expect("add");
    repo.add(draft("B")).expect("add");
    let stored = backend.raw("studyflow_tasks").expect("stored");
    let before = repo.tasks().to_vec();

    assert!(!repo.remove(&TaskId::from("does-not-exist")));
    assert_eq!(repo.tasks(), before.as_slice());
    assert_eq!(backend.raw("studyflow_tasks").as_deref(), Some(stored.as_str()));
}

#[test]
fn removing_existing_id_removes_exactly_that_task() {
    for target in 0..3 {
        let (_backend, mut repo) = memory_repo(10);
        let ids: Vec<TaskId> = ["A", "B", "C"]
            .iter()
            .map(|title| repo.add(draft(title)).expect("add").id)
            .collect();

        assert!(repo.remove(&ids[target]));
        assert_eq!(repo.len(), 2);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(repo.get(id).is_some(), i != target);
        }
    }
}

#[test]
fn newest_first_ordering() {
    let (_backend, mut repo) = memory_repo(10);
    repo.add(draft("A")).expect("add");
    repo.add(draft("B")).expect("add");
    repo.add(draft("C")).expect("add");
    assert_eq!(titles(&repo), vec!["C", "B", "A"]);
}

#[test]
fn fresh_store_then_first_task() {
    let backend = Rc::new(MemoryBackend::new());
    let store = Rc::new(KvStore::new(Rc::clone(&backend), "studyflow_"));
    let empty: Vec<Task> = store.get(TASKS_KEY, Vec::new());
    assert!(empty.is_empty());

    let mut repo = TaskRepository::open(store, TaskLimits::default());
    let task = repo
        .add(TaskDraft::new(
            "Read Ch.1",
            "Reading".parse().expect("category"),
            "Medium".parse().expect("priority"),
        ))
        .expect("add");

    assert_eq!(task.status, Status::Todo);
    assert_eq!(task.status.label(), "To Do");
    assert_eq!(task.progress, 0);
    assert!(!task.id.as_str().is_empty());
    assert_eq!(task.created_at, task.updated_at);
    assert_eq!(task.category, Category::Reading);
}

#[test]
fn consecutive_disjoint_updates_accumulate() {
    let (_backend, mut repo) = memory_repo(10);
    let task = repo.add(draft("Problem set")).expect("add");

    repo.update(
        &task.id,
        TaskPatch {
            priority: Some(Priority::High),
            ..TaskPatch::default()
        },
    )
    .expect("first update");
    let last = repo
        .update(
            &task.id,
            TaskPatch {
                progress: Some(60),
                status: Some(Status::InProgress),
                ..TaskPatch::default()
            },
        )
        .expect("second update");

    assert_eq!(last.priority, Priority::High);
    assert_eq!(last.progress, 60);
    assert_eq!(last.status, Status::InProgress);
    assert_eq!(last.title, "Problem set");
}

#[test]
fn stored_json_uses_contract_field_names() {
    let (backend, mut repo) = memory_repo(10);
    repo.add(
        TaskDraft::new("Mock exam", Category::ExamPrep, Priority::Low).with_description("Paper 2"),
    )
    .expect("add");

    let raw = backend.raw("studyflow_tasks").expect("stored");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let task = &value[0];
    assert_eq!(task["category"], "Exam Prep");
    assert_eq!(task["priority"], "low");
    assert_eq!(task["status"], "todo");
    assert!(task["createdAt"].is_string());
    assert!(task["updatedAt"].is_string());
    assert_eq!(task["description"], "Paper 2");
}
