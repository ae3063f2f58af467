mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestEnv;

#[test]
fn add_list_show_round_trip() {
    let env = TestEnv::new();

    let added = env.json(&[
        "task",
        "add",
        "Read Ch.1",
        "--category",
        "reading",
        "--priority",
        "medium",
        "--description",
        "Chapter one of the set text",
    ]);
    assert_eq!(added["schema_version"], "studyflow.v1");
    assert_eq!(added["command"], "task add");
    assert_eq!(added["status"], "success");
    assert_eq!(added["data"]["title"], "Read Ch.1");
    assert_eq!(added["data"]["category"], "Reading");
    assert_eq!(added["data"]["status"], "todo");
    assert_eq!(added["data"]["progress"], 0);
    assert_eq!(added["notifications"][0]["type"], "success");
    assert_eq!(added["notifications"][0]["message"], "Task \"Read Ch.1\" created");

    let id = added["data"]["id"].as_str().expect("id").to_string();
    let shown = env.json(&["task", "show", &id[..8]]);
    assert_eq!(shown["data"]["id"], Value::String(id.clone()));
    assert_eq!(shown["data"]["description"], "Chapter one of the set text");

    let listed = env.json(&["task", "list"]);
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["summary"]["todo"], 1);
    assert!(env.read_store("tasks").expect("tasks file").contains(&id));
}

#[test]
fn list_is_newest_first_and_filters() {
    let env = TestEnv::new();
    env.add_task("A");
    let b = env.add_task("B");
    env.add_task("C");
    env.json(&["task", "update", b.as_str(), "--status", "in-progress"]);

    let listed = env.json(&["task", "list"]);
    let titles: Vec<&str> = listed["data"]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|task| task["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["C", "B", "A"]);

    let filtered = env.json(&["task", "list", "--status", "In Progress"]);
    assert_eq!(filtered["data"]["total"], 1);
    assert_eq!(filtered["data"]["tasks"][0]["title"], "B");
}

#[test]
fn update_merges_fields_and_can_clear_description() {
    let env = TestEnv::new();
    let id = env.add_task("Essay");

    env.json(&["task", "update", id.as_str(), "--priority", "high", "--description", "Draft"]);
    let updated = env.json(&["task", "update", id.as_str(), "--progress", "40"]);
    assert_eq!(updated["data"]["priority"], "high");
    assert_eq!(updated["data"]["description"], "Draft");
    assert_eq!(updated["data"]["progress"], 40);

    let cleared = env.json(&["task", "update", id.as_str(), "--clear-description"]);
    assert!(cleared["data"].get("description").is_none());
}

#[test]
fn toggle_flips_completion() {
    let env = TestEnv::new();
    let id = env.add_task("Quiz review");

    let done = env.json(&["task", "toggle", id.as_str()]);
    assert_eq!(done["data"]["status"], "completed");
    let reopened = env.json(&["task", "toggle", id.as_str()]);
    assert_eq!(reopened["data"]["status"], "todo");
}

#[test]
fn delete_is_idempotent() {
    let env = TestEnv::new();
    let keep = env.add_task("Keep");
    let drop = env.add_task("Drop");

    let deleted = env.json(&["task", "delete", drop.as_str()]);
    assert_eq!(deleted["data"]["removed"], true);
    let before = env.read_store("tasks").expect("tasks file");

    let again = env.json(&["task", "delete", drop.as_str()]);
    assert_eq!(again["data"]["removed"], false);
    assert_eq!(again["notifications"][0]["type"], "info");
    assert_eq!(env.read_store("tasks").expect("tasks file"), before);
    assert!(before.contains(&keep));
}

#[test]
fn search_matches_title_and_description() {
    let env = TestEnv::new();
    env.add_task("Linear algebra");
    env.json(&["task", "add", "Essay", "--description", "History of algebra"]);
    env.add_task("Lab report");

    let found = env.json(&["task", "search", "ALGEBRA"]);
    assert_eq!(found["data"]["total"], 2);

    let short = env.json(&["task", "search", "a"]);
    assert_eq!(short["data"]["total"], 0);
    assert_eq!(short["notifications"][0]["type"], "warning");
    assert!(short["notifications"][0]["message"]
        .as_str()
        .expect("message")
        .contains("2 characters"));
}

#[test]
fn human_output_shows_task_lines() {
    let env = TestEnv::new();
    env.add_task("Flashcards");

    env.cmd()
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(contains("Tasks"))
        .stdout(contains("[ ]"))
        .stdout(contains("Flashcards (Study, Medium, 0%)"));
}

#[test]
fn quiet_suppresses_output() {
    let env = TestEnv::new();
    env.cmd()
        .args(["task", "add", "Silent", "-q"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn validation_errors_exit_with_user_error() {
    let env = TestEnv::new();
    let long_title = "x".repeat(101);

    env.cmd()
        .args(["task", "add", long_title.as_str()])
        .assert()
        .code(2)
        .stderr(contains("error: Invalid title"));

    env.cmd()
        .args(["task", "add", "Ok", "--category", "sports"])
        .assert()
        .code(2)
        .stderr(contains("category"));

    assert!(env.read_store("tasks").is_none());
}

#[test]
fn unknown_task_reports_not_found() {
    let env = TestEnv::new();

    let output = env
        .cmd()
        .args(["task", "toggle", "nope", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let value: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["status"], "error");
    assert_eq!(value["command"], "task toggle");
    assert_eq!(value["error"]["kind"], "user_error");
    assert_eq!(value["error"]["details"]["id"], "nope");
    assert_eq!(value["next_steps"][0], "studyflow task list");
}

#[test]
fn capacity_comes_from_config() {
    let env = TestEnv::new();
    env.write_config("[tasks]\nmax_tasks = 2\n");
    env.add_task("One");
    env.add_task("Two");

    env.cmd()
        .args(["task", "add", "Three"])
        .assert()
        .code(2)
        .stderr(contains("at most 2 tasks"));

    let listed = env.json(&["task", "list"]);
    assert_eq!(listed["data"]["total"], 2);
}
