#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Temporary studyflow data directory
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn store_file(&self, key: &str) -> PathBuf {
        self.store_dir().join(format!("studyflow_{key}.json"))
    }

    pub fn read_store(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.store_file(key)).ok()
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("studyflow.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    /// `studyflow` pointed at this data directory
    pub fn cmd(&self) -> Command {
        let mut cmd = studyflow_cmd();
        cmd.env("STUDYFLOW_DIR", self.dir.path());
        cmd
    }

    /// Run with `--json` and parse the envelope
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .output()
            .expect("run studyflow");
        assert!(
            output.status.success(),
            "studyflow {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json envelope")
    }

    /// Create a task and return its id
    pub fn add_task(&self, title: &str) -> String {
        let value = self.json(&["task", "add", title]);
        value["data"]["id"]
            .as_str()
            .expect("task id")
            .to_string()
    }
}

pub fn studyflow_cmd() -> Command {
    let mut cmd = Command::cargo_bin("studyflow").expect("binary");
    cmd.env_remove("STUDYFLOW_DIR").env_remove("RUST_LOG");
    cmd
}
