//! Shared output formatting for studyflow CLI commands.

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};
use crate::notify::Shown;

pub const SCHEMA_VERSION: &str = "studyflow.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human-readable rendering of a command result
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    rows: Vec<String>,
    notifications: Vec<Shown>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            rows: Vec::new(),
            notifications: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_row(&mut self, row: impl Into<String>) {
        self.rows.push(row.into());
    }

    pub fn push_notifications(&mut self, shown: impl IntoIterator<Item = Shown>) {
        self.notifications.extend(shown);
    }

    pub fn push_next_step(&mut self, command: impl Into<String>) {
        self.next_steps.push(command.into());
    }

    pub fn render(&self) -> String {
        let mut lines = vec![self.header.clone()];

        for (key, value) in &self.summary {
            if value.is_empty() {
                lines.push(format!("- {key}"));
            } else {
                lines.push(format!("- {key}: {value}"));
            }
        }
        if !self.rows.is_empty() {
            lines.push(String::new());
            lines.extend(self.rows.iter().map(|row| format!("  {row}")));
        }
        if !self.notifications.is_empty() {
            lines.push(String::new());
            lines.push("Notifications:".to_string());
            lines.extend(self.notifications.iter().map(|shown| {
                format!(
                    "- [{}] {}",
                    shown.notification.severity, shown.notification.message
                )
            }));
        }
        if !self.next_steps.is_empty() {
            lines.push(String::new());
            lines.push("Try:".to_string());
            lines.extend(self.next_steps.iter().map(|step| format!("- {step}")));
        }

        lines.join("\n")
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    #[serde(flatten)]
    outcome: Outcome<'a, T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notifications: Vec<Shown>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome<'a, T: Serialize> {
    Success { data: &'a T },
    Error { error: ErrorBody },
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            outcome: Outcome::Success { data },
            notifications: human.map(|h| h.notifications.clone()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.clone()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if let Some(human) = human.filter(|_| !options.quiet) {
        println!("{}", human.render());
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        let payload: Envelope<'_, ()> = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            outcome: Outcome::Error {
                error: ErrorBody {
                    message: err.to_string(),
                    code: err.exit_code(),
                    kind: error_kind(err),
                    details: err.details(),
                },
            },
            notifications: Vec::new(),
            next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn infer_command_name_from_args() -> String {
    command_name(std::env::args().skip(1))
}

fn command_name(mut args: impl Iterator<Item = String>) -> String {
    let mut subcommand = None;

    // --data-dir takes a value that is not a command
    let mut command = None;
    while let Some(arg) = args.next() {
        if arg == "--data-dir" {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "studyflow".to_string(),
    };

    if matches!(command.as_str(), "task" | "theme" | "timer") {
        for arg in args.by_ref() {
            if arg.starts_with('-') {
                continue;
            }
            subcommand = Some(arg);
            break;
        }
    }

    if let Some(sub) = subcommand {
        format!("{command} {sub}")
    } else {
        command
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::NotFound(_) => vec!["studyflow task list".to_string()],
        Error::CapacityExceeded { .. } => vec!["studyflow task delete <id>".to_string()],
        Error::InvalidConfig(_) => vec!["fix studyflow.toml then retry".to_string()],
        Error::LockFailed(_) => vec!["retry once other studyflow commands finish".to_string()],
        _ => Vec::new(),
    }
}
