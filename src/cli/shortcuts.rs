//! studyflow shortcuts command implementation.

use chrono::Utc;
use serde::Serialize;

use crate::app::{App, ShortcutOutcome};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::shortcuts::{parse_chord, Shortcut, ShortcutAction, SHORTCUTS};
use crate::timer::TimerStatus;

pub struct TriggerOptions {
    pub chord: String,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ShortcutRow {
    chord: String,
    #[serde(flatten)]
    shortcut: &'static Shortcut,
}

#[derive(Serialize)]
struct TriggerOutput {
    chord: String,
    action: ShortcutAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    timer: Option<TimerStatus>,
}

pub fn run_list(json: bool, quiet: bool) -> Result<()> {
    let rows: Vec<ShortcutRow> = SHORTCUTS
        .iter()
        .map(|shortcut| ShortcutRow {
            chord: shortcut.chord(),
            shortcut,
        })
        .collect();

    let mut human = HumanOutput::new("Keyboard shortcuts");
    for row in &rows {
        human.push_summary(row.chord.clone(), row.shortcut.description);
    }

    emit_success(
        OutputOptions { json, quiet },
        "shortcuts",
        &rows,
        Some(&human),
    )
}

pub fn run_trigger(mut app: App, options: TriggerOptions) -> Result<()> {
    let shortcut = parse_chord(&options.chord)?;
    let outcome = app.trigger(shortcut.action, Utc::now());

    let mut human = HumanOutput::new(format!("{}: {}", shortcut.chord(), shortcut.description));
    let timer = match outcome {
        ShortcutOutcome::Timer(status) => {
            let state = if status.running { "running" } else { "paused" };
            human.push_summary("Timer", format!("{} ({state})", status.phase.label()));
            Some(status)
        }
        ShortcutOutcome::Help(table) => {
            for entry in table {
                human.push_summary(entry.chord(), entry.description);
            }
            None
        }
        ShortcutOutcome::FocusSearch => {
            human.push_next_step("studyflow task search <query>");
            None
        }
        ShortcutOutcome::OpenTaskForm => {
            human.push_next_step("studyflow task add \"<title>\"");
            None
        }
    };
    human.push_notifications(app.drain_notifications());

    let output = TriggerOutput {
        chord: shortcut.chord(),
        action: shortcut.action,
        timer,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "shortcuts",
        &output,
        Some(&human),
    )
}
