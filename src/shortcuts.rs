//! Keyboard shortcut table.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutAction {
    Search,
    NewTask,
    ToggleTimer,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => f.write_str("Ctrl"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub action: ShortcutAction,
    pub modifier: Modifier,
    pub key: char,
    pub description: &'static str,
}

impl Shortcut {
    /// Display form, e.g. `Ctrl+K`
    pub fn chord(&self) -> String {
        format!("{}+{}", self.modifier, self.key.to_ascii_uppercase())
    }
}

pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        action: ShortcutAction::Search,
        modifier: Modifier::Ctrl,
        key: 'k',
        description: "Focus search",
    },
    Shortcut {
        action: ShortcutAction::NewTask,
        modifier: Modifier::Ctrl,
        key: 'n',
        description: "New task",
    },
    Shortcut {
        action: ShortcutAction::ToggleTimer,
        modifier: Modifier::Ctrl,
        key: 't',
        description: "Start or pause the timer",
    },
    Shortcut {
        action: ShortcutAction::Help,
        modifier: Modifier::Ctrl,
        key: '/',
        description: "Show shortcuts",
    },
];

pub fn lookup(modifier: Modifier, key: char) -> Option<&'static Shortcut> {
    let key = key.to_ascii_lowercase();
    SHORTCUTS
        .iter()
        .find(|shortcut| shortcut.modifier == modifier && shortcut.key == key)
}

/// Resolve a chord such as `ctrl+k` or `Ctrl+/`
pub fn parse_chord(chord: &str) -> Result<&'static Shortcut> {
    let invalid = || Error::InvalidArgument(format!("unrecognized shortcut '{chord}'"));

    let (modifier, key) = chord.trim().rsplit_once('+').ok_or_else(invalid)?;
    let modifier = match modifier.trim().to_ascii_lowercase().as_str() {
        "ctrl" | "control" | "cmd" | "meta" => Modifier::Ctrl,
        _ => return Err(invalid()),
    };
    let mut chars = key.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => lookup(modifier, key).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
