//! Light/dark theme preference.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kv::KvStore;
use crate::notify::{Notification, NotificationSink};

/// Logical key holding the theme name
pub const THEME_KEY: &str = "theme";

const SWITCH_NOTICE_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors applied by a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                primary: "#2563eb",
                secondary: "#64748b",
                background: "#ffffff",
                surface: "#f8fafc",
                text: "#1e293b",
                border: "#e2e8f0",
            },
            Theme::Dark => Palette {
                primary: "#3b82f6",
                secondary: "#94a3b8",
                background: "#0f172a",
                surface: "#1e293b",
                text: "#f8fafc",
                border: "#334155",
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::InvalidArgument(format!(
                "unknown theme '{other}' (expected light|dark)"
            ))),
        }
    }
}

/// Holds the active theme and persists changes to it
pub struct ThemeManager {
    store: Rc<KvStore>,
    sink: Rc<dyn NotificationSink>,
    current: Theme,
}

impl ThemeManager {
    /// Load the persisted theme, falling back to `default`
    pub fn load(store: Rc<KvStore>, sink: Rc<dyn NotificationSink>, default: Theme) -> Self {
        let current = store.get(THEME_KEY, default);
        Self {
            store,
            sink,
            current,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.current.toggled())
    }

    pub fn set(&mut self, theme: Theme) -> Theme {
        self.current = theme;
        if !self.store.set(THEME_KEY, &theme) {
            self.sink
                .show(Notification::warning("Theme preference could not be saved"));
        }
        self.sink.show(
            Notification::info(format!("Switched to {theme} mode"))
                .with_duration(Duration::from_millis(SWITCH_NOTICE_MS)),
        );
        theme
    }
}
