//! Transient user notifications.
//!
//! A notification is fire-and-forget: callers hand it to a sink and never
//! look at it again. Sinks keep no queue and do no dedup; each message
//! carries its own display duration.

use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display duration used when the caller does not pick one
pub const DEFAULT_DURATION_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    /// `None` until the caller or the sink picks a duration
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Option<Duration>,
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let duration = duration.unwrap_or(Duration::from_millis(DEFAULT_DURATION_MS));
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
            duration: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Error)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// The chosen duration, or the 3000 ms default
    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or(Duration::from_millis(DEFAULT_DURATION_MS))
    }
}

/// Receiver of notifications
pub trait NotificationSink {
    fn show(&self, notification: Notification);
}

/// A notification together with the instant it stops being shown
#[derive(Debug, Clone, Serialize)]
pub struct Shown {
    #[serde(flatten)]
    pub notification: Notification,
    pub shown_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Shown {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Sink that keeps every notification so a front end can render them once
/// the triggering command is done
///
/// Notifications without an explicit duration are shown for
/// `default_duration`.
#[derive(Debug)]
pub struct MemorySink {
    shown: RefCell<Vec<Shown>>,
    default_duration: Duration,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DURATION_MS))
    }
}

impl MemorySink {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            shown: RefCell::new(Vec::new()),
            default_duration,
        }
    }

    /// Everything shown so far, oldest first
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.borrow().clone()
    }

    /// Notifications still on screen at `now`
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Shown> {
        self.shown
            .borrow()
            .iter()
            .filter(|shown| !shown.is_expired(now))
            .cloned()
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.shown
            .borrow()
            .iter()
            .map(|shown| shown.notification.message.clone())
            .collect()
    }

    pub fn drain(&self) -> Vec<Shown> {
        std::mem::take(&mut *self.shown.borrow_mut())
    }
}

impl NotificationSink for MemorySink {
    fn show(&self, mut notification: Notification) {
        let duration = *notification.duration.get_or_insert(self.default_duration);
        tracing::debug!(
            severity = %notification.severity,
            message = %notification.message,
            "notification"
        );
        let shown_at = Utc::now();
        let ttl = chrono::Duration::from_std(duration)
            .unwrap_or_else(|_| chrono::Duration::milliseconds(DEFAULT_DURATION_MS as i64));
        self.shown.borrow_mut().push(Shown {
            expires_at: shown_at + ttl,
            shown_at,
            notification,
        });
    }
}
