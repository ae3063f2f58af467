//! Pomodoro focus timer.
//!
//! The timer is a countdown over three phases. It runs on wall-clock time:
//! a running phase records when it was started, so state survives between
//! invocations through the `timer` key. A phase that runs out is completed
//! and the timer stops until it is started again.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;
use crate::kv::KvStore;
use crate::notify::{Notification, NotificationSink};

/// Logical key holding the timer state
pub const TIMER_KEY: &str = "timer";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "focus session",
            Phase::ShortBreak => "short break",
            Phase::LongBreak => "long break",
        }
    }
}

/// Phase lengths in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    pub sessions_before_long_break: u32,
    pub alert_before_end_secs: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::from(&TimerConfig::default())
    }
}

impl From<&TimerConfig> for TimerSettings {
    fn from(config: &TimerConfig) -> Self {
        Self {
            work_secs: u64::from(config.work_minutes) * 60,
            short_break_secs: u64::from(config.short_break_minutes) * 60,
            long_break_secs: u64::from(config.long_break_minutes) * 60,
            sessions_before_long_break: config.sessions_before_long_break.max(1),
            alert_before_end_secs: u64::from(config.alert_before_end_secs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_since: Option<DateTime<Utc>>,
    /// Seconds accumulated before the last pause
    #[serde(default)]
    pub elapsed_secs: u64,
    #[serde(default)]
    pub completed_sessions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    EndingSoon { phase: Phase, remaining_secs: u64 },
    PhaseCompleted { finished: Phase, next: Phase },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerStatus {
    pub phase: Phase,
    pub running: bool,
    pub remaining_secs: u64,
    pub completed_sessions: u32,
}

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    settings: TimerSettings,
    state: TimerState,
}

impl PomodoroTimer {
    pub fn new(settings: TimerSettings, state: TimerState) -> Self {
        Self { settings, state }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running_since.is_some()
    }

    pub fn phase_length(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.settings.work_secs,
            Phase::ShortBreak => self.settings.short_break_secs,
            Phase::LongBreak => self.settings.long_break_secs,
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> u64 {
        let running = self
            .state
            .running_since
            .map(|since| (now - since).num_seconds().max(0) as u64)
            .unwrap_or(0);
        self.state.elapsed_secs.saturating_add(running)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> u64 {
        self.phase_length(self.state.phase)
            .saturating_sub(self.elapsed(now))
    }

    pub fn status(&self, now: DateTime<Utc>) -> TimerStatus {
        TimerStatus {
            phase: self.state.phase,
            running: self.is_running(),
            remaining_secs: self.remaining(now),
            completed_sessions: self.state.completed_sessions,
        }
    }

    /// Start the current phase; returns false if it was already running
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running() {
            return false;
        }
        self.state.running_since = Some(now);
        true
    }

    /// Pause the current phase; returns false if it was not running
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state.elapsed_secs = self.elapsed(now);
        self.state.running_since = None;
        true
    }

    /// Start or pause; returns whether the timer is now running
    pub fn toggle(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running() {
            self.pause(now);
            false
        } else {
            self.start(now);
            true
        }
    }

    /// Back to a stopped focus session with no completed sessions
    pub fn reset(&mut self) {
        self.state = TimerState::default();
    }

    /// Finish the current phase early
    pub fn skip(&mut self) -> TimerEvent {
        self.complete()
    }

    /// Complete the phase if its time is up, or warn when it is about to be
    pub fn sync(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        if !self.is_running() {
            return None;
        }
        let remaining = self.remaining(now);
        if remaining == 0 {
            return Some(self.complete());
        }
        if remaining <= self.settings.alert_before_end_secs {
            return Some(TimerEvent::EndingSoon {
                phase: self.state.phase,
                remaining_secs: remaining,
            });
        }
        None
    }

    fn complete(&mut self) -> TimerEvent {
        let finished = self.state.phase;
        let next = match finished {
            Phase::Work => {
                self.state.completed_sessions += 1;
                if self.state.completed_sessions % self.settings.sessions_before_long_break == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };
        self.state.phase = next;
        self.state.running_since = None;
        self.state.elapsed_secs = 0;
        TimerEvent::PhaseCompleted { finished, next }
    }
}

/// Timer bound to the store and the notification sink
///
/// Every operation first catches up with the clock, then persists.
pub struct TimerManager {
    store: Rc<KvStore>,
    sink: Rc<dyn NotificationSink>,
    timer: PomodoroTimer,
}

impl TimerManager {
    pub fn load(
        store: Rc<KvStore>,
        sink: Rc<dyn NotificationSink>,
        settings: TimerSettings,
    ) -> Self {
        let state = store.get(TIMER_KEY, TimerState::default());
        Self {
            store,
            sink,
            timer: PomodoroTimer::new(settings, state),
        }
    }

    pub fn timer(&self) -> &PomodoroTimer {
        &self.timer
    }

    pub fn status(&mut self, now: DateTime<Utc>) -> TimerStatus {
        self.catch_up(now);
        self.timer.status(now)
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> TimerStatus {
        self.catch_up(now);
        if self.timer.start(now) {
            self.sink.show(Notification::info(format!(
                "Started {}",
                self.timer.state().phase.label()
            )));
        }
        self.save();
        self.timer.status(now)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> TimerStatus {
        self.catch_up(now);
        if self.timer.pause(now) {
            self.sink.show(Notification::info("Timer paused"));
        }
        self.save();
        self.timer.status(now)
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) -> TimerStatus {
        self.catch_up(now);
        let running = self.timer.toggle(now);
        self.sink.show(Notification::info(if running {
            "Timer running"
        } else {
            "Timer paused"
        }));
        self.save();
        self.timer.status(now)
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> TimerStatus {
        self.timer.reset();
        self.sink.show(Notification::info("Timer reset"));
        self.save();
        self.timer.status(now)
    }

    pub fn skip(&mut self, now: DateTime<Utc>) -> TimerStatus {
        self.catch_up(now);
        let event = self.timer.skip();
        self.announce(event);
        self.save();
        self.timer.status(now)
    }

    fn catch_up(&mut self, now: DateTime<Utc>) {
        if let Some(event) = self.timer.sync(now) {
            let completed = matches!(event, TimerEvent::PhaseCompleted { .. });
            self.announce(event);
            if completed {
                self.save();
            }
        }
    }

    fn announce(&self, event: TimerEvent) {
        let notification = match event {
            TimerEvent::EndingSoon {
                phase,
                remaining_secs,
            } => Notification::warning(format!(
                "{remaining_secs} seconds left in {}",
                phase.label()
            )),
            TimerEvent::PhaseCompleted {
                finished: Phase::Work,
                next,
            } => Notification::success(format!(
                "Focus session complete. Time for a {}",
                next.label()
            )),
            TimerEvent::PhaseCompleted { .. } => {
                Notification::info("Break over. Ready for the next focus session")
            }
        };
        self.sink.show(notification);
    }

    fn save(&self) {
        if !self.store.set(TIMER_KEY, self.timer.state()) {
            self.sink
                .show(Notification::warning("Timer state could not be saved"));
        }
    }
}
