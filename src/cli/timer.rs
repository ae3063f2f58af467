//! studyflow timer command implementation.

use chrono::Utc;

use crate::app::App;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::timer::TimerStatus;

pub enum TimerAction {
    Status,
    Start,
    Pause,
    Toggle,
    Reset,
    Skip,
}

impl TimerAction {
    fn command(&self) -> &'static str {
        match self {
            TimerAction::Status => "timer status",
            TimerAction::Start => "timer start",
            TimerAction::Pause => "timer pause",
            TimerAction::Toggle => "timer toggle",
            TimerAction::Reset => "timer reset",
            TimerAction::Skip => "timer skip",
        }
    }
}

pub struct TimerOptions {
    pub action: TimerAction,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(mut app: App, options: TimerOptions) -> Result<()> {
    let now = Utc::now();
    let timer = app.timer_mut();
    let status = match options.action {
        TimerAction::Status => timer.status(now),
        TimerAction::Start => timer.start(now),
        TimerAction::Pause => timer.pause(now),
        TimerAction::Toggle => timer.toggle(now),
        TimerAction::Reset => timer.reset(now),
        TimerAction::Skip => timer.skip(now),
    };

    let mut human = HumanOutput::new(status_header(&status));
    human.push_summary("Remaining", format_clock(status.remaining_secs));
    human.push_summary(
        "Completed sessions",
        status.completed_sessions.to_string(),
    );
    human.push_notifications(app.drain_notifications());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        options.action.command(),
        &status,
        Some(&human),
    )
}

fn status_header(status: &TimerStatus) -> String {
    let state = if status.running { "running" } else { "paused" };
    format!("Timer: {} ({state})", status.phase.label())
}

/// `mm:ss`
fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }
}
