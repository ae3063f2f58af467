//! Composition root.
//!
//! Wires one store, one notification sink and one board view into the task
//! controller, the theme manager and the timer. Front ends build an [`App`]
//! per session and drain its notifications when they render.

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::controller::TaskController;
use crate::error::Result;
use crate::kv::{FileBackend, KvBackend, KvStore};
use crate::notify::{MemorySink, Notification, NotificationSink, Shown};
use crate::repository::TaskRepository;
use crate::shortcuts::{Shortcut, ShortcutAction, SHORTCUTS};
use crate::task::TaskLimits;
use crate::theme::ThemeManager;
use crate::timer::{TimerManager, TimerSettings, TimerStatus};
use crate::view::TaskBoard;

/// What a triggered shortcut asks the front end to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutOutcome {
    FocusSearch,
    OpenTaskForm,
    Timer(TimerStatus),
    Help(&'static [Shortcut]),
}

pub struct App {
    config: Config,
    sink: Rc<MemorySink>,
    board: Rc<TaskBoard>,
    tasks: TaskController,
    theme: ThemeManager,
    timer: TimerManager,
}

impl App {
    /// Open the app over `<data_dir>/store`, reading `studyflow.toml` if present
    pub fn open(data_dir: &Path) -> Result<Self> {
        let config = Config::load_from_dir(data_dir)?;
        let app = Self::with_backend(config, FileBackend::in_data_dir(data_dir));
        tracing::debug!(data_dir = %data_dir.display(), "opened app");
        Ok(app)
    }

    pub fn with_backend(config: Config, backend: impl KvBackend + 'static) -> Self {
        let store = Rc::new(KvStore::new(backend, config.storage.prefix.clone()));
        let sink = Rc::new(MemorySink::new(Duration::from_millis(
            config.notifications.default_duration_ms,
        )));
        let board = Rc::new(TaskBoard::new());

        let repo = TaskRepository::open(Rc::clone(&store), TaskLimits::from(&config.tasks));
        let mut tasks = TaskController::new(repo, sink.clone());
        tasks.subscribe(board.clone());

        let theme = ThemeManager::load(Rc::clone(&store), sink.clone(), config.ui.default_theme);
        let timer = TimerManager::load(store, sink.clone(), TimerSettings::from(&config.timer));

        Self {
            config,
            sink,
            board,
            tasks,
            theme,
            timer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tasks(&self) -> &TaskController {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskController {
        &mut self.tasks
    }

    pub fn theme(&self) -> &ThemeManager {
        &self.theme
    }

    pub fn theme_mut(&mut self) -> &mut ThemeManager {
        &mut self.theme
    }

    pub fn timer_mut(&mut self) -> &mut TimerManager {
        &mut self.timer
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    /// Raise a notification from outside the managed components
    pub fn notify(&self, notification: Notification) {
        self.sink.show(notification);
    }

    /// Take every notification raised so far
    pub fn drain_notifications(&self) -> Vec<Shown> {
        self.sink.drain()
    }

    pub fn trigger(&mut self, action: ShortcutAction, now: DateTime<Utc>) -> ShortcutOutcome {
        tracing::debug!(?action, "shortcut");
        match action {
            ShortcutAction::Search => ShortcutOutcome::FocusSearch,
            ShortcutAction::NewTask => ShortcutOutcome::OpenTaskForm,
            ShortcutAction::ToggleTimer => ShortcutOutcome::Timer(self.timer.toggle(now)),
            ShortcutAction::Help => ShortcutOutcome::Help(SHORTCUTS),
        }
    }
}
