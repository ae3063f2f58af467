//! Command-line interface for studyflow
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::App;
use crate::error::{Error, Result};

mod init;
mod shortcuts;
mod task;
mod theme;
mod timer;

/// studyflow - study task planner
///
/// Track study tasks, run Pomodoro focus sessions, and switch between light
/// and dark mode. Everything is stored in a local data directory.
#[derive(Parser, Debug)]
#[command(name = "studyflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "STUDYFLOW_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and a default studyflow.toml
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Light/dark theme
    #[command(subcommand)]
    Theme(ThemeCommands),

    /// Pomodoro focus timer
    #[command(subcommand)]
    Timer(TimerCommands),

    /// Show keyboard shortcuts, or trigger one
    Shortcuts {
        /// Chord to trigger, e.g. "ctrl+t"
        chord: Option<String>,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Category: study, assignment, exam-prep, reading, project, research, review, other
        #[arg(short, long, default_value = "study")]
        category: String,

        /// Priority: high, medium, low
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },

    /// List tasks, newest first
    List {
        /// Filter by status: todo, in-progress, completed
        #[arg(long)]
        status: Option<String>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter by priority
        #[arg(long)]
        priority: Option<String>,
    },

    /// Show one task
    Show {
        /// Task ID or unique prefix
        id: String,
    },

    /// Change fields of a task
    Update {
        /// Task ID or unique prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New priority
        #[arg(long)]
        priority: Option<String>,

        /// New status: todo, in-progress, completed
        #[arg(long)]
        status: Option<String>,

        /// Progress percentage (0-100)
        #[arg(long)]
        progress: Option<u8>,
    },

    /// Delete a task (deleting an unknown task is not an error)
    Delete {
        /// Task ID or unique prefix
        id: String,
    },

    /// Toggle a task between completed and to-do
    Toggle {
        /// Task ID or unique prefix
        id: String,
    },

    /// Search titles and descriptions
    Search {
        /// Text to look for (at least 2 characters)
        query: String,
    },
}

/// Theme subcommands
#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// Show the current theme
    Show,

    /// Switch between light and dark
    Toggle,

    /// Set the theme
    Set {
        /// light or dark
        theme: String,
    },
}

/// Timer subcommands
#[derive(Subcommand, Debug)]
pub enum TimerCommands {
    /// Show the current phase and remaining time
    Status,

    /// Start or resume the current phase
    Start,

    /// Pause the current phase
    Pause,

    /// Start if paused, pause if running
    Toggle,

    /// Stop and go back to the first focus session
    Reset,

    /// End the current phase now
    Skip,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let data_dir = resolve_data_dir(self.data_dir)?;
        let json = self.json;
        let quiet = self.quiet;

        match self.command {
            Commands::Init => init::run(init::InitOptions {
                data_dir,
                json,
                quiet,
            }),
            Commands::Task(cmd) => {
                let app = App::open(&data_dir)?;
                match cmd {
                    TaskCommands::Add {
                        title,
                        description,
                        category,
                        priority,
                    } => task::run_add(
                        app,
                        task::AddOptions {
                            title,
                            description,
                            category,
                            priority,
                            json,
                            quiet,
                        },
                    ),
                    TaskCommands::List {
                        status,
                        category,
                        priority,
                    } => task::run_list(
                        app,
                        task::ListOptions {
                            status,
                            category,
                            priority,
                            json,
                            quiet,
                        },
                    ),
                    TaskCommands::Show { id } => {
                        task::run_show(app, task::ShowOptions { id, json, quiet })
                    }
                    TaskCommands::Update {
                        id,
                        title,
                        description,
                        clear_description,
                        category,
                        priority,
                        status,
                        progress,
                    } => task::run_update(
                        app,
                        task::UpdateOptions {
                            id,
                            title,
                            description,
                            clear_description,
                            category,
                            priority,
                            status,
                            progress,
                            json,
                            quiet,
                        },
                    ),
                    TaskCommands::Delete { id } => {
                        task::run_delete(app, task::DeleteOptions { id, json, quiet })
                    }
                    TaskCommands::Toggle { id } => {
                        task::run_toggle(app, task::ToggleOptions { id, json, quiet })
                    }
                    TaskCommands::Search { query } => {
                        task::run_search(app, task::SearchOptions { query, json, quiet })
                    }
                }
            }
            Commands::Theme(cmd) => {
                let app = App::open(&data_dir)?;
                let action = match cmd {
                    ThemeCommands::Show => theme::ThemeAction::Show,
                    ThemeCommands::Toggle => theme::ThemeAction::Toggle,
                    ThemeCommands::Set { theme } => theme::ThemeAction::Set(theme.parse()?),
                };
                theme::run(app, theme::ThemeOptions { action, json, quiet })
            }
            Commands::Timer(cmd) => {
                let app = App::open(&data_dir)?;
                let action = match cmd {
                    TimerCommands::Status => timer::TimerAction::Status,
                    TimerCommands::Start => timer::TimerAction::Start,
                    TimerCommands::Pause => timer::TimerAction::Pause,
                    TimerCommands::Toggle => timer::TimerAction::Toggle,
                    TimerCommands::Reset => timer::TimerAction::Reset,
                    TimerCommands::Skip => timer::TimerAction::Skip,
                };
                timer::run(app, timer::TimerOptions { action, json, quiet })
            }
            Commands::Shortcuts { chord } => match chord {
                Some(chord) => {
                    let app = App::open(&data_dir)?;
                    shortcuts::run_trigger(app, shortcuts::TriggerOptions { chord, json, quiet })
                }
                None => shortcuts::run_list(json, quiet),
            },
        }
    }
}

/// `--data-dir`/`STUDYFLOW_DIR`, else the platform data directory
fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    directories::ProjectDirs::from("", "", "studyflow")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::OperationFailed(
                "could not determine a data directory; pass --data-dir".to_string(),
            )
        })
}
