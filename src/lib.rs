//! studyflow - study task planner library
//!
//! Core of the `studyflow` CLI: a small personal task list for students,
//! kept in a local key-value store, with a Pomodoro timer and a theme
//! preference on the side.
//!
//! # Core Concepts
//!
//! - **Tasks**: titled study items with category, priority, status and progress
//! - **Store adapter**: JSON over a byte store; storage failures never escape it
//! - **Repository**: the ordered, newest-first collection and its snapshot
//! - **Controller**: every task mutation, followed by view refresh and a notification
//! - **Notifications**: fire-and-forget messages with a display duration
//!
//! # Module Organization
//!
//! - `app`: Composition root shared by front ends
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `studyflow.toml`
//! - `controller`: Task lifecycle controller
//! - `error`: Error types and result aliases
//! - `kv`: Key-value store adapter and backends
//! - `lock`: File locking and atomic writes
//! - `notify`: Notifications and sinks
//! - `output`: Human and JSON command output
//! - `repository`: Task collection and persistence
//! - `shortcuts`: Keyboard shortcut table
//! - `task`: Task model and validation
//! - `theme`: Light/dark preference
//! - `timer`: Pomodoro timer
//! - `view`: Collection observers and list rendering

pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod kv;
pub mod lock;
pub mod notify;
pub mod output;
pub mod repository;
pub mod shortcuts;
pub mod task;
pub mod theme;
pub mod timer;
pub mod view;

pub use error::{Error, Result};
