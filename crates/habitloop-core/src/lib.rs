//! # HabitLoop Core Library
//!
//! Core business logic for the HabitLoop habit tracker. All operations
//! are available through this library; the CLI binary is a thin layer
//! over the same types.
//!
//! ## Architecture
//!
//! - **Habit model**: records, per-day completions, drafts and partial
//!   updates, with validation ahead of any store call
//! - **Reminders**: trigger-time computation (15 minutes ahead of the
//!   configured time), a notification backend seam, and a lifecycle
//!   manager that keeps one scheduled notification per habit
//! - **Storage**: SQLite-based local store, a client for the hosted
//!   REST backend, and TOML-based configuration
//! - **Service**: the orchestrator that keeps store and reminders
//!   consistent across create/update/delete/toggle
//!
//! ## Key Components
//!
//! - [`HabitService`]: mutation orchestrator
//! - [`ReminderManager`]: reminder lifecycle manager
//! - [`HabitStore`]: persistence seam (local or remote)
//! - [`Config`]: application configuration management

pub mod error;
pub mod habit;
pub mod reminder;
pub mod service;
pub mod stats;
pub mod storage;

pub use error::{BackendError, ConfigError, CoreError, StoreError, ValidationError};
pub use habit::{
    Completion, Frequency, Habit, HabitColor, HabitDraft, HabitIcon, HabitPatch,
    DESCRIPTION_MAX_LEN, TITLE_MAX_LEN,
};
pub use reminder::{
    MemoryBackend, NotificationBackend, ReminderManager, ReminderRequest, ReminderTime,
    ScheduleOutcome, ScheduledReminder, SqliteBackend, UnsupportedBackend, REMINDER_LEAD_MINUTES,
};
pub use service::{HabitService, Session};
pub use stats::{habit_stats, HabitStats};
pub use storage::{Config, HabitDb, HabitStore, NotificationsConfig, RemoteConfig, RemoteStore};
