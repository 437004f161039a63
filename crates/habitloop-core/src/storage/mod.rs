//! Persistence: the habit store seam plus its local SQLite and remote
//! REST implementations, and TOML-based configuration.

mod config;
pub mod habit_db;
pub mod remote;

pub use config::{Config, NotificationsConfig, RemoteConfig};
pub use habit_db::HabitDb;
pub use remote::RemoteStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::StoreError;
use crate::habit::{Habit, HabitPatch};

/// Returns `~/.config/habitloop[-dev]/` based on HABITLOOP_ENV.
///
/// Set HABITLOOP_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitloop-dev")
    } else {
        base_dir.join("habitloop")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// The habit persistence service, local or hosted.
///
/// Implementations are opaque collaborators: callers treat any failure
/// as fatal to the in-progress operation and never retry automatically.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Persist a new habit record (with any completions it carries).
    async fn create_habit(&self, habit: &Habit) -> Result<(), StoreError>;

    /// Apply a partial update to an existing habit.
    async fn update_habit(&self, id: &str, patch: &HabitPatch) -> Result<(), StoreError>;

    /// Delete the habit record itself.
    async fn delete_habit(&self, id: &str) -> Result<(), StoreError>;

    /// Purge every completion recorded for the habit.
    async fn delete_completions(&self, habit_id: &str) -> Result<(), StoreError>;

    /// Fetch one habit with its completions.
    async fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError>;

    /// All habits for a user, each with nested completions.
    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StoreError>;

    /// Idempotent per-day flip: removes the completion for
    /// (habit_id, date) if present, inserts it otherwise. Returns whether
    /// a completion exists afterwards.
    async fn toggle_completion(&self, habit_id: &str, date: NaiveDate) -> Result<bool, StoreError>;
}
