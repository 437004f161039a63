//! Notification backend seam.
//!
//! The platform notification registry (the OS scheduler on mobile, a
//! local SQLite table on desktop, nothing at all in a browser-embedded
//! context) sits behind [`NotificationBackend`]. The reminder manager
//! only talks to this trait.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::BackendError;
use crate::storage::data_dir;

/// A request to register one repeating daily notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderRequest {
    /// Habit id embedded in the payload so the entry can be found again.
    pub habit_id: String,
    pub habit_title: String,
    /// Trigger hour (already lead-time adjusted).
    pub hour: u8,
    /// Trigger minute (already lead-time adjusted).
    pub minute: u8,
}

impl ReminderRequest {
    /// Notification body shown to the user.
    pub fn body(&self) -> String {
        format!("Time to complete: {} (in 15 minutes)", self.habit_title)
    }
}

/// An entry currently registered with the platform scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledReminder {
    pub id: String,
    pub habit_id: String,
    pub habit_title: String,
    pub hour: u8,
    pub minute: u8,
}

/// Platform notification registry.
///
/// All methods take `&self`; implementations use interior mutability so
/// the reminder manager can be shared across async call sites.
pub trait NotificationBackend: Send + Sync {
    /// Whether this runtime supports local scheduling at all.
    fn supported(&self) -> bool {
        true
    }

    /// Register a repeating daily notification. Returns its identifier.
    fn schedule_daily(&self, request: &ReminderRequest) -> Result<String, BackendError>;

    /// Cancel one notification by identifier.
    fn cancel(&self, notification_id: &str) -> Result<(), BackendError>;

    /// All currently scheduled notifications.
    fn scheduled(&self) -> Result<Vec<ScheduledReminder>, BackendError>;

    /// Clear every scheduled notification regardless of habit.
    fn cancel_all(&self) -> Result<(), BackendError>;
}

impl NotificationBackend for Box<dyn NotificationBackend> {
    fn supported(&self) -> bool {
        self.as_ref().supported()
    }

    fn schedule_daily(&self, request: &ReminderRequest) -> Result<String, BackendError> {
        self.as_ref().schedule_daily(request)
    }

    fn cancel(&self, notification_id: &str) -> Result<(), BackendError> {
        self.as_ref().cancel(notification_id)
    }

    fn scheduled(&self) -> Result<Vec<ScheduledReminder>, BackendError> {
        self.as_ref().scheduled()
    }

    fn cancel_all(&self) -> Result<(), BackendError> {
        self.as_ref().cancel_all()
    }
}

/// Backend for runtimes without local scheduling (web, headless CI).
///
/// Every call short-circuits to a no-op; `schedule_daily` reports
/// [`BackendError::Unsupported`] so the manager can produce an
/// `Unsupported` outcome rather than a failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedBackend;

impl NotificationBackend for UnsupportedBackend {
    fn supported(&self) -> bool {
        false
    }

    fn schedule_daily(&self, _request: &ReminderRequest) -> Result<String, BackendError> {
        Err(BackendError::Unsupported)
    }

    fn cancel(&self, _notification_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    fn scheduled(&self) -> Result<Vec<ScheduledReminder>, BackendError> {
        Ok(Vec::new())
    }

    fn cancel_all(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// In-process registry for tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: Vec<ScheduledReminder>,
    next_id: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationBackend for MemoryBackend {
    fn schedule_daily(&self, request: &ReminderRequest) -> Result<String, BackendError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| BackendError::Registry("registry lock poisoned".into()))?;
        inner.next_id += 1;
        let id = format!("ntf-{}", inner.next_id);
        inner.entries.push(ScheduledReminder {
            id: id.clone(),
            habit_id: request.habit_id.clone(),
            habit_title: request.habit_title.clone(),
            hour: request.hour,
            minute: request.minute,
        });
        Ok(id)
    }

    fn cancel(&self, notification_id: &str) -> Result<(), BackendError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| BackendError::Registry("registry lock poisoned".into()))?;
        inner.entries.retain(|e| e.id != notification_id);
        Ok(())
    }

    fn scheduled(&self) -> Result<Vec<ScheduledReminder>, BackendError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| BackendError::Registry("registry lock poisoned".into()))?;
        Ok(inner.entries.clone())
    }

    fn cancel_all(&self) -> Result<(), BackendError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| BackendError::Registry("registry lock poisoned".into()))?;
        inner.entries.clear();
        Ok(())
    }
}

/// Persistent registry backed by the app database.
///
/// Stands in for the OS notification scheduler on desktop so reminders
/// survive process restarts and can be inspected from the CLI.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open the registry in `~/.config/habitloop/habitloop.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, BackendError> {
        let dir = data_dir().map_err(|e| BackendError::Registry(e.to_string()))?;
        let conn = Connection::open(dir.join("habitloop.db"))?;
        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.migrate()?;
        Ok(backend)
    }

    /// Open an in-memory registry (for tests).
    pub fn open_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()?;
        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.migrate()?;
        Ok(backend)
    }

    fn migrate(&self) -> Result<(), BackendError> {
        self.lock()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS reminders (
                id          TEXT PRIMARY KEY,
                habit_id    TEXT NOT NULL,
                habit_title TEXT NOT NULL,
                hour        INTEGER NOT NULL,
                minute      INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reminders_habit_id ON reminders(habit_id);",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, BackendError> {
        self.conn
            .lock()
            .map_err(|_| BackendError::Registry("registry lock poisoned".into()))
    }
}

impl NotificationBackend for SqliteBackend {
    fn schedule_daily(&self, request: &ReminderRequest) -> Result<String, BackendError> {
        let id = Uuid::new_v4().to_string();
        self.lock()?.execute(
            "INSERT INTO reminders (id, habit_id, habit_title, hour, minute)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                request.habit_id,
                request.habit_title,
                request.hour,
                request.minute,
            ],
        )?;
        Ok(id)
    }

    fn cancel(&self, notification_id: &str) -> Result<(), BackendError> {
        self.lock()?
            .execute("DELETE FROM reminders WHERE id = ?1", params![notification_id])?;
        Ok(())
    }

    fn scheduled(&self) -> Result<Vec<ScheduledReminder>, BackendError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, habit_id, habit_title, hour, minute FROM reminders")?;
        let rows = stmt.query_map([], |row| {
            Ok(ScheduledReminder {
                id: row.get(0)?,
                habit_id: row.get(1)?,
                habit_title: row.get(2)?,
                hour: row.get(3)?,
                minute: row.get(4)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn cancel_all(&self) -> Result<(), BackendError> {
        self.lock()?.execute("DELETE FROM reminders", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(habit_id: &str) -> ReminderRequest {
        ReminderRequest {
            habit_id: habit_id.into(),
            habit_title: "Drink water".into(),
            hour: 8,
            minute: 45,
        }
    }

    #[test]
    fn memory_backend_schedule_and_cancel() {
        let backend = MemoryBackend::new();
        let id = backend.schedule_daily(&request("h-1")).unwrap();
        assert_eq!(backend.scheduled().unwrap().len(), 1);
        backend.cancel(&id).unwrap();
        assert!(backend.scheduled().unwrap().is_empty());
    }

    #[test]
    fn sqlite_backend_persists_entries() {
        let backend = SqliteBackend::open_memory().unwrap();
        backend.schedule_daily(&request("h-1")).unwrap();
        backend.schedule_daily(&request("h-2")).unwrap();
        let entries = backend.scheduled().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hour, 8);
        assert_eq!(entries[0].minute, 45);
        backend.cancel_all().unwrap();
        assert!(backend.scheduled().unwrap().is_empty());
    }

    #[test]
    fn unsupported_backend_short_circuits() {
        let backend = UnsupportedBackend;
        assert!(!backend.supported());
        assert!(matches!(
            backend.schedule_daily(&request("h-1")),
            Err(BackendError::Unsupported)
        ));
        assert!(backend.cancel("whatever").is_ok());
        assert!(backend.scheduled().unwrap().is_empty());
    }

    #[test]
    fn request_body_names_the_habit() {
        assert_eq!(
            request("h-1").body(),
            "Time to complete: Drink water (in 15 minutes)"
        );
    }
}
