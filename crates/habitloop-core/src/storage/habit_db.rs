//! SQLite-backed habit store.
//!
//! Local persistence for habits and their per-day completions. The
//! completions table carries a (habit_id, date) primary key, so the
//! one-completion-per-day invariant holds at the schema level.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::sync::{Mutex, MutexGuard};

use super::data_dir;
use crate::error::StoreError;
use crate::habit::{Completion, Frequency, Habit, HabitColor, HabitIcon, HabitPatch};
use crate::reminder::ReminderTime;
use crate::storage::HabitStore;

/// Parse datetime from RFC3339 string with fallback to current time.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Raw habit row before enum fields are parsed.
struct HabitRow {
    id: String,
    user_id: String,
    title: String,
    description: Option<String>,
    color: String,
    icon: String,
    frequency: String,
    reminder_time: String,
    created_at: String,
    is_active: bool,
}

impl HabitRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(HabitRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            color: row.get(4)?,
            icon: row.get(5)?,
            frequency: row.get(6)?,
            reminder_time: row.get(7)?,
            created_at: row.get(8)?,
            is_active: row.get(9)?,
        })
    }

    fn into_habit(self, completions: Vec<Completion>) -> Result<Habit, StoreError> {
        let parse = |what: &str, err: String| StoreError::QueryFailed(format!("{what}: {err}"));
        Ok(Habit {
            color: self
                .color
                .parse::<HabitColor>()
                .map_err(|e| parse("bad color column", e.to_string()))?,
            icon: self
                .icon
                .parse::<HabitIcon>()
                .map_err(|e| parse("bad icon column", e.to_string()))?,
            frequency: self
                .frequency
                .parse::<Frequency>()
                .map_err(|e| parse("bad frequency column", e.to_string()))?,
            reminder_time: self
                .reminder_time
                .parse::<ReminderTime>()
                .map_err(|e| parse("bad reminder_time column", e.to_string()))?,
            created_at: parse_datetime_fallback(&self.created_at),
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            is_active: self.is_active,
            completions,
        })
    }
}

const HABIT_COLUMNS: &str =
    "id, user_id, title, description, color, icon, frequency, reminder_time, created_at, is_active";

/// SQLite database holding habits and completions.
pub struct HabitDb {
    conn: Mutex<Connection>,
}

impl HabitDb {
    /// Open the database at `~/.config/habitloop/habitloop.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .join("habitloop.db");
        let conn = Connection::open(&path).map_err(|source| StoreError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and embedders).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.lock()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS habits (
                id            TEXT PRIMARY KEY,
                user_id       TEXT NOT NULL,
                title         TEXT NOT NULL,
                description   TEXT,
                color         TEXT NOT NULL,
                icon          TEXT NOT NULL,
                frequency     TEXT NOT NULL,
                reminder_time TEXT NOT NULL,
                created_at    TEXT NOT NULL,
                is_active     INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS completions (
                habit_id TEXT NOT NULL,
                date     TEXT NOT NULL,
                PRIMARY KEY (habit_id, date)
            );

            CREATE INDEX IF NOT EXISTS idx_habits_user_id ON habits(user_id);
            CREATE INDEX IF NOT EXISTS idx_completions_habit_id ON completions(habit_id);",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::QueryFailed("connection lock poisoned".into()))
    }

    fn completions_for(
        conn: &Connection,
        habit_id: &str,
    ) -> Result<Vec<Completion>, rusqlite::Error> {
        let mut stmt =
            conn.prepare("SELECT habit_id, date FROM completions WHERE habit_id = ?1 ORDER BY date")?;
        let rows = stmt.query_map(params![habit_id], |row| {
            let habit_id: String = row.get(0)?;
            let date_str: String = row.get(1)?;
            Ok((habit_id, date_str))
        })?;
        let mut completions = Vec::new();
        for row in rows {
            let (habit_id, date_str) = row?;
            if let Ok(date) = date_str.parse::<NaiveDate>() {
                completions.push(Completion { date, habit_id });
            }
        }
        Ok(completions)
    }

    fn get_habit_sync(&self, id: &str) -> Result<Option<Habit>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], HabitRow::from_row)?;
        let raw = match rows.next() {
            Some(row) => row?,
            None => return Ok(None),
        };
        let completions = Self::completions_for(&conn, id)?;
        Ok(Some(raw.into_habit(completions)?))
    }
}

#[async_trait]
impl HabitStore for HabitDb {
    async fn create_habit(&self, habit: &Habit) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO habits (id, user_id, title, description, color, icon, frequency,
                                 reminder_time, created_at, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                habit.id,
                habit.user_id,
                habit.title,
                habit.description,
                habit.color.as_str(),
                habit.icon.as_str(),
                habit.frequency.as_str(),
                habit.reminder_time.to_string(),
                habit.created_at.to_rfc3339(),
                habit.is_active,
            ],
        )?;
        for completion in &habit.completions {
            conn.execute(
                "INSERT OR IGNORE INTO completions (habit_id, date) VALUES (?1, ?2)",
                params![habit.id, completion.date.to_string()],
            )?;
        }
        Ok(())
    }

    async fn update_habit(&self, id: &str, patch: &HabitPatch) -> Result<(), StoreError> {
        // Read-modify-write keeps overlapping updates last-write-wins.
        let mut habit = self
            .get_habit_sync(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(&mut habit);
        let updated = self.lock()?.execute(
            "UPDATE habits
             SET title = ?2, description = ?3, color = ?4, icon = ?5, frequency = ?6,
                 reminder_time = ?7, is_active = ?8
             WHERE id = ?1",
            params![
                id,
                habit.title,
                habit.description,
                habit.color.as_str(),
                habit.icon.as_str(),
                habit.frequency.as_str(),
                habit.reminder_time.to_string(),
                habit.is_active,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_habit(&self, id: &str) -> Result<(), StoreError> {
        self.lock()?
            .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        Ok(())
    }

    async fn delete_completions(&self, habit_id: &str) -> Result<(), StoreError> {
        self.lock()?
            .execute("DELETE FROM completions WHERE habit_id = ?1", params![habit_id])?;
        Ok(())
    }

    async fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError> {
        self.get_habit_sync(id)
    }

    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![user_id], HabitRow::from_row)?;
        let mut raws = Vec::new();
        for row in rows {
            raws.push(row?);
        }
        drop(stmt);
        let mut habits = Vec::with_capacity(raws.len());
        for raw in raws {
            let completions = Self::completions_for(&conn, &raw.id)?;
            habits.push(raw.into_habit(completions)?);
        }
        Ok(habits)
    }

    async fn toggle_completion(&self, habit_id: &str, date: NaiveDate) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM completions WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, date.to_string()],
        )?;
        if removed > 0 {
            return Ok(false);
        }
        conn.execute(
            "INSERT INTO completions (habit_id, date) VALUES (?1, ?2)",
            params![habit_id, date.to_string()],
        )?;
        Ok(true)
    }
}
