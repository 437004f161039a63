//! Reminder scheduling: trigger-time computation, the notification
//! backend seam, and the per-habit lifecycle manager.

pub mod backend;
pub mod manager;

pub use backend::{
    MemoryBackend, NotificationBackend, ReminderRequest, ScheduledReminder, SqliteBackend,
    UnsupportedBackend,
};
pub use manager::{ReminderManager, ScheduleOutcome};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Reminders fire this many minutes before the habit's configured time.
pub const REMINDER_LEAD_MINUTES: u32 = 15;

/// A wall-clock time of day in 24-hour form, parsed from "HH:MM".
///
/// Serializes back to the same "HH:MM" string the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

impl ReminderTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidReminderTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// The actual trigger time: exactly [`REMINDER_LEAD_MINUTES`] earlier,
    /// wrapping across the hour and across midnight. Repetition is daily,
    /// so "00:00" wrapping to "23:45" keeps the same daily semantics.
    pub fn trigger_time(&self) -> ReminderTime {
        let mut hour = i32::from(self.hour);
        let mut minute = i32::from(self.minute) - REMINDER_LEAD_MINUTES as i32;
        if minute < 0 {
            minute += 60;
            hour -= 1;
        }
        if hour < 0 {
            hour += 24;
        }
        ReminderTime {
            hour: hour as u8,
            minute: minute as u8,
        }
    }
}

impl Default for ReminderTime {
    /// The create form's default reminder time.
    fn default() -> Self {
        Self { hour: 9, minute: 0 }
    }
}

impl FromStr for ReminderTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidReminderTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(t: ReminderTime) -> String {
        t.to_string()
    }
}
