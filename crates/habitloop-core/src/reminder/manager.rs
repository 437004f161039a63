//! Reminder lifecycle manager.
//!
//! Enforces at most one scheduled notification per habit id. Scheduling
//! is best-effort: backend failures are logged and degrade to no-ops so
//! they never block a habit create/update/delete flow.

use crate::error::BackendError;
use crate::habit::Habit;
use crate::reminder::backend::{NotificationBackend, ReminderRequest, ScheduledReminder};

/// Result of a schedule attempt. Failures are carried as data, not
/// errors, so callers can assert on no-op outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A notification was registered under this identifier.
    Scheduled(String),
    /// The runtime has no local scheduler; nothing was registered.
    Unsupported,
    /// The platform call failed; nothing is registered for the habit.
    Failed(String),
}

impl ScheduleOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleOutcome::Scheduled(_))
    }
}

/// Owns the notification backend and keeps the one-reminder-per-habit
/// invariant.
pub struct ReminderManager<B: NotificationBackend> {
    backend: B,
}

impl<B: NotificationBackend> ReminderManager<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Register the daily reminder for a habit, replacing any existing
    /// entry for the same habit id. The trigger fires at the habit's
    /// reminder time minus the lead offset.
    pub fn schedule(&self, habit: &Habit) -> ScheduleOutcome {
        if !self.backend.supported() {
            return ScheduleOutcome::Unsupported;
        }

        // Cancel-before-reschedule keeps double invocations idempotent.
        self.cancel(&habit.id);

        let trigger = habit.reminder_time.trigger_time();
        let request = ReminderRequest {
            habit_id: habit.id.clone(),
            habit_title: habit.title.clone(),
            hour: trigger.hour(),
            minute: trigger.minute(),
        };

        match self.backend.schedule_daily(&request) {
            Ok(id) => {
                log::debug!(
                    "scheduled daily reminder {id} for habit {} at {trigger}",
                    habit.id
                );
                ScheduleOutcome::Scheduled(id)
            }
            Err(BackendError::Unsupported) => ScheduleOutcome::Unsupported,
            Err(e) => {
                log::warn!("failed to schedule reminder for habit {}: {e}", habit.id);
                ScheduleOutcome::Failed(e.to_string())
            }
        }
    }

    /// Cancel every notification tagged with the habit id. A no-op if
    /// none exist or the backend query fails.
    pub fn cancel(&self, habit_id: &str) {
        if !self.backend.supported() {
            return;
        }
        let entries = match self.backend.scheduled() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("failed to query scheduled reminders: {e}");
                return;
            }
        };
        for entry in entries.iter().filter(|e| e.habit_id == habit_id) {
            if let Err(e) = self.backend.cancel(&entry.id) {
                log::warn!("failed to cancel reminder {} for habit {habit_id}: {e}", entry.id);
            }
        }
    }

    /// Clear every scheduled notification. Used on global reset and
    /// sign-out.
    pub fn cancel_all(&self) {
        if let Err(e) = self.backend.cancel_all() {
            log::warn!("failed to cancel all reminders: {e}");
        }
    }

    /// All currently scheduled notifications, empty on query failure.
    pub fn scheduled(&self) -> Vec<ScheduledReminder> {
        self.backend.scheduled().unwrap_or_else(|e| {
            log::warn!("failed to query scheduled reminders: {e}");
            Vec::new()
        })
    }

    /// Scheduled notifications tagged with the given habit id.
    pub fn scheduled_for(&self, habit_id: &str) -> Vec<ScheduledReminder> {
        self.scheduled()
            .into_iter()
            .filter(|e| e.habit_id == habit_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitDraft;
    use crate::reminder::backend::{MemoryBackend, UnsupportedBackend};

    fn habit(id: &str, time: &str) -> Habit {
        let mut draft = HabitDraft::new("Drink water");
        draft.reminder_time = time.parse().unwrap();
        draft.into_habit(id.into(), "u-1".into())
    }

    struct FailingBackend;

    impl NotificationBackend for FailingBackend {
        fn schedule_daily(&self, _request: &ReminderRequest) -> Result<String, BackendError> {
            Err(BackendError::Registry("registry unavailable".into()))
        }

        fn cancel(&self, _notification_id: &str) -> Result<(), BackendError> {
            Err(BackendError::Registry("registry unavailable".into()))
        }

        fn scheduled(&self) -> Result<Vec<ScheduledReminder>, BackendError> {
            Err(BackendError::Registry("registry unavailable".into()))
        }

        fn cancel_all(&self) -> Result<(), BackendError> {
            Err(BackendError::Registry("registry unavailable".into()))
        }
    }

    #[test]
    fn schedule_uses_lead_adjusted_trigger() {
        let manager = ReminderManager::new(MemoryBackend::new());
        let outcome = manager.schedule(&habit("h-1", "09:00"));
        assert!(outcome.is_scheduled());
        let entries = manager.scheduled_for("h-1");
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].hour, entries[0].minute), (8, 45));
    }

    #[test]
    fn schedule_twice_leaves_one_entry() {
        let manager = ReminderManager::new(MemoryBackend::new());
        manager.schedule(&habit("h-1", "09:00"));
        manager.schedule(&habit("h-1", "10:00"));
        let entries = manager.scheduled_for("h-1");
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].hour, entries[0].minute), (9, 45));
    }

    #[test]
    fn cancel_only_touches_matching_habit() {
        let manager = ReminderManager::new(MemoryBackend::new());
        manager.schedule(&habit("h-1", "09:00"));
        manager.schedule(&habit("h-2", "21:00"));
        manager.cancel("h-1");
        assert!(manager.scheduled_for("h-1").is_empty());
        assert_eq!(manager.scheduled_for("h-2").len(), 1);
    }

    #[test]
    fn cancel_without_entries_is_a_noop() {
        let manager = ReminderManager::new(MemoryBackend::new());
        manager.cancel("h-missing");
        assert!(manager.scheduled().is_empty());
    }

    #[test]
    fn cancel_all_clears_every_habit() {
        let manager = ReminderManager::new(MemoryBackend::new());
        manager.schedule(&habit("h-1", "09:00"));
        manager.schedule(&habit("h-2", "21:00"));
        manager.cancel_all();
        assert!(manager.scheduled().is_empty());
    }

    #[test]
    fn unsupported_runtime_yields_unsupported_outcome() {
        let manager = ReminderManager::new(UnsupportedBackend);
        assert_eq!(
            manager.schedule(&habit("h-1", "09:00")),
            ScheduleOutcome::Unsupported
        );
        manager.cancel("h-1");
        assert!(manager.scheduled().is_empty());
    }

    #[test]
    fn backend_failure_degrades_to_failed_outcome() {
        let manager = ReminderManager::new(FailingBackend);
        let outcome = manager.schedule(&habit("h-1", "09:00"));
        assert!(matches!(outcome, ScheduleOutcome::Failed(_)));
        // Cancel paths swallow the failure too.
        manager.cancel("h-1");
        manager.cancel_all();
        assert!(manager.scheduled().is_empty());
    }
}
