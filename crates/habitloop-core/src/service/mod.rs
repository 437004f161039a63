//! Habit mutation orchestrator.
//!
//! Coordinates the habit store with the reminder manager so the two
//! stay consistent: persistence happens first and is fatal on failure,
//! reminder scheduling happens after and is always best-effort.

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::error::{CoreError, StoreError};
use crate::habit::{Habit, HabitDraft, HabitPatch};
use crate::reminder::{NotificationBackend, ReminderManager, ScheduleOutcome};
use crate::storage::HabitStore;

/// Explicit session context, built at sign-in. Replaces any process-wide
/// auth state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Coordinates habit persistence and reminder lifecycle.
pub struct HabitService<S: HabitStore, B: NotificationBackend> {
    store: S,
    reminders: ReminderManager<B>,
    session: Session,
}

impl<S: HabitStore, B: NotificationBackend> HabitService<S, B> {
    pub fn new(store: S, backend: B, session: Session) -> Self {
        Self {
            store,
            reminders: ReminderManager::new(backend),
            session,
        }
    }

    pub fn reminders(&self) -> &ReminderManager<B> {
        &self.reminders
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Create a habit: validate, persist, then schedule its reminder.
    ///
    /// If persistence fails nothing is scheduled and the error is
    /// surfaced. The schedule outcome is returned as data; a failed or
    /// unsupported schedule never fails the create.
    pub async fn create(&self, draft: HabitDraft) -> Result<(Habit, ScheduleOutcome), CoreError> {
        draft.validate()?;
        let habit = draft.into_habit(
            Uuid::new_v4().to_string(),
            self.session.user_id.clone(),
        );
        self.store.create_habit(&habit).await?;
        let outcome = self.reminders.schedule(&habit);
        Ok((habit, outcome))
    }

    /// Apply a partial update. When the patch touches the reminder time
    /// or the active flag, the reminder is rescheduled (still active) or
    /// cancelled (deactivated).
    pub async fn update(
        &self,
        id: &str,
        patch: HabitPatch,
    ) -> Result<(Habit, Option<ScheduleOutcome>), CoreError> {
        patch.validate()?;
        self.store.update_habit(id, &patch).await?;
        let habit = self
            .store
            .get_habit(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let outcome = if patch.touches_reminder() {
            if habit.is_active {
                Some(self.reminders.schedule(&habit))
            } else {
                self.reminders.cancel(id);
                None
            }
        } else {
            None
        };
        Ok((habit, outcome))
    }

    /// Delete a habit. Order matters: cancel the reminder first, then
    /// purge completions, then the habit record, so a mid-failure can
    /// leave a dangling row but never a live notification.
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.reminders.cancel(id);
        self.store.delete_completions(id).await?;
        self.store.delete_habit(id).await?;
        Ok(())
    }

    /// Flip the completion for (habit, today). Returns whether the habit
    /// is now completed. No reminder interaction.
    pub async fn toggle_today(&self, id: &str) -> Result<bool, CoreError> {
        self.toggle(id, Local::now().date_naive()).await
    }

    /// Flip the completion for (habit, date).
    pub async fn toggle(&self, id: &str, date: NaiveDate) -> Result<bool, CoreError> {
        Ok(self.store.toggle_completion(id, date).await?)
    }

    pub async fn habit(&self, id: &str) -> Result<Option<Habit>, CoreError> {
        Ok(self.store.get_habit(id).await?)
    }

    /// All habits for the session user, with nested completions.
    pub async fn habits(&self) -> Result<Vec<Habit>, CoreError> {
        Ok(self.store.list_habits(&self.session.user_id).await?)
    }

    /// Session teardown: clears every scheduled reminder.
    pub fn sign_out(&self) {
        self.reminders.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::habit::HabitPatch;
    use crate::reminder::MemoryBackend;
    use crate::storage::HabitDb;
    use async_trait::async_trait;

    fn service() -> HabitService<HabitDb, MemoryBackend> {
        HabitService::new(
            HabitDb::open_memory().unwrap(),
            MemoryBackend::new(),
            Session::new("u-1"),
        )
    }

    fn draft(title: &str, time: &str) -> HabitDraft {
        let mut draft = HabitDraft::new(title);
        draft.reminder_time = time.parse().unwrap();
        draft
    }

    #[tokio::test]
    async fn create_persists_and_schedules_lead_adjusted_trigger() {
        let service = service();
        let (habit, outcome) = service.create(draft("Drink water", "09:00")).await.unwrap();
        assert!(outcome.is_scheduled());
        assert_eq!(habit.user_id, "u-1");

        let entries = service.reminders().scheduled_for(&habit.id);
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].hour, entries[0].minute), (8, 45));
    }

    #[tokio::test]
    async fn create_rejects_invalid_title_before_any_store_write() {
        let service = service();
        let err = service.create(HabitDraft::new("")).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyTitle)
        ));
        assert!(service.habits().await.unwrap().is_empty());
        assert!(service.reminders().scheduled().is_empty());
    }

    #[tokio::test]
    async fn update_reminder_time_replaces_the_trigger() {
        let service = service();
        let (habit, _) = service.create(draft("Drink water", "09:00")).await.unwrap();

        let patch = HabitPatch {
            reminder_time: Some("10:00".parse().unwrap()),
            ..Default::default()
        };
        let (updated, outcome) = service.update(&habit.id, patch).await.unwrap();
        assert_eq!(updated.reminder_time.to_string(), "10:00");
        assert!(outcome.unwrap().is_scheduled());

        let entries = service.reminders().scheduled_for(&habit.id);
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].hour, entries[0].minute), (9, 45));
    }

    #[tokio::test]
    async fn update_without_reminder_fields_leaves_trigger_alone() {
        let service = service();
        let (habit, _) = service.create(draft("Drink water", "09:00")).await.unwrap();
        let before = service.reminders().scheduled_for(&habit.id);

        let patch = HabitPatch {
            title: Some("Drink more water".into()),
            ..Default::default()
        };
        let (_, outcome) = service.update(&habit.id, patch).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(service.reminders().scheduled_for(&habit.id), before);
    }

    #[tokio::test]
    async fn deactivating_cancels_the_reminder() {
        let service = service();
        let (habit, _) = service.create(draft("Drink water", "09:00")).await.unwrap();

        let patch = HabitPatch {
            is_active: Some(false),
            ..Default::default()
        };
        let (updated, outcome) = service.update(&habit.id, patch).await.unwrap();
        assert!(!updated.is_active);
        assert!(outcome.is_none());
        assert!(service.reminders().scheduled_for(&habit.id).is_empty());
    }

    #[tokio::test]
    async fn delete_purges_completions_and_reminder() {
        let service = service();
        let (habit, _) = service.create(draft("Drink water", "09:00")).await.unwrap();
        service
            .toggle(&habit.id, "2025-03-01".parse().unwrap())
            .await
            .unwrap();

        service.delete(&habit.id).await.unwrap();

        assert!(service.habit(&habit.id).await.unwrap().is_none());
        assert!(service.reminders().scheduled_for(&habit.id).is_empty());
        // Re-creating under the same id would surface stale completions;
        // the store-level test covers the purge directly as well.
        assert!(service.habits().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_twice_returns_to_original_state() {
        let service = service();
        let (habit, _) = service.create(draft("Stretch", "07:00")).await.unwrap();
        let date: NaiveDate = "2025-03-01".parse().unwrap();

        assert!(service.toggle(&habit.id, date).await.unwrap());
        assert!(!service.toggle(&habit.id, date).await.unwrap());

        let loaded = service.habit(&habit.id).await.unwrap().unwrap();
        assert!(!loaded.is_completed_on(date));
    }

    #[tokio::test]
    async fn sign_out_cancels_every_reminder() {
        let service = service();
        service.create(draft("A", "09:00")).await.unwrap();
        service.create(draft("B", "21:00")).await.unwrap();
        assert_eq!(service.reminders().scheduled().len(), 2);

        service.sign_out();
        assert!(service.reminders().scheduled().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_create_update_delete_consistency() {
        let service = service();

        // Create at 09:00: one trigger at 08:45 tagged with the new id.
        let (habit, outcome) = service.create(draft("Drink water", "09:00")).await.unwrap();
        assert!(outcome.is_scheduled());
        let entries = service.reminders().scheduled_for(&habit.id);
        assert_eq!((entries[0].hour, entries[0].minute), (8, 45));

        // Move to 10:00: the 08:45 trigger is gone, one at 09:45 remains.
        let patch = HabitPatch {
            reminder_time: Some("10:00".parse().unwrap()),
            ..Default::default()
        };
        service.update(&habit.id, patch).await.unwrap();
        let entries = service.reminders().scheduled_for(&habit.id);
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].hour, entries[0].minute), (9, 45));

        // Delete: no trigger, no completions, no habit.
        service.delete(&habit.id).await.unwrap();
        assert!(service.reminders().scheduled_for(&habit.id).is_empty());
        assert!(service.habit(&habit.id).await.unwrap().is_none());
    }

    /// Store that fails every call, for persist-then-schedule ordering.
    struct FailingStore;

    #[async_trait]
    impl HabitStore for FailingStore {
        async fn create_habit(&self, _habit: &Habit) -> Result<(), StoreError> {
            Err(StoreError::QueryFailed("backend offline".into()))
        }

        async fn update_habit(&self, _id: &str, _patch: &HabitPatch) -> Result<(), StoreError> {
            Err(StoreError::QueryFailed("backend offline".into()))
        }

        async fn delete_habit(&self, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::QueryFailed("backend offline".into()))
        }

        async fn delete_completions(&self, _habit_id: &str) -> Result<(), StoreError> {
            Err(StoreError::QueryFailed("backend offline".into()))
        }

        async fn get_habit(&self, _id: &str) -> Result<Option<Habit>, StoreError> {
            Err(StoreError::QueryFailed("backend offline".into()))
        }

        async fn list_habits(&self, _user_id: &str) -> Result<Vec<Habit>, StoreError> {
            Err(StoreError::QueryFailed("backend offline".into()))
        }

        async fn toggle_completion(
            &self,
            _habit_id: &str,
            _date: NaiveDate,
        ) -> Result<bool, StoreError> {
            Err(StoreError::QueryFailed("backend offline".into()))
        }
    }

    #[tokio::test]
    async fn store_failure_aborts_create_before_scheduling() {
        let service = HabitService::new(FailingStore, MemoryBackend::new(), Session::new("u-1"));
        let err = service
            .create(draft("Drink water", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
        assert!(service.reminders().scheduled().is_empty());
    }
}
