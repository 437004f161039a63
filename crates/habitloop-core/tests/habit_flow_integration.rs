//! Integration tests for the habit create/update/delete flow with the
//! persistent notification registry.

use habitloop_core::{
    HabitDb, HabitDraft, HabitPatch, HabitService, ScheduleOutcome, Session, SqliteBackend,
    UnsupportedBackend,
};

fn service() -> HabitService<HabitDb, SqliteBackend> {
    HabitService::new(
        HabitDb::open_memory().expect("open db"),
        SqliteBackend::open_memory().expect("open registry"),
        Session::new("itest-user"),
    )
}

fn draft(title: &str, time: &str) -> HabitDraft {
    let mut draft = HabitDraft::new(title);
    draft.reminder_time = time.parse().expect("valid time");
    draft
}

#[tokio::test]
async fn full_lifecycle_keeps_store_and_registry_consistent() {
    let service = service();

    let (habit, outcome) = service.create(draft("Drink water", "09:00")).await.unwrap();
    assert!(outcome.is_scheduled());

    // Registry holds exactly one lead-adjusted trigger for the habit.
    let entries = service.reminders().scheduled_for(&habit.id);
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].hour, entries[0].minute), (8, 45));
    assert_eq!(entries[0].habit_title, "Drink water");

    // Retitle without touching the reminder: trigger stays put.
    let patch = HabitPatch {
        title: Some("Drink more water".into()),
        ..Default::default()
    };
    let (_, outcome) = service.update(&habit.id, patch).await.unwrap();
    assert!(outcome.is_none());
    assert_eq!(service.reminders().scheduled_for(&habit.id).len(), 1);

    // Move the reminder: old trigger replaced, not duplicated.
    let patch = HabitPatch {
        reminder_time: Some("10:00".parse().unwrap()),
        ..Default::default()
    };
    service.update(&habit.id, patch).await.unwrap();
    let entries = service.reminders().scheduled_for(&habit.id);
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].hour, entries[0].minute), (9, 45));

    // Complete today, then delete: everything for the id is gone.
    service.toggle_today(&habit.id).await.unwrap();
    service.delete(&habit.id).await.unwrap();
    assert!(service.habit(&habit.id).await.unwrap().is_none());
    assert!(service.reminders().scheduled_for(&habit.id).is_empty());
}

#[tokio::test]
async fn midnight_reminder_wraps_to_previous_evening() {
    let service = service();
    let (habit, _) = service.create(draft("Journal", "00:00")).await.unwrap();
    let entries = service.reminders().scheduled_for(&habit.id);
    assert_eq!((entries[0].hour, entries[0].minute), (23, 45));
}

#[tokio::test]
async fn rapid_double_schedule_stays_idempotent() {
    let service = service();
    let (habit, _) = service.create(draft("Stretch", "07:30")).await.unwrap();

    // Simulates a double-tap on save: schedule runs again for the same id.
    let stored = service.habit(&habit.id).await.unwrap().unwrap();
    service.reminders().schedule(&stored);
    service.reminders().schedule(&stored);

    assert_eq!(service.reminders().scheduled_for(&habit.id).len(), 1);
}

#[tokio::test]
async fn unsupported_runtime_never_blocks_the_store_flow() {
    let service = HabitService::new(
        HabitDb::open_memory().unwrap(),
        UnsupportedBackend,
        Session::new("itest-user"),
    );

    let (habit, outcome) = service.create(draft("Read", "21:00")).await.unwrap();
    assert_eq!(outcome, ScheduleOutcome::Unsupported);

    // Store side is fully functional regardless.
    assert!(service.toggle_today(&habit.id).await.unwrap());
    service.delete(&habit.id).await.unwrap();
    assert!(service.habits().await.unwrap().is_empty());
}
