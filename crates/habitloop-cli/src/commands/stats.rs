//! Completion statistics commands.

use chrono::Local;
use clap::Subcommand;
use habitloop_core::{
    habit_stats, Config, HabitDb, HabitService, HabitStore, NotificationBackend, RemoteStore,
    Session,
};
use serde_json::json;

use super::notification_backend;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Per-habit streaks and completion rates
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session = Session::new(config.user_id.clone());
    let backend = notification_backend(&config)?;

    if config.remote.enabled {
        let store = RemoteStore::new(&config.remote)?;
        dispatch(HabitService::new(store, backend, session), action).await
    } else {
        let store = HabitDb::open()?;
        dispatch(HabitService::new(store, backend, session), action).await
    }
}

async fn dispatch<S: HabitStore, B: NotificationBackend>(
    service: HabitService<S, B>,
    action: StatsAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StatsAction::Show { json } => {
            let today = Local::now().date_naive();
            let habits = service.habits().await?;

            if json {
                let report: Vec<_> = habits
                    .iter()
                    .map(|habit| {
                        json!({
                            "id": habit.id,
                            "title": habit.title,
                            "stats": habit_stats(habit, today),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if habits.is_empty() {
                println!("No habits yet.");
            } else {
                for habit in &habits {
                    let stats = habit_stats(habit, today);
                    println!(
                        "{}: streak {}, last 7 days {}/7, total {}, rate {:.0}%",
                        habit.title,
                        stats.current_streak,
                        stats.last_week,
                        stats.total,
                        stats.completion_rate * 100.0
                    );
                }
            }
        }
    }
    Ok(())
}
