//! Scheduled reminder inspection commands.

use clap::Subcommand;
use habitloop_core::{Config, ReminderManager};

use super::notification_backend;

#[derive(Subcommand)]
pub enum RemindAction {
    /// List all scheduled reminders
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel the reminder for one habit
    Cancel {
        /// Habit ID
        habit_id: String,
    },
    /// Cancel every scheduled reminder
    CancelAll,
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let manager = ReminderManager::new(notification_backend(&config)?);

    match action {
        RemindAction::List { json } => {
            let entries = manager.scheduled();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No reminders scheduled.");
            } else {
                for entry in &entries {
                    println!(
                        "{:02}:{:02} daily -- {} (habit {})",
                        entry.hour, entry.minute, entry.habit_title, entry.habit_id
                    );
                }
            }
        }
        RemindAction::Cancel { habit_id } => {
            manager.cancel(&habit_id);
            println!("Reminder cancelled for habit {habit_id}");
        }
        RemindAction::CancelAll => {
            manager.cancel_all();
            println!("All reminders cancelled.");
        }
    }
    Ok(())
}
