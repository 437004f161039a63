//! Habit management commands for CLI.

use clap::Subcommand;
use habitloop_core::{
    Config, Frequency, Habit, HabitColor, HabitDb, HabitDraft, HabitIcon, HabitPatch,
    HabitService, HabitStore, NotificationBackend, RemoteStore, ReminderTime, ScheduleOutcome,
    Session,
};
use std::io::Write;

use super::notification_backend;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit title (max 50 characters)
        title: String,
        /// Habit description (max 200 characters)
        #[arg(long)]
        description: Option<String>,
        /// Palette color (blue, green, orange, red, purple, teal, pink, yellow)
        #[arg(long)]
        color: Option<String>,
        /// Icon identifier (target, heart, zap, book, coffee, dumbbell,
        /// moon, sun, droplets, leaf, star, flame)
        #[arg(long, default_value = "target")]
        icon: String,
        /// Repeat frequency: daily, weekly, or custom
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Reminder time, HH:MM 24-hour (the notification fires 15
        /// minutes earlier)
        #[arg(long)]
        reminder: Option<String>,
    },
    /// List habits with today's completion state
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New palette color
        #[arg(long)]
        color: Option<String>,
        /// New icon identifier
        #[arg(long)]
        icon: Option<String>,
        /// New frequency
        #[arg(long)]
        frequency: Option<String>,
        /// New reminder time, HH:MM
        #[arg(long)]
        reminder: Option<String>,
        /// Activate or deactivate the habit
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a habit, its completions, and its reminder
    Delete {
        /// Habit ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Toggle the completion for a day (today by default)
    Toggle {
        /// Habit ID
        id: String,
        /// Date to toggle, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub async fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session = Session::new(config.user_id.clone());
    let backend = notification_backend(&config)?;

    if config.remote.enabled {
        let store = RemoteStore::new(&config.remote)?;
        dispatch(HabitService::new(store, backend, session), &config, action).await
    } else {
        let store = HabitDb::open()?;
        dispatch(HabitService::new(store, backend, session), &config, action).await
    }
}

async fn dispatch<S: HabitStore, B: NotificationBackend>(
    service: HabitService<S, B>,
    config: &Config,
    action: HabitAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HabitAction::Create {
            title,
            description,
            color,
            icon,
            frequency,
            reminder,
        } => {
            let mut draft = HabitDraft::new(title);
            draft.description = description;
            draft.color = color
                .unwrap_or_else(|| config.default_color.clone())
                .parse::<HabitColor>()?;
            draft.icon = icon.parse::<HabitIcon>()?;
            draft.frequency = frequency.parse::<Frequency>()?;
            draft.reminder_time = reminder
                .unwrap_or_else(|| config.default_reminder_time.clone())
                .parse::<ReminderTime>()?;

            let (habit, outcome) = service.create(draft).await?;
            println!("Habit created: {}", habit.id);
            print_outcome(&outcome);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { json } => {
            let habits = service.habits().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits yet.");
            } else {
                for habit in &habits {
                    println!("{}", habit_line(habit));
                }
            }
        }
        HabitAction::Get { id } => {
            match service.habit(&id).await? {
                Some(habit) => println!("{}", serde_json::to_string_pretty(&habit)?),
                None => return Err(format!("habit not found: {id}").into()),
            }
        }
        HabitAction::Update {
            id,
            title,
            description,
            color,
            icon,
            frequency,
            reminder,
            active,
        } => {
            let patch = HabitPatch {
                title,
                description,
                color: color.map(|c| c.parse::<HabitColor>()).transpose()?,
                icon: icon.map(|i| i.parse::<HabitIcon>()).transpose()?,
                frequency: frequency.map(|f| f.parse::<Frequency>()).transpose()?,
                reminder_time: reminder.map(|r| r.parse::<ReminderTime>()).transpose()?,
                is_active: active,
            };
            if patch.is_empty() {
                return Err("nothing to update: pass at least one field flag".into());
            }
            let (habit, outcome) = service.update(&id, patch).await?;
            println!("Habit updated: {}", habit.id);
            if let Some(outcome) = outcome {
                print_outcome(&outcome);
            }
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Delete { id, yes } => {
            let habit = service
                .habit(&id)
                .await?
                .ok_or_else(|| format!("habit not found: {id}"))?;
            if !yes && !confirm(&habit.title)? {
                println!("Aborted.");
                return Ok(());
            }
            service.delete(&id).await?;
            println!("Habit deleted: {id}");
        }
        HabitAction::Toggle { id, date } => {
            let completed = match date {
                Some(date) => service.toggle(&id, date.parse()?).await?,
                None => service.toggle_today(&id).await?,
            };
            if completed {
                println!("Marked as done.");
            } else {
                println!("Marked as not done.");
            }
        }
    }
    Ok(())
}

fn habit_line(habit: &Habit) -> String {
    let mark = if habit.is_completed_today() { "x" } else { " " };
    let state = if habit.is_active { "" } else { " (inactive)" };
    format!(
        "[{mark}] {} -- {} {} at {}{state}  ({})",
        habit.title,
        habit.icon,
        habit.frequency,
        habit.reminder_time,
        habit.id,
    )
}

fn print_outcome(outcome: &ScheduleOutcome) {
    match outcome {
        ScheduleOutcome::Scheduled(_) => println!("Reminder scheduled."),
        ScheduleOutcome::Unsupported => {
            println!("Reminders are unavailable on this platform; skipped.")
        }
        ScheduleOutcome::Failed(reason) => {
            println!("Reminder scheduling failed and was skipped: {reason}")
        }
    }
}

fn confirm(title: &str) -> Result<bool, Box<dyn std::error::Error>> {
    print!("Delete \"{title}\" and all its completion history? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
