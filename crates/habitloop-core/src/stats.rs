//! Completion statistics: streaks, recent activity, and completion rate.
//!
//! Pure functions over a habit's completion set. Dates are local
//! calendar dates; callers pass "today" in so the math stays testable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::habit::{Completion, Habit};

/// Per-habit analytics summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitStats {
    /// Consecutive completed days ending today (or yesterday, when
    /// today is still open).
    pub current_streak: u32,
    /// Completions in the last 7 days, today included.
    pub last_week: usize,
    /// All-time completion count.
    pub total: usize,
    /// Completions divided by days since creation, 0.0 to 1.0.
    pub completion_rate: f64,
}

/// Length of the run of consecutive completed days ending at `today`.
///
/// A day without a completion breaks the run, except that an
/// uncompleted `today` doesn't: the streak then counts back from
/// yesterday, so an unbroken chain isn't reported as zero before the
/// user has had a chance to check in.
pub fn current_streak(completions: &[Completion], today: NaiveDate) -> u32 {
    let dates: HashSet<NaiveDate> = completions.iter().map(|c| c.date).collect();

    let mut day = if dates.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while dates.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Completions within the window of `days` days ending at `today`.
pub fn completions_in_last(completions: &[Completion], today: NaiveDate, days: u32) -> usize {
    completions
        .iter()
        .filter(|c| {
            c.date <= today && (today - c.date).num_days() < i64::from(days)
        })
        .count()
}

/// Completions per day since the habit was created, clamped to 1.0.
pub fn completion_rate(habit: &Habit, today: NaiveDate) -> f64 {
    let created = habit.created_at.date_naive();
    let days_tracked = (today - created).num_days().max(0) + 1;
    let done = habit
        .completions
        .iter()
        .filter(|c| c.date <= today)
        .count();
    (done as f64 / days_tracked as f64).min(1.0)
}

/// Full analytics summary for one habit.
pub fn habit_stats(habit: &Habit, today: NaiveDate) -> HabitStats {
    HabitStats {
        current_streak: current_streak(&habit.completions, today),
        last_week: completions_in_last(&habit.completions, today, 7),
        total: habit.completions.len(),
        completion_rate: completion_rate(habit, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitDraft;

    fn completions(dates: &[&str]) -> Vec<Completion> {
        dates
            .iter()
            .map(|d| Completion {
                date: d.parse().unwrap(),
                habit_id: "h-1".into(),
            })
            .collect()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let c = completions(&["2025-03-01", "2025-03-02", "2025-03-03"]);
        assert_eq!(current_streak(&c, date("2025-03-03")), 3);
    }

    #[test]
    fn streak_survives_an_open_today() {
        let c = completions(&["2025-03-01", "2025-03-02"]);
        assert_eq!(current_streak(&c, date("2025-03-03")), 2);
    }

    #[test]
    fn streak_breaks_on_a_missed_day() {
        let c = completions(&["2025-03-01", "2025-03-03"]);
        assert_eq!(current_streak(&c, date("2025-03-03")), 1);
        assert_eq!(current_streak(&c, date("2025-03-05")), 0);
    }

    #[test]
    fn streak_of_empty_set_is_zero() {
        assert_eq!(current_streak(&[], date("2025-03-03")), 0);
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let c = completions(&["2025-02-27", "2025-02-28", "2025-03-01"]);
        assert_eq!(current_streak(&c, date("2025-03-01")), 3);
    }

    #[test]
    fn last_week_window_excludes_older_dates() {
        let c = completions(&["2025-03-01", "2025-03-07", "2025-03-08"]);
        // Window for 2025-03-08 spans 03-02 through 03-08.
        assert_eq!(completions_in_last(&c, date("2025-03-08"), 7), 2);
    }

    #[test]
    fn rate_counts_days_since_creation() {
        let mut habit = HabitDraft::new("Read").into_habit("h-1".into(), "u-1".into());
        habit.created_at = "2025-03-01T08:00:00Z".parse().unwrap();
        habit.completions = completions(&["2025-03-01", "2025-03-02"]);
        // 2 completions over 4 tracked days.
        let rate = completion_rate(&habit, date("2025-03-04"));
        assert!((rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_is_clamped_to_one() {
        let mut habit = HabitDraft::new("Read").into_habit("h-1".into(), "u-1".into());
        habit.created_at = "2025-03-04T08:00:00Z".parse().unwrap();
        habit.completions = completions(&["2025-03-01", "2025-03-02", "2025-03-04"]);
        assert!((completion_rate(&habit, date("2025-03-04")) - 1.0).abs() < f64::EPSILON);
    }
}
