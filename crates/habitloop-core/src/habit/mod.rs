//! Habit data model: records, completions, drafts, and partial updates.
//!
//! Field names serialize as camelCase to match the hosted backend schema.
//! Icon and color identifiers are closed enumerations -- unknown values
//! fail validation at parse time instead of silently falling back.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::reminder::ReminderTime;

/// Maximum habit title length in characters.
pub const TITLE_MAX_LEN: usize = 50;
/// Maximum habit description length in characters.
pub const DESCRIPTION_MAX_LEN: usize = 200;

/// How often a habit repeats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Custom => "custom",
        }
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "custom" => Ok(Frequency::Custom),
            other => Err(ValidationError::UnknownFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed palette of habit card colors.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitColor {
    #[default]
    Blue,
    Green,
    Orange,
    Red,
    Purple,
    Teal,
    Pink,
    Yellow,
}

impl HabitColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitColor::Blue => "blue",
            HabitColor::Green => "green",
            HabitColor::Orange => "orange",
            HabitColor::Red => "red",
            HabitColor::Purple => "purple",
            HabitColor::Teal => "teal",
            HabitColor::Pink => "pink",
            HabitColor::Yellow => "yellow",
        }
    }

    /// Hex value rendered by the card UI.
    pub fn as_hex(&self) -> &'static str {
        match self {
            HabitColor::Blue => "#007AFF",
            HabitColor::Green => "#34C759",
            HabitColor::Orange => "#FF9500",
            HabitColor::Red => "#FF3B30",
            HabitColor::Purple => "#AF52DE",
            HabitColor::Teal => "#5AC8FA",
            HabitColor::Pink => "#FF2D55",
            HabitColor::Yellow => "#FFCC00",
        }
    }

    pub fn all() -> &'static [HabitColor] {
        &[
            HabitColor::Blue,
            HabitColor::Green,
            HabitColor::Orange,
            HabitColor::Red,
            HabitColor::Purple,
            HabitColor::Teal,
            HabitColor::Pink,
            HabitColor::Yellow,
        ]
    }
}

impl FromStr for HabitColor {
    type Err = ValidationError;

    /// Accepts either the palette name or its hex value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for color in Self::all() {
            if s.eq_ignore_ascii_case(color.as_str()) || s.eq_ignore_ascii_case(color.as_hex()) {
                return Ok(*color);
            }
        }
        Err(ValidationError::UnknownColor(s.to_string()))
    }
}

impl fmt::Display for HabitColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of habit icon identifiers.
///
/// Unknown identifiers are a validation failure, not a fallback to a
/// default glyph.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitIcon {
    #[default]
    Target,
    Heart,
    Zap,
    Book,
    Coffee,
    Dumbbell,
    Moon,
    Sun,
    Droplets,
    Leaf,
    Star,
    Flame,
}

impl HabitIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitIcon::Target => "target",
            HabitIcon::Heart => "heart",
            HabitIcon::Zap => "zap",
            HabitIcon::Book => "book",
            HabitIcon::Coffee => "coffee",
            HabitIcon::Dumbbell => "dumbbell",
            HabitIcon::Moon => "moon",
            HabitIcon::Sun => "sun",
            HabitIcon::Droplets => "droplets",
            HabitIcon::Leaf => "leaf",
            HabitIcon::Star => "star",
            HabitIcon::Flame => "flame",
        }
    }

    pub fn all() -> &'static [HabitIcon] {
        &[
            HabitIcon::Target,
            HabitIcon::Heart,
            HabitIcon::Zap,
            HabitIcon::Book,
            HabitIcon::Coffee,
            HabitIcon::Dumbbell,
            HabitIcon::Moon,
            HabitIcon::Sun,
            HabitIcon::Droplets,
            HabitIcon::Leaf,
            HabitIcon::Star,
            HabitIcon::Flame,
        ]
    }
}

impl FromStr for HabitIcon {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for icon in Self::all() {
            if s.eq_ignore_ascii_case(icon.as_str()) {
                return Ok(*icon);
            }
        }
        Err(ValidationError::UnknownIcon(s.to_string()))
    }
}

impl fmt::Display for HabitIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that a habit was done on a specific calendar date.
///
/// At most one completion exists per (habit_id, date) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// Calendar date, serialized "YYYY-MM-DD"
    pub date: NaiveDate,
    pub habit_id: String,
}

/// A user-defined recurring task tracked for daily completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub color: HabitColor,
    pub icon: HabitIcon,
    #[serde(default)]
    pub frequency: Frequency,
    pub reminder_time: ReminderTime,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub completions: Vec<Completion>,
}

impl Habit {
    /// Whether this habit counts as done on the given local calendar date.
    ///
    /// True iff some completion carries exactly that date. Completions on
    /// other dates never affect the result.
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completions.iter().any(|c| c.date == date)
    }

    /// Whether this habit counts as done today (local calendar date).
    pub fn is_completed_today(&self) -> bool {
        self.is_completed_on(Local::now().date_naive())
    }
}

/// Input for the create flow. Title is required, everything else defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: HabitColor,
    #[serde(default)]
    pub icon: HabitIcon,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub reminder_time: ReminderTime,
}

impl HabitDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            color: HabitColor::default(),
            icon: HabitIcon::default(),
            frequency: Frequency::default(),
            reminder_time: ReminderTime::default(),
        }
    }

    /// Check the length constraints. Runs before any store call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())?;
        Ok(())
    }

    /// Build the persisted record. Title and description are trimmed;
    /// new habits start active with no completions.
    pub fn into_habit(self, id: String, user_id: String) -> Habit {
        Habit {
            id,
            user_id,
            title: self.title.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            color: self.color,
            icon: self.icon,
            frequency: self.frequency,
            reminder_time: self.reminder_time,
            created_at: Utc::now(),
            is_active: true,
            completions: Vec::new(),
        }
    }
}

/// Partial update for the edit flow. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HabitColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<HabitIcon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<ReminderTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.icon.is_none()
            && self.frequency.is_none()
            && self.reminder_time.is_none()
            && self.is_active.is_none()
    }

    /// Whether applying this patch requires the reminder to be
    /// rescheduled or cancelled.
    pub fn touches_reminder(&self) -> bool {
        self.reminder_time.is_some() || self.is_active.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_description(self.description.as_deref())?;
        Ok(())
    }

    /// Apply the patched fields to a habit in place.
    pub fn apply(&self, habit: &mut Habit) {
        if let Some(title) = &self.title {
            habit.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            let trimmed = description.trim();
            habit.description = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(color) = self.color {
            habit.color = color;
        }
        if let Some(icon) = self.icon {
            habit.icon = icon;
        }
        if let Some(frequency) = self.frequency {
            habit.frequency = frequency;
        }
        if let Some(reminder_time) = self.reminder_time {
            habit.reminder_time = reminder_time;
        }
        if let Some(is_active) = self.is_active {
            habit.is_active = is_active;
        }
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let len = trimmed.chars().count();
    if len > TITLE_MAX_LEN {
        return Err(ValidationError::TitleTooLong {
            len,
            max: TITLE_MAX_LEN,
        });
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), ValidationError> {
    if let Some(description) = description {
        let len = description.trim().chars().count();
        if len > DESCRIPTION_MAX_LEN {
            return Err(ValidationError::DescriptionTooLong {
                len,
                max: DESCRIPTION_MAX_LEN,
            });
        }
    }
    Ok(())
}
