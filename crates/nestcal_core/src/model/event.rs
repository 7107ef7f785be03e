//! One-off calendar event domain model.
//!
//! # Responsibility
//! - Define the canonical user-created event record and its request models.
//! - Keep date and time-of-day as validated value types, never raw strings.
//!
//! # Invariants
//! - `id` is stable and never reused for another event.
//! - `date` carries no time-of-day component; two events fall on the same
//!   calendar day exactly when their `date` values are equal.
//! - `time` is a wall-clock time of day; its `Ord` matches the zero-padded
//!   `HH:MM` lexicographic order the agenda sorts by.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every stored one-off event.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EventId = Uuid;

/// Commitment category for schedule entries.
///
/// The set mirrors the dashboard's fixed category palette; categories are
/// display metadata only and carry no scheduling semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Class,
    Meeting,
    Quals,
    Dissertation,
    Reports,
    Wellness,
    Other,
}

impl Category {
    /// Stable lowercase token used for storage and boundary exchange.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Meeting => "meeting",
            Self::Quals => "quals",
            Self::Dissertation => "dissertation",
            Self::Reports => "reports",
            Self::Wellness => "wellness",
            Self::Other => "other",
        }
    }

    /// Parses a storage/boundary token back into a category.
    pub fn from_slug(value: &str) -> Option<Self> {
        match value {
            "class" => Some(Self::Class),
            "meeting" => Some(Self::Meeting),
            "quals" => Some(Self::Quals),
            "dissertation" => Some(Self::Dissertation),
            "reports" => Some(Self::Reports),
            "wellness" => Some(Self::Wellness),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Human-readable label used by list and detail views.
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Meeting => "Meeting",
            Self::Quals => "Quals",
            Self::Dissertation => "Dissertation",
            Self::Reports => "Reports",
            Self::Wellness => "Wellness",
            Self::Other => "Other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

/// Validation error for event write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title must not be empty"),
        }
    }
}

impl Error for EventValidationError {}

/// Canonical user-created ("one-off") calendar event.
///
/// One-off events are the only mutable schedule data; recurring commitments
/// live in [`crate::model::recurring::WeeklyRules`] and are never stored
/// per-instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable global ID assigned at creation time.
    pub id: EventId,
    pub title: String,
    /// Calendar day the event falls on (local wall-clock date, no zone).
    pub date: NaiveDate,
    /// Wall-clock start time. Present even for all-day entries, where it is
    /// ignored by agenda ordering.
    pub time: NaiveTime,
    /// Free-text duration label ("1 hour", "15 min"); never parsed.
    pub duration: String,
    pub category: Category,
    pub all_day: bool,
}

impl CalendarEvent {
    /// Creates a new event with a generated stable ID.
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        duration: impl Into<String>,
        category: Category,
        all_day: bool,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, date, time, duration, category, all_day)
    }

    /// Creates an event with a caller-provided stable ID.
    ///
    /// Used by import/restore paths where identity already exists externally.
    pub fn with_id(
        id: EventId,
        title: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        duration: impl Into<String>,
        category: Category,
        all_day: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            date,
            time,
            duration: duration.into(),
            category,
            all_day,
        }
    }

    /// Validates invariants that must hold before persistence.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Request model for creating a one-off event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: String,
    pub category: Category,
    pub all_day: bool,
}

impl EventDraft {
    /// Materializes the draft into an event with a fresh stable ID.
    pub fn into_event(self) -> CalendarEvent {
        CalendarEvent::new(
            self.title,
            self.date,
            self.time,
            self.duration,
            self.category,
            self.all_day,
        )
    }
}

/// Partial update for an existing one-off event.
///
/// `None` fields keep the stored value; `Some` fields replace it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration: Option<String>,
    pub category: Option<Category>,
    pub all_day: Option<bool>,
}

impl EventPatch {
    /// Applies this patch to an event in place.
    pub fn apply_to(&self, event: &mut CalendarEvent) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(time) = self.time {
            event.time = time;
        }
        if let Some(duration) = &self.duration {
            event.duration = duration.clone();
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarEvent, Category, EventPatch, EventValidationError};
    use chrono::{NaiveDate, NaiveTime};

    fn sample_event() -> CalendarEvent {
        CalendarEvent::new(
            "Quals Study Session",
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            "2 hours",
            Category::Quals,
            false,
        )
    }

    #[test]
    fn validate_rejects_blank_title() {
        let mut event = sample_event();
        event.title = "   ".to_string();
        assert_eq!(event.validate(), Err(EventValidationError::EmptyTitle));
    }

    #[test]
    fn patch_replaces_only_provided_fields() {
        let mut event = sample_event();
        let original_time = event.time;
        let patch = EventPatch {
            title: Some("Mock Quals".to_string()),
            all_day: Some(true),
            ..EventPatch::default()
        };

        patch.apply_to(&mut event);

        assert_eq!(event.title, "Mock Quals");
        assert!(event.all_day);
        assert_eq!(event.time, original_time);
        assert_eq!(event.category, Category::Quals);
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::Dissertation).unwrap();
        assert_eq!(json, "\"dissertation\"");
    }
}
