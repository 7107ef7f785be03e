//! Weekly recurring rule table.
//!
//! # Responsibility
//! - Define the immutable weekday-keyed template table for fixed commitments.
//! - Keep template order stable; declared order is display order.
//!
//! # Invariants
//! - The table is configuration, not user data: built once at startup and
//!   never mutated, created, or deleted at runtime.
//! - A weekday without templates is a free day, not an error.
//! - Weekday indexing is 0=Sunday..6=Saturday.

use crate::model::event::Category;
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Number of weekday slots in the rule table.
pub const WEEKDAY_COUNT: usize = 7;

/// Returns the weekday index (0=Sunday..6=Saturday) of a calendar date.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// One immutable recurring commitment template.
///
/// Templates carry no date; they are materialized fresh for every matching
/// calendar date by the merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringTemplate {
    pub title: &'static str,
    pub time: NaiveTime,
    /// Free-text duration label, same convention as one-off events.
    pub duration: &'static str,
    pub category: Category,
    pub all_day: bool,
}

impl RecurringTemplate {
    fn timed(
        title: &'static str,
        hour: u32,
        minute: u32,
        duration: &'static str,
        category: Category,
    ) -> Self {
        Self {
            title,
            // Hour/minute literals below are compile-time constants in range.
            time: NaiveTime::from_hms_opt(hour, minute, 0).expect("valid template time"),
            duration,
            category,
            all_day: false,
        }
    }

    fn all_day(title: &'static str, category: Category) -> Self {
        Self {
            title,
            time: NaiveTime::from_hms_opt(0, 0, 0).expect("valid template time"),
            duration: "all day",
            category,
            all_day: true,
        }
    }
}

/// Immutable weekday-keyed recurring rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRules {
    slots: [Vec<RecurringTemplate>; WEEKDAY_COUNT],
}

impl WeeklyRules {
    /// Builds a rule table from explicit per-weekday template lists.
    ///
    /// Weekdays absent from `entries` stay free. Later entries for the same
    /// weekday append after earlier ones, preserving declared order.
    pub fn new(entries: Vec<(u8, Vec<RecurringTemplate>)>) -> Self {
        let mut slots: [Vec<RecurringTemplate>; WEEKDAY_COUNT] = Default::default();
        for (weekday, templates) in entries {
            slots[usize::from(weekday) % WEEKDAY_COUNT].extend(templates);
        }
        Self { slots }
    }

    /// A table with every weekday free. Useful for tests and empty profiles.
    pub fn empty() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    /// Templates for one weekday, in declared order. Empty for free days.
    pub fn templates_for(&self, weekday: u8) -> &[RecurringTemplate] {
        &self.slots[usize::from(weekday) % WEEKDAY_COUNT]
    }

    /// Templates applying to a concrete calendar date.
    pub fn templates_for_date(&self, date: NaiveDate) -> &[RecurringTemplate] {
        self.templates_for(weekday_index(date))
    }

    /// The built-in weekly schedule shipped with the dashboard.
    ///
    /// Weekdays Mon-Fri share the daily routine; Monday adds the group
    /// supervision slot and Thursday is a full day off.
    pub fn default_rules() -> Self {
        let routine = || {
            vec![
                RecurringTemplate::timed("Morning Mindfulness", 6, 45, "15 min", Category::Wellness),
                RecurringTemplate::timed("Class Block", 10, 0, "3 hours", Category::Class),
                RecurringTemplate::timed("Report Writing", 20, 30, "2 hours", Category::Reports),
            ]
        };

        let mut monday = routine();
        monday.push(RecurringTemplate::timed(
            "Group Supervision",
            12,
            0,
            "1 hour",
            Category::Meeting,
        ));

        let mut wednesday = routine();
        wednesday.push(RecurringTemplate::timed(
            "Dissertation Meeting",
            9,
            0,
            "1 hour",
            Category::Meeting,
        ));

        Self::new(vec![
            (1, monday),
            (2, routine()),
            (3, wednesday),
            (4, vec![RecurringTemplate::all_day("OFF DAY", Category::Wellness)]),
            (5, routine()),
            // Saturday keeps a single study slot; Sunday stays free.
            (6, vec![RecurringTemplate::timed(
                "Quals Study Session",
                14,
                0,
                "2 hours",
                Category::Quals,
            )]),
        ])
    }
}
