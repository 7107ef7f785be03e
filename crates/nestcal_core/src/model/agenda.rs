//! Agenda entry union produced by the merge engine.
//!
//! # Responsibility
//! - Represent one display row of a per-date agenda as a tagged union of
//!   a materialized recurring template or a stored one-off event.
//! - Own the synthesized recurring entry ID shape and its classifier.
//!
//! # Invariants
//! - Agenda entries are derived, ephemeral view data: recomputed on every
//!   read and never persisted.
//! - A recurring entry ID encodes weekday + template index only. It is NOT
//!   unique across different dates sharing a weekday and must never be used
//!   as a cache or index key.

use crate::model::event::{CalendarEvent, Category};
use crate::model::recurring::RecurringTemplate;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static RECURRING_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^recurring-\d+-\d+$").expect("valid recurring id regex"));

/// Returns whether an entry ID has the synthesized recurring shape.
///
/// Mutation paths use this to reject writes against immutable template
/// instances before attempting any store lookup.
pub fn is_recurring_id(id: &str) -> bool {
    RECURRING_ID_RE.is_match(id)
}

/// A recurring template materialized for one concrete calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringInstance {
    /// Weekday slot the template came from (0=Sunday..6=Saturday).
    pub weekday: u8,
    /// 0-based position within that weekday's template list.
    pub index: usize,
    /// Concrete date this instance was materialized for.
    pub date: NaiveDate,
    pub title: String,
    pub time: NaiveTime,
    pub duration: String,
    pub category: Category,
    pub all_day: bool,
}

impl RecurringInstance {
    /// Materializes one template for a concrete date.
    pub fn materialize(
        weekday: u8,
        index: usize,
        date: NaiveDate,
        template: &RecurringTemplate,
    ) -> Self {
        Self {
            weekday,
            index,
            date,
            title: template.title.to_string(),
            time: template.time,
            duration: template.duration.to_string(),
            category: template.category,
            all_day: template.all_day,
        }
    }

    /// Synthesized entry ID: `recurring-<weekday>-<index>`.
    pub fn entry_id(&self) -> String {
        format!("recurring-{}-{}", self.weekday, self.index)
    }
}

/// One row of a per-date agenda.
///
/// Consumers must match exhaustively; the two arms differ in mutability
/// (one-off events are editable, recurring instances are read-only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaEntry {
    Recurring(RecurringInstance),
    OneOff(CalendarEvent),
}

impl AgendaEntry {
    /// Display/lookup ID: stable UUID for one-offs, synthesized slot ID for
    /// recurring instances.
    pub fn entry_id(&self) -> String {
        match self {
            Self::Recurring(instance) => instance.entry_id(),
            Self::OneOff(event) => event.id.to_string(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Recurring(instance) => &instance.title,
            Self::OneOff(event) => &event.title,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Recurring(instance) => instance.date,
            Self::OneOff(event) => event.date,
        }
    }

    pub fn time(&self) -> NaiveTime {
        match self {
            Self::Recurring(instance) => instance.time,
            Self::OneOff(event) => event.time,
        }
    }

    pub fn duration(&self) -> &str {
        match self {
            Self::Recurring(instance) => &instance.duration,
            Self::OneOff(event) => &event.duration,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Recurring(instance) => instance.category,
            Self::OneOff(event) => event.category,
        }
    }

    pub fn all_day(&self) -> bool {
        match self {
            Self::Recurring(instance) => instance.all_day,
            Self::OneOff(event) => event.all_day,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, Self::Recurring(_))
    }
}
