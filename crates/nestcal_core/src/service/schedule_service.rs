//! Schedule merge engine.
//!
//! # Responsibility
//! - Expand the immutable weekly rule table into per-date recurring
//!   instances.
//! - Merge recurring instances with stored one-off events into one ordered
//!   agenda per calendar date.
//! - Provide the one-off CRUD entry points, including the id-resolution
//!   policy that shields recurring instances from mutation.
//!
//! # Invariants
//! - `agenda_for_date` is deterministic: identical input state yields an
//!   identical sequence, order included.
//! - Agenda ordering: all-day entries strictly before timed entries; within
//!   the same all-day-ness ascending time of day; ties keep input order
//!   (recurring before one-off, one-offs in insertion order).
//! - Mutations only ever touch the one-off store; the rule table is
//!   read-only configuration.

use crate::clock::Clock;
use crate::model::agenda::{is_recurring_id, AgendaEntry, RecurringInstance};
use crate::model::event::{
    CalendarEvent, Category, EventDraft, EventId, EventPatch, EventValidationError,
};
use crate::model::recurring::{weekday_index, WeeklyRules};
use crate::repo::event_repo::{EventRepository, RepoError};
use chrono::{Datelike, NaiveDate, NaiveTime};
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Cap applied to the upcoming-events list, matching the dashboard view.
pub const UPCOMING_DEFAULT_LIMIT: u32 = 20;

/// Service error for schedule use-cases.
#[derive(Debug)]
pub enum ScheduleError {
    /// The id refers to a recurring template instance, which is read-only.
    ImmutableEntry(String),
    /// The id does not resolve to any stored one-off event.
    NotFound(String),
    /// Event content failed validation.
    InvalidEvent(EventValidationError),
    /// Persistence-layer failure. In-memory state is unaffected; the caller
    /// decides retry policy.
    Storage(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImmutableEntry(id) => {
                write!(f, "entry `{id}` is a recurring template instance and cannot be modified")
            }
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidEvent(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent schedule state: {details}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEvent(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ScheduleError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id.to_string()),
            RepoError::Validation(err) => Self::InvalidEvent(err),
            other => Self::Storage(other),
        }
    }
}

/// Merge engine over an injected event store, rule table and clock.
///
/// All collaborators are constructor-injected; the service holds no ambient
/// state and no cache, so every read reflects the store as persisted.
pub struct ScheduleService<R: EventRepository, C: Clock> {
    repo: R,
    clock: C,
    rules: WeeklyRules,
}

impl<R: EventRepository, C: Clock> ScheduleService<R, C> {
    /// Creates a service with the built-in weekly rule table.
    pub fn new(repo: R, clock: C) -> Self {
        Self::with_rules(repo, clock, WeeklyRules::default_rules())
    }

    /// Creates a service with an explicit rule table.
    pub fn with_rules(repo: R, clock: C, rules: WeeklyRules) -> Self {
        Self { repo, clock, rules }
    }

    /// Expands the weekly rule table for one concrete date.
    ///
    /// Pure over the rule table: repeated calls for the same date yield
    /// identical instances in template-list order. Free weekdays yield an
    /// empty sequence.
    pub fn expand_recurring(&self, date: NaiveDate) -> Vec<AgendaEntry> {
        let weekday = weekday_index(date);
        self.rules
            .templates_for(weekday)
            .iter()
            .enumerate()
            .map(|(index, template)| {
                AgendaEntry::Recurring(RecurringInstance::materialize(
                    weekday, index, date, template,
                ))
            })
            .collect()
    }

    /// Stored one-off events falling on exactly this date, insertion order.
    pub fn one_off_for_date(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, ScheduleError> {
        Ok(self.repo.list_for_date(date)?)
    }

    /// The merged, ordered agenda for one calendar date.
    ///
    /// Recurring instances are concatenated before one-off events, then the
    /// whole sequence is stably sorted: all-day first, then ascending time.
    pub fn agenda_for_date(&self, date: NaiveDate) -> Result<Vec<AgendaEntry>, ScheduleError> {
        let mut agenda = self.expand_recurring(date);
        agenda.extend(self.one_off_for_date(date)?.into_iter().map(AgendaEntry::OneOff));

        // sort_by_key is stable, which the tie-order invariant relies on.
        agenda.sort_by_key(|entry| (!entry.all_day(), entry.time()));
        Ok(agenda)
    }

    /// One-off events from today onward for the "upcoming" list.
    ///
    /// Recurring instances are intentionally absent here; the list mirrors
    /// the stored events only, capped at `limit` (or the default of 20).
    pub fn upcoming_events(&self, limit: Option<u32>) -> Result<Vec<CalendarEvent>, ScheduleError> {
        let limit = limit.unwrap_or(UPCOMING_DEFAULT_LIMIT);
        Ok(self.repo.list_upcoming(self.clock.today(), limit)?)
    }

    /// Days of one month carrying at least one stored one-off event.
    ///
    /// Used by month grids to mark days; recurring templates are excluded
    /// since they would mark nearly every cell.
    pub fn days_with_events(&self, year: i32, month: u32) -> Result<BTreeSet<u32>, ScheduleError> {
        let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Ok(BTreeSet::new());
        };
        let end = last_day_of_month(start);

        let days = self
            .repo
            .list_in_range(start, end)?
            .into_iter()
            .map(|event| event.date.day())
            .collect();
        Ok(days)
    }

    /// Whether `date` is the current day, per the injected clock.
    pub fn is_today(&self, date: NaiveDate) -> bool {
        self.clock.today() == date
    }

    /// Creates a one-off event from a draft and returns the stored record.
    pub fn create_event(&self, draft: EventDraft) -> Result<CalendarEvent, ScheduleError> {
        let event = draft.into_event();
        let id = self.repo.create_event(&event)?;
        info!("event=event_created module=service status=ok id={id}");

        self.repo
            .get_event(id)?
            .ok_or(ScheduleError::InconsistentState(
                "created event not found in read-back",
            ))
    }

    /// Applies a partial update to the one-off event behind `id`.
    ///
    /// Recurring-shaped ids fail with `ImmutableEntry` before any store
    /// lookup; unknown or malformed ids fail with `NotFound`.
    pub fn update_event(
        &self,
        id: &str,
        patch: &EventPatch,
    ) -> Result<CalendarEvent, ScheduleError> {
        let event_id = self.resolve_one_off_id(id)?;
        let mut event = self
            .repo
            .get_event(event_id)?
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;

        patch.apply_to(&mut event);
        self.repo.update_event(&event)?;
        info!("event=event_updated module=service status=ok id={event_id}");

        self.repo
            .get_event(event_id)?
            .ok_or(ScheduleError::InconsistentState(
                "updated event not found in read-back",
            ))
    }

    /// Deletes the one-off event behind `id`, with the same id-resolution
    /// rules as `update_event`.
    pub fn delete_event(&self, id: &str) -> Result<(), ScheduleError> {
        let event_id = self.resolve_one_off_id(id)?;
        self.repo.delete_event(event_id)?;
        info!("event=event_deleted module=service status=ok id={event_id}");
        Ok(())
    }

    /// Seeds the starter events into an empty store.
    ///
    /// Returns the number of events created: zero when the store already
    /// holds data, so repeated startup calls stay idempotent.
    pub fn seed_default_events(&self) -> Result<usize, ScheduleError> {
        if self.repo.count_events()? > 0 {
            return Ok(0);
        }

        let today = self.clock.today();
        let samples = default_sample_events(today);
        for event in &samples {
            self.repo.create_event(event)?;
        }
        info!(
            "event=seed_defaults module=service status=ok count={}",
            samples.len()
        );
        Ok(samples.len())
    }

    /// Classifies an entry id string for mutation.
    ///
    /// A recurring-shaped id is a distinct failure class from a missing one:
    /// the entry exists but is immutable configuration.
    fn resolve_one_off_id(&self, id: &str) -> Result<EventId, ScheduleError> {
        if is_recurring_id(id) {
            return Err(ScheduleError::ImmutableEntry(id.to_string()));
        }
        Uuid::parse_str(id).map_err(|_| ScheduleError::NotFound(id.to_string()))
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = match first.month() {
        12 => (first.year() + 1, 1),
        month => (first.year(), month + 1),
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|next_first| next_first.pred_opt())
        .unwrap_or(first)
}

/// The dashboard's starter schedule, dated to the provided day.
fn default_sample_events(date: NaiveDate) -> Vec<CalendarEvent> {
    let at = |hour, minute| NaiveTime::from_hms_opt(hour, minute, 0).expect("valid sample time");
    vec![
        CalendarEvent::new("Morning Mindfulness", date, at(6, 45), "15 min", Category::Wellness, false),
        CalendarEvent::new("Dissertation Meeting", date, at(9, 0), "1 hour", Category::Meeting, false),
        CalendarEvent::new("Cognitive Development Class", date, at(10, 0), "3 hours", Category::Class, false),
        CalendarEvent::new("Quals Study Session", date, at(14, 0), "2 hours", Category::Quals, false),
        CalendarEvent::new("Report Writing", date, at(20, 30), "2 hours", Category::Reports, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::last_day_of_month;
    use chrono::NaiveDate;

    #[test]
    fn last_day_handles_year_rollover_and_leap_february() {
        let december = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(
            last_day_of_month(december),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );

        let february = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(
            last_day_of_month(february),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
