//! Core schedule logic for the nest dashboard.
//! This crate is the single source of truth for agenda merge invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::agenda::{is_recurring_id, AgendaEntry, RecurringInstance};
pub use model::event::{
    CalendarEvent, Category, EventDraft, EventId, EventPatch, EventValidationError,
};
pub use model::recurring::{weekday_index, RecurringTemplate, WeeklyRules};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult, SqliteEventRepository};
pub use service::schedule_service::{ScheduleError, ScheduleService, UPCOMING_DEFAULT_LIMIT};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
