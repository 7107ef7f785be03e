//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level schedule functions to Dart via FRB.
//! - Keep error semantics simple for UI integration: response envelopes
//!   with `ok` + `error_code`, never panics across the boundary.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - `error_code` distinguishes `immutable_entry` from `not_found`; the UI
//!   relies on that to block recurring-entry edits with a dedicated message.

use chrono::{NaiveDate, NaiveTime, Timelike};
use nestcal_core::db::open_db;
use nestcal_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AgendaEntry, Category, EventDraft, EventPatch, ScheduleError, ScheduleService,
    SqliteEventRepository, SystemClock,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const SCHEDULE_DB_FILE_NAME: &str = "nestcal.sqlite3";
static SCHEDULE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the directory holding the schedule database for this process.
///
/// # FFI contract
/// - First call wins; later calls with a different directory return an
///   error message, matching the logging reconfiguration policy.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage_dir(dir: String) -> String {
    let path = PathBuf::from(dir).join(SCHEDULE_DB_FILE_NAME);
    let active = SCHEDULE_DB_PATH.get_or_init(|| path.clone());
    if active == &path {
        log::info!(
            "event=storage_configured module=ffi status=ok path={}",
            path.display()
        );
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            path.display()
        )
    }
}

/// One agenda row shaped for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaItem {
    /// Stable UUID for one-offs; `recurring-<weekday>-<index>` for template
    /// instances (not unique across dates).
    pub entry_id: String,
    pub title: String,
    /// ISO date `YYYY-MM-DD`.
    pub date: String,
    /// Zero-padded 24-hour `HH:MM`.
    pub time: String,
    /// 12-hour display label, or `All Day` for all-day entries.
    pub time_label: String,
    pub duration: String,
    pub category: String,
    pub category_label: String,
    pub all_day: bool,
    /// Recurring instances are read-only; the UI must not offer edit/delete.
    pub is_recurring: bool,
}

/// Agenda response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaResponse {
    pub ok: bool,
    pub items: Vec<AgendaItem>,
    pub message: String,
}

/// Generic action response envelope for mutation calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Created/affected one-off event ID, when applicable.
    pub event_id: Option<String>,
    pub message: String,
    /// Failure class: `immutable_entry | not_found | invalid_input | storage`.
    pub error_code: Option<String>,
}

impl ActionResponse {
    fn success(message: impl Into<String>, event_id: Option<String>) -> Self {
        Self {
            ok: true,
            event_id,
            message: message.into(),
            error_code: None,
        }
    }

    fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            event_id: None,
            message: message.into(),
            error_code: Some(code.to_string()),
        }
    }

    fn from_schedule_error(err: &ScheduleError) -> Self {
        Self::failure(schedule_error_code(err), err.to_string())
    }
}

/// Merged agenda for one calendar date.
///
/// # FFI contract
/// - `date_iso` must be `YYYY-MM-DD`; anything else yields an error
///   envelope, never a throw.
#[flutter_rust_bridge::frb(sync)]
pub fn agenda_for_date(date_iso: String) -> AgendaResponse {
    let Some(date) = parse_iso_date(&date_iso) else {
        return AgendaResponse {
            ok: false,
            items: Vec::new(),
            message: format!("invalid date `{date_iso}`; expected YYYY-MM-DD"),
        };
    };

    with_service(|service| service.agenda_for_date(date)).map_or_else(
        |message| AgendaResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
        |entries| AgendaResponse {
            ok: true,
            items: entries.iter().map(agenda_item).collect(),
            message: String::new(),
        },
    )
}

/// Stored one-off events from today onward, capped at `limit` (default 20).
#[flutter_rust_bridge::frb(sync)]
pub fn upcoming_events(limit: Option<u32>) -> AgendaResponse {
    with_service(|service| service.upcoming_events(limit)).map_or_else(
        |message| AgendaResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
        |events| AgendaResponse {
            ok: true,
            items: events
                .into_iter()
                .map(|event| agenda_item(&AgendaEntry::OneOff(event)))
                .collect(),
            message: String::new(),
        },
    )
}

/// Month-grid marker response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthDaysResponse {
    pub ok: bool,
    /// 1-based days of the month holding stored one-off events.
    pub days: Vec<u32>,
    pub message: String,
}

/// Days of one month that carry stored one-off events (month grid markers).
///
/// Storage failures surface as `ok = false` with a message; an empty `days`
/// list with `ok = true` genuinely means no events that month.
#[flutter_rust_bridge::frb(sync)]
pub fn event_days_in_month(year: i32, month: u32) -> MonthDaysResponse {
    with_service(|service| service.days_with_events(year, month)).map_or_else(
        |message| MonthDaysResponse {
            ok: false,
            days: Vec::new(),
            message,
        },
        |days| MonthDaysResponse {
            ok: true,
            days: days.into_iter().collect(),
            message: String::new(),
        },
    )
}

/// Creates a one-off event and returns its stable ID.
#[flutter_rust_bridge::frb(sync)]
pub fn create_event(
    title: String,
    date_iso: String,
    time_hhmm: String,
    duration: String,
    category: String,
    all_day: bool,
) -> ActionResponse {
    let Some(date) = parse_iso_date(&date_iso) else {
        return ActionResponse::failure(
            "invalid_input",
            format!("invalid date `{date_iso}`; expected YYYY-MM-DD"),
        );
    };
    let Some(time) = parse_clock_time(&time_hhmm) else {
        return ActionResponse::failure(
            "invalid_input",
            format!("invalid time `{time_hhmm}`; expected HH:MM"),
        );
    };

    let draft = EventDraft {
        title,
        date,
        time,
        duration,
        category: parse_category(&category),
        all_day,
    };

    match with_service_schedule(|service| service.create_event(draft)) {
        Ok(event) => ActionResponse::success("event created", Some(event.id.to_string())),
        Err(outcome) => outcome,
    }
}

/// Applies a partial update to the one-off event behind `entry_id`.
///
/// Recurring-shaped ids fail with `error_code = immutable_entry`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_event(
    entry_id: String,
    title: Option<String>,
    date_iso: Option<String>,
    time_hhmm: Option<String>,
    duration: Option<String>,
    category: Option<String>,
    all_day: Option<bool>,
) -> ActionResponse {
    let date = match &date_iso {
        Some(value) => match parse_iso_date(value) {
            Some(date) => Some(date),
            None => {
                return ActionResponse::failure(
                    "invalid_input",
                    format!("invalid date `{value}`; expected YYYY-MM-DD"),
                );
            }
        },
        None => None,
    };
    let time = match &time_hhmm {
        Some(value) => match parse_clock_time(value) {
            Some(time) => Some(time),
            None => {
                return ActionResponse::failure(
                    "invalid_input",
                    format!("invalid time `{value}`; expected HH:MM"),
                );
            }
        },
        None => None,
    };

    let patch = EventPatch {
        title,
        date,
        time,
        duration,
        category: category.as_deref().map(parse_category),
        all_day,
    };

    match with_service_schedule(|service| service.update_event(&entry_id, &patch)) {
        Ok(event) => ActionResponse::success("event updated", Some(event.id.to_string())),
        Err(outcome) => outcome,
    }
}

/// Deletes the one-off event behind `entry_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_event(entry_id: String) -> ActionResponse {
    match with_service_schedule(|service| service.delete_event(&entry_id)) {
        Ok(()) => ActionResponse::success("event deleted", None),
        Err(outcome) => outcome,
    }
}

/// Seeds the starter events when the store is empty.
#[flutter_rust_bridge::frb(sync)]
pub fn seed_default_events() -> ActionResponse {
    match with_service_schedule(|service| service.seed_default_events()) {
        Ok(count) => ActionResponse::success(format!("seeded {count} events"), None),
        Err(outcome) => outcome,
    }
}

type ConnectedService<'conn> = ScheduleService<SqliteEventRepository<'conn>, SystemClock>;

/// Runs one use-case against a freshly opened connection.
///
/// Storage stays unconfigured-safe: missing configuration reports an error
/// message instead of touching a default path.
fn with_service<T>(
    run: impl FnOnce(&ConnectedService<'_>) -> Result<T, ScheduleError>,
) -> Result<T, String> {
    let Some(path) = SCHEDULE_DB_PATH.get() else {
        return Err("storage not configured; call configure_storage_dir first".to_string());
    };

    let conn = open_db(path).map_err(|err| err.to_string())?;
    let repo = SqliteEventRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = ScheduleService::new(repo, SystemClock);
    run(&service).map_err(|err| err.to_string())
}

/// Like [`with_service`] but preserves the schedule failure class in the
/// returned envelope.
fn with_service_schedule<T>(
    run: impl FnOnce(&ConnectedService<'_>) -> Result<T, ScheduleError>,
) -> Result<T, ActionResponse> {
    let Some(path) = SCHEDULE_DB_PATH.get() else {
        return Err(ActionResponse::failure(
            "storage",
            "storage not configured; call configure_storage_dir first",
        ));
    };

    let conn =
        open_db(path).map_err(|err| ActionResponse::failure("storage", err.to_string()))?;
    let repo = SqliteEventRepository::try_new(&conn)
        .map_err(|err| ActionResponse::failure("storage", err.to_string()))?;
    let service = ScheduleService::new(repo, SystemClock);
    run(&service).map_err(|err| ActionResponse::from_schedule_error(&err))
}

fn schedule_error_code(err: &ScheduleError) -> &'static str {
    match err {
        ScheduleError::ImmutableEntry(_) => "immutable_entry",
        ScheduleError::NotFound(_) => "not_found",
        ScheduleError::InvalidEvent(_) => "invalid_input",
        ScheduleError::Storage(_) | ScheduleError::InconsistentState(_) => "storage",
    }
}

fn agenda_item(entry: &AgendaEntry) -> AgendaItem {
    AgendaItem {
        entry_id: entry.entry_id(),
        title: entry.title().to_string(),
        date: entry.date().format("%Y-%m-%d").to_string(),
        time: entry.time().format("%H:%M").to_string(),
        time_label: if entry.all_day() {
            "All Day".to_string()
        } else {
            format_time_label(entry.time())
        },
        duration: entry.duration().to_string(),
        category: entry.category().slug().to_string(),
        category_label: entry.category().label().to_string(),
        all_day: entry.all_day(),
        is_recurring: entry.is_recurring(),
    }
}

/// 12-hour display label ("9:05 AM") for timed entries.
fn format_time_label(time: NaiveTime) -> String {
    let hour = time.hour();
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        other => other,
    };
    format!("{display_hour}:{:02} {meridiem}", time.minute())
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Unknown category tokens fall back to `other`, mirroring the form default.
fn parse_category(value: &str) -> Category {
    Category::from_slug(value.trim()).unwrap_or_default()
}
