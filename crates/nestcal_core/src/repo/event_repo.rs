//! Event repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over one-off event storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `CalendarEvent::validate()` before SQL mutations.
//! - Date-filtered reads skip rows whose persisted date/time no longer
//!   parses, instead of failing the whole query. `get_event` still rejects
//!   such rows so edit flows surface the corruption.
//! - Each mutation is one synchronous SQLite statement: readers never see a
//!   partially-written store.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::event::{CalendarEvent, Category, EventId, EventValidationError};
use chrono::{NaiveDate, NaiveTime};
use log::warn;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    date,
    time,
    duration,
    category,
    all_day
FROM events";

const REQUIRED_COLUMNS: &[&str] = &[
    "uuid", "title", "date", "time", "duration", "category", "all_day",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` does not exist")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` does not exist")
            }
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for one-off event CRUD and lookups.
pub trait EventRepository {
    fn create_event(&self, event: &CalendarEvent) -> RepoResult<EventId>;
    fn update_event(&self, event: &CalendarEvent) -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<CalendarEvent>>;
    /// Events on exactly this calendar date, in insertion order.
    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<CalendarEvent>>;
    /// Events on or after `from`, ordered by date, then time, then insertion.
    fn list_upcoming(&self, from: NaiveDate, limit: u32) -> RepoResult<Vec<CalendarEvent>>;
    /// Events within `[start, end]` inclusive, ordered like `list_upcoming`.
    fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<CalendarEvent>>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
    fn count_events(&self) -> RepoResult<u64>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository after verifying the connection is migrated
    /// and carries the expected `events` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &CalendarEvent) -> RepoResult<EventId> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO events (
                uuid,
                title,
                date,
                time,
                duration,
                category,
                all_day
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                event.date.format(DATE_FORMAT).to_string(),
                event.time.format(TIME_FORMAT).to_string(),
                event.duration.as_str(),
                event.category.slug(),
                bool_to_int(event.all_day),
            ],
        )?;

        Ok(event.id)
    }

    fn update_event(&self, event: &CalendarEvent) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                title = ?1,
                date = ?2,
                time = ?3,
                duration = ?4,
                category = ?5,
                all_day = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                event.title.as_str(),
                event.date.format(DATE_FORMAT).to_string(),
                event.time.format(TIME_FORMAT).to_string(),
                event.duration.as_str(),
                event.category.slug(),
                bool_to_int(event.all_day),
                event.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<CalendarEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<CalendarEvent>> {
        // Dates are normalized to ISO text on write, so exact-day equality
        // is plain string equality here.
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE date = ?1
             ORDER BY rowid ASC;"
        ))?;

        let mut rows = stmt.query([date.format(DATE_FORMAT).to_string()])?;
        collect_parseable_rows(&mut rows, None)
    }

    fn list_upcoming(&self, from: NaiveDate, limit: u32) -> RepoResult<Vec<CalendarEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE date >= ?1
             ORDER BY date ASC, time ASC, rowid ASC;"
        ))?;

        let mut rows = stmt.query([from.format(DATE_FORMAT).to_string()])?;
        collect_parseable_rows(&mut rows, Some(limit as usize))
    }

    fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<CalendarEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date ASC, time ASC, rowid ASC;"
        ))?;

        let mut rows = stmt.query(params![
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string(),
        ])?;
        collect_parseable_rows(&mut rows, None)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_events(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Collects rows, dropping any whose persisted date/time no longer parses.
///
/// Dropped rows are logged and excluded so corrupt data can never fault an
/// agenda read.
fn collect_parseable_rows(
    rows: &mut rusqlite::Rows<'_>,
    limit: Option<usize>,
) -> RepoResult<Vec<CalendarEvent>> {
    let mut events = Vec::new();

    while let Some(row) = rows.next()? {
        if limit.is_some_and(|cap| events.len() >= cap) {
            break;
        }
        match parse_event_row(row) {
            Ok(event) => events.push(event),
            Err(RepoError::InvalidData(message)) => {
                warn!("event=event_row_skipped module=repo status=warn reason={message}");
            }
            Err(other) => return Err(other),
        }
    }

    Ok(events)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<CalendarEvent> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in events.uuid"))
    })?;

    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date value `{date_text}` in events.date"))
    })?;

    let time_text: String = row.get("time")?;
    let time = NaiveTime::parse_from_str(&time_text, TIME_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid time value `{time_text}` in events.time"))
    })?;

    let category_text: String = row.get("category")?;
    let category = Category::from_slug(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in events.category"
        ))
    })?;

    let all_day = match row.get::<_, i64>("all_day")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid all_day value `{other}` in events.all_day"
            )));
        }
    };

    let event = CalendarEvent {
        id,
        title: row.get("title")?,
        date,
        time,
        duration: row.get("duration")?,
        category,
        all_day,
    };
    // Read-side invariant breaks are data corruption, not request errors, so
    // listings can skip the row instead of failing wholesale.
    event
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(event)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'events'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("events"));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('events');")?;
    let mut rows = stmt.query([])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>(0)?);
    }

    for column in REQUIRED_COLUMNS.iter().copied() {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "events",
                column,
            });
        }
    }

    Ok(())
}
