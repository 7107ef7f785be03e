use chrono::{NaiveDate, NaiveTime};
use nestcal_core::db::migrations::latest_version;
use nestcal_core::db::open_db_in_memory;
use nestcal_core::{
    CalendarEvent, Category, EventRepository, RepoError, SqliteEventRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn sample_event(title: &str, day: NaiveDate, at: NaiveTime) -> CalendarEvent {
    CalendarEvent::new(title, day, at, "1 hour", Category::Meeting, false)
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let event = CalendarEvent::new(
        "Dissertation Meeting",
        date(2025, 3, 12),
        time(9, 0),
        "1 hour",
        Category::Dissertation,
        false,
    );
    let id = repo.create_event(&event).unwrap();

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded, event);
}

#[test]
fn update_existing_event() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut event = sample_event("draft", date(2025, 3, 12), time(9, 0));
    repo.create_event(&event).unwrap();

    event.title = "rescheduled".to_string();
    event.time = time(15, 30);
    event.all_day = false;
    repo.update_event(&event).unwrap();

    let loaded = repo.get_event(event.id).unwrap().unwrap();
    assert_eq!(loaded.title, "rescheduled");
    assert_eq!(loaded.time, time(15, 30));
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let event = sample_event("missing", date(2025, 3, 12), time(9, 0));
    let err = repo.update_event(&event).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == event.id));
}

#[test]
fn delete_removes_row_and_second_delete_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let event = sample_event("one-shot", date(2025, 3, 12), time(9, 0));
    repo.create_event(&event).unwrap();

    repo.delete_event(event.id).unwrap();
    assert!(repo.get_event(event.id).unwrap().is_none());

    let err = repo.delete_event(event.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == event.id));
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut invalid = sample_event("  ", date(2025, 3, 12), time(9, 0));
    let create_err = repo.create_event(&invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    invalid.title = "valid now".to_string();
    repo.create_event(&invalid).unwrap();

    invalid.title = String::new();
    let update_err = repo.update_event(&invalid).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
}

#[test]
fn list_for_date_matches_exact_day_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let target = date(2025, 3, 12);
    let late = sample_event("late", target, time(20, 0));
    let early = sample_event("early", target, time(6, 0));
    let elsewhere = sample_event("elsewhere", date(2025, 3, 13), time(6, 0));
    repo.create_event(&late).unwrap();
    repo.create_event(&early).unwrap();
    repo.create_event(&elsewhere).unwrap();

    let listed = repo.list_for_date(target).unwrap();
    let titles: Vec<_> = listed.iter().map(|event| event.title.as_str()).collect();
    // Insertion order, not time order; the service sorts during merge.
    assert_eq!(titles, ["late", "early"]);
}

#[test]
fn list_upcoming_orders_by_date_then_time_and_caps_results() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    repo.create_event(&sample_event("b", date(2025, 3, 13), time(9, 0)))
        .unwrap();
    repo.create_event(&sample_event("c", date(2025, 3, 14), time(7, 0)))
        .unwrap();
    repo.create_event(&sample_event("a", date(2025, 3, 13), time(6, 0)))
        .unwrap();
    repo.create_event(&sample_event("past", date(2025, 3, 1), time(6, 0)))
        .unwrap();

    let upcoming = repo.list_upcoming(date(2025, 3, 13), 2).unwrap();
    let titles: Vec<_> = upcoming.iter().map(|event| event.title.as_str()).collect();
    assert_eq!(titles, ["a", "b"]);
}

#[test]
fn list_in_range_is_inclusive_on_both_bounds() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    repo.create_event(&sample_event("start", date(2025, 3, 1), time(9, 0)))
        .unwrap();
    repo.create_event(&sample_event("end", date(2025, 3, 31), time(9, 0)))
        .unwrap();
    repo.create_event(&sample_event("outside", date(2025, 4, 1), time(9, 0)))
        .unwrap();

    let listed = repo
        .list_in_range(date(2025, 3, 1), date(2025, 3, 31))
        .unwrap();
    let titles: Vec<_> = listed.iter().map(|event| event.title.as_str()).collect();
    assert_eq!(titles, ["start", "end"]);
}

#[test]
fn count_reflects_store_size() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    assert_eq!(repo.count_events().unwrap(), 0);
    repo.create_event(&sample_event("only", date(2025, 3, 12), time(9, 0)))
        .unwrap();
    assert_eq!(repo.count_events().unwrap(), 1);
}

#[test]
fn get_event_rejects_corrupt_persisted_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO events (uuid, title, date, time, duration, category, all_day)
         VALUES (?1, 'corrupt', 'not-a-date', '09:00', '1 hour', 'other', 0);",
        [id.to_string()],
    )
    .unwrap();

    let err = repo.get_event(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn blank_title_row_is_invalid_data_and_skipped_from_listings() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let target = date(2025, 3, 12);
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO events (uuid, title, date, time, duration, category, all_day)
         VALUES (?1, '   ', '2025-03-12', '09:00', '1 hour', 'other', 0);",
        [id.to_string()],
    )
    .unwrap();
    repo.create_event(&sample_event("kept", target, time(9, 0)))
        .unwrap();

    let err = repo.get_event(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    // One broken row must not fault the whole date listing.
    let listed = repo.list_for_date(target).unwrap();
    let titles: Vec<_> = listed.iter().map(|event| event.title.as_str()).collect();
    assert_eq!(titles, ["kept"]);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteEventRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_events_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEventRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("events"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_events_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE events (
            uuid TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            date TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEventRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "events",
            column: "time"
        })
    ));
}
