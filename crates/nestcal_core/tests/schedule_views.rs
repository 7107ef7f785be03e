use chrono::{NaiveDate, NaiveTime};
use nestcal_core::db::open_db_in_memory;
use nestcal_core::{
    Category, EventDraft, FixedClock, ScheduleService, SqliteEventRepository, WeeklyRules,
    UPCOMING_DEFAULT_LIMIT,
};
use rusqlite::Connection;

const TODAY: (i32, u32, u32) = (2025, 3, 10);

fn date(parts: (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(parts.0, parts.1, parts.2).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn service(conn: &Connection) -> ScheduleService<SqliteEventRepository<'_>, FixedClock> {
    let repo = SqliteEventRepository::try_new(conn).unwrap();
    ScheduleService::with_rules(repo, FixedClock(date(TODAY)), WeeklyRules::empty())
}

fn draft(title: &str, day: NaiveDate, at: NaiveTime) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        date: day,
        time: at,
        duration: "1 hour".to_string(),
        category: Category::Other,
        all_day: false,
    }
}

#[test]
fn upcoming_skips_past_events_and_orders_by_date_then_time() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service
        .create_event(draft("Yesterday", date((2025, 3, 9)), time(9, 0)))
        .unwrap();
    service
        .create_event(draft("Tomorrow Late", date((2025, 3, 11)), time(18, 0)))
        .unwrap();
    service
        .create_event(draft("Today", date(TODAY), time(9, 0)))
        .unwrap();
    service
        .create_event(draft("Tomorrow Early", date((2025, 3, 11)), time(7, 0)))
        .unwrap();

    let upcoming = service.upcoming_events(None).unwrap();
    let titles: Vec<_> = upcoming.iter().map(|event| event.title.as_str()).collect();
    assert_eq!(titles, ["Today", "Tomorrow Early", "Tomorrow Late"]);
}

#[test]
fn upcoming_honors_explicit_and_default_limits() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for offset in 0..(UPCOMING_DEFAULT_LIMIT + 5) {
        let day = date(TODAY) + chrono::Duration::days(i64::from(offset));
        service
            .create_event(draft(&format!("event-{offset}"), day, time(9, 0)))
            .unwrap();
    }

    assert_eq!(service.upcoming_events(Some(3)).unwrap().len(), 3);
    assert_eq!(
        service.upcoming_events(None).unwrap().len(),
        UPCOMING_DEFAULT_LIMIT as usize
    );
}

#[test]
fn days_with_events_marks_only_days_holding_one_offs() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service
        .create_event(draft("A", date((2025, 3, 19)), time(9, 0)))
        .unwrap();
    service
        .create_event(draft("B", date((2025, 3, 19)), time(11, 0)))
        .unwrap();
    service
        .create_event(draft("C", date((2025, 3, 26)), time(9, 0)))
        .unwrap();
    service
        .create_event(draft("April", date((2025, 4, 2)), time(9, 0)))
        .unwrap();

    let days = service.days_with_events(2025, 3).unwrap();
    assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![19, 26]);
}

#[test]
fn days_with_events_for_invalid_month_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(service.days_with_events(2025, 13).unwrap().is_empty());
}

#[test]
fn seed_populates_empty_store_once() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let seeded = service.seed_default_events().unwrap();
    assert_eq!(seeded, 5);

    let agenda = service.agenda_for_date(date(TODAY)).unwrap();
    assert_eq!(agenda.len(), 5);
    assert_eq!(agenda[0].title(), "Morning Mindfulness");

    // Second startup call must not duplicate the samples.
    assert_eq!(service.seed_default_events().unwrap(), 0);
    assert_eq!(service.agenda_for_date(date(TODAY)).unwrap().len(), 5);
}

#[test]
fn seed_is_skipped_when_store_has_user_data() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service
        .create_event(draft("Mine", date(TODAY), time(9, 0)))
        .unwrap();

    assert_eq!(service.seed_default_events().unwrap(), 0);
}

#[test]
fn is_today_follows_injected_clock() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(service.is_today(date(TODAY)));
    assert!(!service.is_today(date((2025, 3, 11))));
}
