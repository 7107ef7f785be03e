//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `nestcal_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use chrono::NaiveDate;
use nestcal_core::{FixedClock, ScheduleService, SqliteEventRepository};

fn main() {
    println!("nestcal_core ping={}", nestcal_core::ping());
    println!("nestcal_core version={}", nestcal_core::core_version());

    // Render one fixed Monday agenda against an empty in-memory store to
    // prove the merge path end to end without touching user data.
    let monday = NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid probe date");
    match smoke_agenda(monday) {
        Ok(lines) => {
            println!("agenda date={monday}");
            for line in lines {
                println!("  {line}");
            }
        }
        Err(err) => {
            eprintln!("agenda probe failed: {err}");
            std::process::exit(1);
        }
    }
}

fn smoke_agenda(date: NaiveDate) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let conn = nestcal_core::db::open_db_in_memory()?;
    let repo = SqliteEventRepository::try_new(&conn)?;
    let service = ScheduleService::new(repo, FixedClock(date));

    let lines = service
        .agenda_for_date(date)?
        .iter()
        .map(|entry| {
            let marker = if entry.is_recurring() { "R" } else { "E" };
            let time = if entry.all_day() {
                "all-day".to_string()
            } else {
                entry.time().format("%H:%M").to_string()
            };
            format!("[{marker}] {time} {}", entry.title())
        })
        .collect();
    Ok(lines)
}
