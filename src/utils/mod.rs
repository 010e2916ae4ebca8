//! Date and time helpers, and some debug utilities
//!
//! Every function here works in the time zone carried by its input, so that callers decide what "local" means.
//! The rest of the crate uses [`chrono::Local`].

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};

use crate::calendar::Calendar;
use crate::error::CalendarError;
use crate::task::Task;

pub mod comparison;

/// A canonical `YYYY-MM-DD` string that identifies a calendar day
pub type DayKey = String;

/// Returns the `YYYY-MM-DD` key of the calendar day this instant falls in, in its own time zone
pub fn day_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> DayKey {
    date_key(&instant.date_naive())
}

/// Returns the `YYYY-MM-DD` key of a date
pub fn date_key(date: &NaiveDate) -> DayKey {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Returns the `(hour, minute)` of this instant, in its own time zone
pub fn hour_minute<Tz: TimeZone>(instant: &DateTime<Tz>) -> (u32, u32) {
    (instant.hour(), instant.minute())
}

/// Returns a `HH:MM` string
pub fn formatted_time<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let (hour, minute) = hour_minute(instant);
    format!("{}:{}", two_digits(hour), two_digits(minute))
}

pub fn two_digits(num: u32) -> String {
    format!("{:02}", num)
}

/// The labels of the 24 hourly rows of a day (`00:00` to `23:00`)
pub fn hours_in_a_day() -> Vec<String> {
    (0..24)
        .map(|hour| format!("{}:00", two_digits(hour)))
        .collect()
}

/// The full English name of the weekday of `date`
pub fn day_name(date: &NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Returns the seven dates of the Monday-to-Sunday week that contains `reference`.
///
/// Sunday is the last day of a week, so a Sunday `reference` yields the week that started on the Monday before it.
pub fn week_window(reference: &NaiveDate) -> [NaiveDate; 7] {
    let monday = shift_days(reference, -i64::from(reference.weekday().num_days_from_monday()));
    let mut days = [monday; 7];
    for (offset, day) in days.iter_mut().enumerate() {
        *day = shift_days(&monday, offset as i64);
    }
    days
}

/// Move a date by a number of days (that can be negative)
pub fn shift_days(date: &NaiveDate, days: i64) -> NaiveDate {
    *date + Duration::days(days)
}

/// Whether both instants fall in the same calendar day of their respective time zones
pub fn is_same_day<Tz1: TimeZone, Tz2: TimeZone>(left: &DateTime<Tz1>, right: &DateTime<Tz2>) -> bool {
    left.date_naive() == right.date_naive()
}

/// Whether `instant` falls on today's date (local time)
pub fn is_today(instant: &DateTime<Local>) -> bool {
    is_same_day(instant, &Local::now())
}

/// Build an instant out of a `YYYY-MM-DD` date and a `HH:MM` time, read in the local time zone
pub fn parse_local_datetime(date: &str, time: &str) -> Result<DateTime<Local>, CalendarError> {
    parse_datetime_in(&Local, date, time)
}

/// Build an instant out of a `YYYY-MM-DD` date and a `HH:MM` time, read in the `tz` time zone.
///
/// A wall-clock time that happens twice (DST fall-back) resolves to its earliest occurrence.
/// One that never happens (DST spring-forward) is an error.
pub fn parse_datetime_in<Tz: TimeZone>(tz: &Tz, date: &str, time: &str) -> Result<DateTime<Tz>, CalendarError> {
    let invalid = || CalendarError::InvalidDateTime { date: date.to_string(), time: time.to_string() };

    let naive_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let naive_time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|_| invalid())?;

    tz.from_local_datetime(&naive_date.and_time(naive_time))
        .earliest()
        .ok_or_else(invalid)
}


/// A debug utility that pretty-prints a calendar
pub fn print_calendar(calendar: &Calendar) {
    for (day_key, bucket) in calendar.iter() {
        println!("DAY {} ({} tasks)", day_key, bucket.len());
        let mut tasks: Vec<&Task> = bucket.values().collect();
        tasks.sort_by(|l, r| comparison::compare_tasks_by_time(l, r));
        for task in tasks {
            print_task(task);
        }
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    println!("    {} {} {}\t{}", completion, formatted_time(task.when()), task.title(), task.id());
}
