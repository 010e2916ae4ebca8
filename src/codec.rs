//! Conversion between a [`Calendar`] and the text it is persisted as
//!
//! The persisted layout is a JSON object, keyed by day (`YYYY-MM-DD`), then by task identifier.
//! Instants are stored as epoch milliseconds:
//! ```json
//! { "2024-03-04": { "t1": { "identifier": "t1", "title": "...", "description": "...", "when": 1709539200000,
//!                           "showDescription": false, "status": "Open", "style": { "bgColor": "#2eab62" } } } }
//! ```

use std::collections::BTreeMap;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::calendar::{Bucket, Calendar};
use crate::error::CalendarError;
use crate::task::{Task, TaskStatus, TaskStyle};
use crate::utils::{day_key, DayKey};

/// The persisted form of a [`Task`]
///
/// Unknown fields (e.g. event handlers that older versions used to leak into storage) are ignored when reading
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedTask {
    identifier: String,
    title: String,
    #[serde(default)]
    description: String,
    when: i64,
    #[serde(default)]
    show_description: bool,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    style: PersistedStyle,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStyle {
    bg_color: String,
}

impl Default for PersistedStyle {
    fn default() -> Self {
        Self { bg_color: crate::config::default_task_color() }
    }
}

type PersistedCalendar = BTreeMap<DayKey, BTreeMap<String, PersistedTask>>;

impl From<&Task> for PersistedTask {
    fn from(task: &Task) -> Self {
        Self {
            identifier: task.id().clone(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            when: task.when().timestamp_millis(),
            show_description: task.show_description(),
            status: task.status(),
            style: PersistedStyle { bg_color: task.style().bg_color().to_string() },
        }
    }
}

impl PersistedTask {
    fn into_task(self) -> Result<Task, CalendarError> {
        let when = Local.timestamp_millis_opt(self.when)
            .single()
            .ok_or(CalendarError::InvalidTimestamp(self.when))?;

        Ok(Task::new_with_parameters(
            self.identifier,
            self.title,
            self.description,
            when,
            self.status,
            self.show_description,
            TaskStyle::new(self.style.bg_color),
        ))
    }
}

/// Serialize a calendar into its persisted text form
pub fn encode(calendar: &Calendar) -> Result<String, CalendarError> {
    let persisted: PersistedCalendar = calendar.iter()
        .map(|(day, bucket)| {
            let tasks: BTreeMap<String, PersistedTask> = bucket.iter()
                .map(|(id, task)| (id.clone(), PersistedTask::from(task)))
                .collect();
            (day.clone(), tasks)
        })
        .collect();

    serde_json::to_string(&persisted).map_err(CalendarError::Encode)
}

/// Restore a calendar from its persisted text form.
///
/// Empty input (or a JSON `null`) gives an empty calendar.
/// Malformed input is an error: partial data is never returned.
pub fn decode(text: &str) -> Result<Calendar, CalendarError> {
    if text.trim().is_empty() {
        return Ok(Calendar::new());
    }

    let persisted: Option<PersistedCalendar> = serde_json::from_str(text).map_err(CalendarError::Decode)?;
    let persisted = match persisted {
        None => return Ok(Calendar::new()),
        Some(p) => p,
    };

    let mut buckets = BTreeMap::new();
    for (day, tasks) in persisted {
        let mut bucket = Bucket::new();
        for (key, persisted_task) in tasks {
            let task = persisted_task.into_task()?;
            if &key != task.id() {
                log::warn!("Task {} is stored under key {}. Using its own identifier", task.id(), key);
            }
            if day_key(task.when()) != day {
                log::warn!("Task {} is stored under {}, but is scheduled on {}", task.id(), day, task.day_key());
            }
            bucket.insert(task.id().clone(), task);
        }
        buckets.insert(day, bucket);
    }

    Ok(Calendar::from_buckets(buckets))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarStore;

    fn sample_calendar() -> Calendar {
        let mut store = CalendarStore::new();
        store.upsert(Task::new_with_parameters("t1".to_string(), "Standup".to_string(), "Daily sync".to_string(),
            Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(), TaskStatus::Open, false,
            TaskStyle::new("#3f51b5".to_string())), None);
        store.upsert(Task::new_with_parameters("t2".to_string(), "Gym".to_string(), String::new(),
            Local.with_ymd_and_hms(2024, 3, 5, 18, 30, 0).unwrap(), TaskStatus::Complete, true,
            TaskStyle::new("#f44336".to_string())), None);
        // This leaves an empty bucket behind
        store.upsert(Task::new_with_parameters("t3".to_string(), "Moved".to_string(), String::new(),
            Local.with_ymd_and_hms(2024, 3, 6, 7, 15, 0).unwrap(), TaskStatus::Open, false,
            TaskStyle::default()), None);
        store.upsert(Task::new_with_parameters("t3".to_string(), "Moved".to_string(), String::new(),
            Local.with_ymd_and_hms(2024, 3, 7, 7, 15, 0).unwrap(), TaskStatus::Open, false,
            TaskStyle::default()), Some("2024-03-06"));
        store.get().as_ref().clone()
    }

    #[test]
    fn round_trip() {
        let calendar = sample_calendar();
        let text = encode(&calendar).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, calendar);
        assert_eq!(decoded.bucket("2024-03-06").map(|b| b.len()), Some(0));
    }

    #[test]
    fn round_trip_below_the_millisecond() {
        let mut store = CalendarStore::new();
        let precise = Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap() + chrono::Duration::microseconds(1500);
        store.upsert(Task::new("Precise".to_string(), String::new(), precise, TaskStyle::default()), None);
        store.upsert(Task::new("Now".to_string(), String::new(), Local::now(), TaskStyle::default()), None);

        let calendar = store.get();
        let decoded = decode(&encode(&calendar).unwrap()).unwrap();
        assert_eq!(&decoded, calendar.as_ref());

        let task = decoded.iter()
            .flat_map(|(_, bucket)| bucket.values())
            .find(|task| task.title() == "Precise")
            .unwrap();
        assert_eq!(task.when().timestamp_millis(), precise.timestamp_millis());
        assert_eq!(task.when().timestamp_subsec_nanos(), 1_000_000);
    }

    #[test]
    fn persisted_layout() {
        let text = encode(&sample_calendar()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let t1 = &value["2024-03-04"]["t1"];
        assert_eq!(t1["identifier"], "t1");
        assert_eq!(t1["title"], "Standup");
        assert_eq!(t1["description"], "Daily sync");
        assert_eq!(t1["when"], Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap().timestamp_millis());
        assert_eq!(t1["showDescription"], false);
        assert_eq!(t1["status"], "Open");
        assert_eq!(t1["style"]["bgColor"], "#3f51b5");

        assert_eq!(value["2024-03-05"]["t2"]["status"], "Complete");
        assert!(value["2024-03-05"]["t2"]["when"].is_i64());
    }

    #[test]
    fn empty_input() {
        assert_eq!(decode("").unwrap(), Calendar::new());
        assert_eq!(decode("   \n").unwrap(), Calendar::new());
        assert_eq!(decode("null").unwrap(), Calendar::new());
        assert_eq!(decode("{}").unwrap(), Calendar::new());
        assert_eq!(encode(&Calendar::new()).unwrap(), "{}");
    }

    #[test]
    fn malformed_input() {
        assert!(matches!(decode("{not valid json"), Err(CalendarError::Decode(_))));
        assert!(matches!(decode("[1, 2]"), Err(CalendarError::Decode(_))));
        // A task without a `when` is not a task
        assert!(matches!(decode(r#"{"2024-03-04": {"t1": {"identifier": "t1", "title": "x"}}}"#), Err(CalendarError::Decode(_))));

        let text = format!(r#"{{"2024-03-04": {{"t1": {{"identifier": "t1", "title": "x", "when": {}}}}}}}"#, i64::MAX);
        assert!(matches!(decode(&text), Err(CalendarError::InvalidTimestamp(_))));
    }

    #[test]
    fn lenient_fields() {
        let when = Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap().timestamp_millis();
        let text = format!(r#"{{"2024-03-04": {{"t1": {{"identifier": "t1", "title": "Old", "when": {}, "onEvent": {{}}}}}}}}"#, when);

        let calendar = decode(&text).unwrap();
        let task = calendar.find("2024-03-04", "t1").unwrap();
        assert_eq!(task.title(), "Old");
        assert_eq!(task.description(), "");
        assert_eq!(task.status(), TaskStatus::Open);
        assert_eq!(task.show_description(), false);
        assert_eq!(task.style().bg_color(), "#2eab62");
    }
}
