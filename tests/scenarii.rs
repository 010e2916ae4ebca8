//! Multiple scenarios that are performed to check the calendar store keeps every task in exactly one bucket

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use week_planner::codec;
use week_planner::{Calendar, CalendarStore, Task, TaskStatus, TaskStyle};

/// Something that is done on the store
pub enum ChangeToApply {
    /// Insert or overwrite a task, optionally telling which day it was displayed under before
    Upsert { id: &'static str, when: DateTime<Local>, previous_day: Option<&'static str> },
    SetStatus { day: &'static str, id: &'static str, status: TaskStatus },
    ToggleDescription { day: &'static str, id: &'static str },
    Delete { day: &'static str, id: &'static str },
}

/// Where a task is expected to be after every change has been applied
pub enum ExpectedState {
    /// The task is nowhere to be found
    None,
    /// The task is only in this bucket, with these properties
    At { day: &'static str, status: TaskStatus, show_description: bool },
}

pub struct Scenario {
    name: &'static str,
    changes: Vec<ChangeToApply>,
    expected: Vec<(&'static str, ExpectedState)>,
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn make_task(id: &str, when: DateTime<Local>) -> Task {
    Task::new_with_parameters(id.to_string(), format!("Task {}", id), format!("About {}", id), when,
        TaskStatus::Open, false, TaskStyle::new("#ff9800".to_string()))
}

pub fn scenarii() -> Vec<Scenario> {
    use ChangeToApply::*;

    vec![
        Scenario {
            name: "insert into an empty store",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 3, 4, 9, 0), previous_day: None },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-04", status: TaskStatus::Open, show_description: false }),
            ],
        },
        Scenario {
            name: "move to the next day",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 3, 4, 9, 0), previous_day: None },
                Upsert { id: "t1", when: at(2024, 3, 5, 9, 0), previous_day: Some("2024-03-04") },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-05", status: TaskStatus::Open, show_description: false }),
            ],
        },
        Scenario {
            name: "same-day edits with and without the previous day",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 3, 4, 9, 0), previous_day: None },
                Upsert { id: "t1", when: at(2024, 3, 4, 11, 0), previous_day: Some("2024-03-04") },
                Upsert { id: "t1", when: at(2024, 3, 4, 23, 59), previous_day: None },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-04", status: TaskStatus::Open, show_description: false }),
            ],
        },
        Scenario {
            name: "moves across a month and a year",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 2, 29, 8, 0), previous_day: None },
                Upsert { id: "t1", when: at(2024, 3, 1, 8, 0), previous_day: Some("2024-02-29") },
                Upsert { id: "t2", when: at(2024, 12, 31, 23, 30), previous_day: None },
                Upsert { id: "t2", when: at(2025, 1, 1, 0, 30), previous_day: Some("2024-12-31") },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-01", status: TaskStatus::Open, show_description: false }),
                ("t2", ExpectedState::At { day: "2025-01-01", status: TaskStatus::Open, show_description: false }),
            ],
        },
        Scenario {
            name: "complete, then undo",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 3, 4, 9, 0), previous_day: None },
                Upsert { id: "t2", when: at(2024, 3, 4, 10, 0), previous_day: None },
                SetStatus { day: "2024-03-04", id: "t1", status: TaskStatus::Complete },
                SetStatus { day: "2024-03-04", id: "t2", status: TaskStatus::Complete },
                SetStatus { day: "2024-03-04", id: "t2", status: TaskStatus::Open },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-04", status: TaskStatus::Complete, show_description: false }),
                ("t2", ExpectedState::At { day: "2024-03-04", status: TaskStatus::Open, show_description: false }),
            ],
        },
        Scenario {
            name: "status changes and toggles on missing tasks are ignored",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 3, 4, 9, 0), previous_day: None },
                SetStatus { day: "2024-03-05", id: "t1", status: TaskStatus::Complete },
                SetStatus { day: "2024-03-04", id: "ghost", status: TaskStatus::Complete },
                ToggleDescription { day: "2024-03-04", id: "ghost" },
                ToggleDescription { day: "2024-03-04", id: "t1" },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-04", status: TaskStatus::Open, show_description: true }),
                ("ghost", ExpectedState::None),
            ],
        },
        Scenario {
            name: "delete, then re-create elsewhere",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 3, 4, 9, 0), previous_day: None },
                Delete { day: "2024-03-04", id: "t1" },
                Delete { day: "2024-03-04", id: "t1" },
                Upsert { id: "t1", when: at(2024, 3, 8, 9, 0), previous_day: None },
                Upsert { id: "t2", when: at(2024, 3, 8, 9, 0), previous_day: None },
                Delete { day: "2024-03-08", id: "t2" },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-08", status: TaskStatus::Open, show_description: false }),
                ("t2", ExpectedState::None),
            ],
        },
        Scenario {
            name: "a move from a stale day does not duplicate",
            changes: vec![
                Upsert { id: "t1", when: at(2024, 3, 4, 9, 0), previous_day: None },
                Upsert { id: "t1", when: at(2024, 3, 6, 9, 0), previous_day: Some("2024-03-04") },
                // The UI still believes the task is on the 4th
                Upsert { id: "t1", when: at(2024, 3, 6, 10, 0), previous_day: Some("2024-03-04") },
            ],
            expected: vec![
                ("t1", ExpectedState::At { day: "2024-03-06", status: TaskStatus::Open, show_description: false }),
            ],
        },
    ]
}

fn apply(store: &mut CalendarStore, change: &ChangeToApply) -> Arc<Calendar> {
    match change {
        ChangeToApply::Upsert { id, when, previous_day } => store.upsert(make_task(id, *when), *previous_day),
        ChangeToApply::SetStatus { day, id, status } => store.set_status(day, id, *status),
        ChangeToApply::ToggleDescription { day, id } => store.toggle_description_visibility(day, id),
        ChangeToApply::Delete { day, id } => store.delete(day, id),
    }
}

/// Check that no identifier appears twice across buckets, and that every task sits under its own day
fn check_invariants(calendar: &Calendar, scenario: &str) {
    let mut seen = HashSet::new();
    for (day, bucket) in calendar.iter() {
        for (id, task) in bucket {
            assert_eq!(id, task.id(), "[{}] bucket key and identifier differ", scenario);
            assert_eq!(&task.day_key(), day, "[{}] task {} is in the wrong bucket", scenario, id);
            assert!(seen.insert(id.clone()), "[{}] task {} is in several buckets", scenario, id);
        }
    }
}

#[test]
fn run_scenarii() {
    let _ = env_logger::builder().is_test(true).try_init();

    for scenario in scenarii() {
        let mut store = CalendarStore::new();
        for change in &scenario.changes {
            let calendar = apply(&mut store, change);
            check_invariants(&calendar, scenario.name);
        }

        let calendar = store.get();
        for (id, expected) in &scenario.expected {
            match expected {
                ExpectedState::None => {
                    assert!(calendar.locate(id).is_none(), "[{}] {} should not exist", scenario.name, id);
                },
                ExpectedState::At { day, status, show_description } => {
                    let task = calendar.find(day, id)
                        .unwrap_or_else(|| panic!("[{}] {} should be on {}", scenario.name, id, day));
                    assert_eq!(task.status(), *status, "[{}] status of {}", scenario.name, id);
                    assert_eq!(task.show_description(), *show_description, "[{}] description of {}", scenario.name, id);
                    assert_eq!(task.title(), format!("Task {}", id));
                },
            }
        }

        // Whatever happened, the persisted form gives the same calendar back
        let text = codec::encode(&calendar).unwrap();
        assert_eq!(&codec::decode(&text).unwrap(), calendar.as_ref(), "[{}] round trip", scenario.name);
    }
}
