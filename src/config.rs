//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The storage key the calendar is persisted under, unless a view is opened with an explicit one.
/// Feel free to override it when initing this library.
pub static STORAGE_KEY: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("calendarData".to_string())));

/// The background color given to tasks that do not specify one.
/// Feel free to override it when initing this library.
pub static DEFAULT_TASK_COLOR: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("#2eab62".to_string())));

/// The colors a user can pick from when creating a task
pub static TASK_COLORS: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["#2eab62", "#3f51b5", "#f44336", "#ff9800", "#607d8b"]);

/// Returns the current value of [`STORAGE_KEY`]
pub fn storage_key() -> String {
    read_setting(&STORAGE_KEY)
}

/// Returns the current value of [`DEFAULT_TASK_COLOR`]
pub fn default_task_color() -> String {
    read_setting(&DEFAULT_TASK_COLOR)
}

fn read_setting(setting: &Mutex<String>) -> String {
    // A poisoned lock still holds a valid string
    match setting.lock() {
        Ok(value) => value.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
