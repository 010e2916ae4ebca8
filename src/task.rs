//! Time-boxed tasks, as displayed in a week view

use chrono::{DateTime, Local, SubsecRound};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::{day_key, DayKey};

/// Opaque, stable identifier of a task
pub type TaskId = String;

/// Generate a new random task identifier
pub fn random_task_id() -> TaskId {
    Uuid::new_v4().to_hyphenated().to_string()
}

/// Whether a task has been done.
///
/// A task can only go from `Open` to `Complete` and back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Open,
    Complete,
}

impl TaskStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Complete)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Open
    }
}

/// How a task should be displayed
#[derive(Clone, Debug, PartialEq)]
pub struct TaskStyle {
    bg_color: String,
}

impl TaskStyle {
    pub fn new(bg_color: String) -> Self {
        Self { bg_color }
    }

    pub fn bg_color(&self) -> &str { &self.bg_color }

    /// Parses the background color tag, if it is a valid CSS color
    pub fn parsed_bg_color(&self) -> Option<csscolorparser::Color> {
        csscolorparser::parse(&self.bg_color).ok()
    }
}

impl Default for TaskStyle {
    fn default() -> Self {
        Self::new(crate::config::default_task_color())
    }
}

/// A to-do task that is scheduled at a given time
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    /// Persistent, unique identifier, that never changes over the lifetime of the task
    id: TaskId,

    title: String,
    description: String,

    /// When this task is scheduled. This decides which day (and which row of this day) it is displayed in
    when: DateTime<Local>,

    status: TaskStatus,

    /// Whether the UI currently expands the description.
    /// This is persisted, but has no other meaning than a display hint
    show_description: bool,

    style: TaskStyle,
}

impl Task {
    /// Create a brand new Task.
    /// This will pick a new (random) task ID.
    pub fn new(title: String, description: String, when: DateTime<Local>, style: TaskStyle) -> Self {
        Self::new_with_parameters(random_task_id(), title, description, when, TaskStatus::Open, false, style)
    }

    /// Create a new Task instance, with an existing ID (e.g. when editing a task, or when reading persisted data)
    ///
    /// `when` is truncated to the millisecond, which is the precision it is persisted with
    pub fn new_with_parameters(id: TaskId, title: String, description: String, when: DateTime<Local>,
                               status: TaskStatus, show_description: bool, style: TaskStyle,
                            ) -> Self
    {
        Self {
            id,
            title,
            description,
            when: when.trunc_subsecs(3),
            status,
            show_description,
            style,
        }
    }

    pub fn id(&self) -> &TaskId                 { &self.id          }
    pub fn title(&self) -> &str                 { &self.title       }
    pub fn description(&self) -> &str           { &self.description }
    pub fn when(&self) -> &DateTime<Local>      { &self.when        }
    pub fn status(&self) -> TaskStatus          { self.status       }
    pub fn completed(&self) -> bool             { self.status.is_complete() }
    pub fn show_description(&self) -> bool      { self.show_description }
    pub fn style(&self) -> &TaskStyle           { &self.style       }

    /// The day this task belongs to
    pub fn day_key(&self) -> DayKey {
        day_key(&self.when)
    }

    /// Mark this task as done
    pub fn complete(&mut self) {
        self.set_status(TaskStatus::Complete);
    }

    /// Mark this task as not done anymore
    pub fn reopen(&mut self) {
        self.set_status(TaskStatus::Open);
    }

    pub fn set_status(&mut self, new_status: TaskStatus) {
        self.status = new_status;
    }

    pub fn toggle_description(&mut self) {
        self.show_description = !self.show_description;
    }
}
