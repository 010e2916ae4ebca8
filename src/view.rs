//! The surface a week-view UI binds to
//!
//! A [`CalendarView`] wires a [`CalendarStore`] to a [`Storage`] backend.
//! Every action that changes the calendar is written through to the storage, then published to subscribers,
//! which can re-render from the snapshot they receive.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::calendar::{Calendar, CalendarStore};
use crate::codec;
use crate::error::CalendarError;
use crate::storage::Storage;
use crate::task::{random_task_id, Task, TaskId, TaskStatus, TaskStyle};
use crate::utils::{date_key, parse_local_datetime, shift_days, week_window, DayKey};

/// Identifies a subscription, so that it can be cancelled
pub type SubscriptionId = usize;

type Subscriber = Box<dyn FnMut(&Arc<Calendar>)>;

/// The content of a "create task" / "update task" form.
///
/// Date and time are the raw `YYYY-MM-DD` and `HH:MM` strings the UI collected
#[derive(Clone, Debug, PartialEq)]
pub struct TaskForm {
    pub identifier: TaskId,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub color: String,
    /// The day the task was displayed under before this edit, if it is an edit
    pub previous_day_key: Option<DayKey>,
}

impl TaskForm {
    /// A form for a brand new task. A new (random) identifier is picked
    pub fn new(title: &str, description: &str, date: &str, time: &str, color: &str) -> Self {
        Self {
            identifier: random_task_id(),
            title: title.to_string(),
            description: description.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            color: color.to_string(),
            previous_day_key: None,
        }
    }

    /// Turn this form into an edit of an existing task
    pub fn editing(mut self, identifier: &str, previous_day_key: Option<&str>) -> Self {
        self.identifier = identifier.to_string();
        self.previous_day_key = previous_day_key.map(|day| day.to_string());
        self
    }
}

/// Something a user did on a displayed task
#[derive(Clone, Debug, PartialEq)]
pub enum TaskEvent {
    /// The task was clicked: its description is expanded (or collapsed) and it gets the focus
    Click { day_key: DayKey, id: TaskId },
    Complete { day_key: DayKey, id: TaskId },
    Reopen { day_key: DayKey, id: TaskId },
    Delete { day_key: DayKey, id: TaskId },
}


/// Binds a calendar to its storage and to the UI
pub struct CalendarView<S: Storage> {
    store: CalendarStore,
    storage: S,
    storage_key: String,

    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription_id: SubscriptionId,

    /// The task currently open in an edit form, if any
    focused: Option<(DayKey, TaskId)>,
    /// Any date of the week that is currently displayed
    active_date: NaiveDate,
}

impl<S: Storage> CalendarView<S> {
    /// Load the calendar persisted under the default [`storage key`](crate::config::STORAGE_KEY).
    ///
    /// In case the persisted data cannot be read or decoded, the view starts with an empty calendar, and the
    /// error is returned alongside it.
    pub fn open(storage: S) -> (Self, Option<CalendarError>) {
        Self::open_with_key(storage, &crate::config::storage_key())
    }

    /// Same as [`Self::open`], with a custom storage key
    pub fn open_with_key(mut storage: S, storage_key: &str) -> (Self, Option<CalendarError>) {
        let (calendar, error) = match load(&mut storage, storage_key) {
            Ok(calendar) => (calendar, None),
            Err(err) => {
                log::error!("Unable to load the calendar: {}. Starting with an empty calendar", err);
                (Calendar::new(), Some(err))
            },
        };
        log::info!("Calendar loaded with {} tasks", calendar.task_count());

        let view = Self {
            store: CalendarStore::from_calendar(calendar),
            storage,
            storage_key: storage_key.to_string(),
            subscribers: Vec::new(),
            next_subscription_id: 0,
            focused: None,
            active_date: Local::now().date_naive(),
        };
        (view, error)
    }

    /// The current snapshot. It must be treated as read-only: it never changes, further mutations produce new snapshots
    pub fn calendar(&self) -> Arc<Calendar> {
        self.store.get()
    }

    pub fn storage(&self) -> &S { &self.storage }
    pub fn storage_mut(&mut self) -> &mut S { &mut self.storage }
    pub fn storage_key(&self) -> &str { &self.storage_key }

    /// Get notified with the new snapshot every time the calendar changes
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Arc<Calendar>) + 'static,
    {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns whether this subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let count = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != count
    }

    /// Create a task, or update an existing one.
    ///
    /// In case the task moves to another day, it is removed from its previous day. If the form does not tell what
    /// this previous day was, the view looks it up itself. Copies of the task stored under any other day are removed too.
    /// The status of an existing task is kept. Its description is collapsed.
    ///
    /// Returns `InvalidDateTime` (and changes nothing) if the date or time cannot be parsed.
    /// Returns `PersistenceWrite` if the storage refused the new data, in which case the calendar has been updated in memory anyway.
    pub fn create_or_update_task(&mut self, form: TaskForm) -> Result<Arc<Calendar>, CalendarError> {
        let TaskForm { identifier, title, description, date, time, color, previous_day_key } = form;
        let when = parse_local_datetime(&date, &time)?;

        // The day the task actually is stored under wins over what the form remembers
        let previous_day_key = match previous_day_key {
            Some(day) if self.store.find(&day, &identifier).is_some() => Some(day),
            _ => self.store.locate(&identifier),
        };
        let status = previous_day_key.as_deref()
            .and_then(|day| self.store.find(day, &identifier))
            .map(|existing| existing.status())
            .unwrap_or(TaskStatus::Open);

        let color = if color.is_empty() { crate::config::default_task_color() } else { color };
        let style = TaskStyle::new(color);
        if style.parsed_bg_color().is_none() {
            log::warn!("Task {} has an invalid color {:?}", identifier, style.bg_color());
        }

        let task = Task::new_with_parameters(identifier, title, description, when, status, false, style);
        if let Some((focused_day, focused_id)) = &mut self.focused {
            if focused_id == task.id() {
                *focused_day = task.day_key();
            }
        }

        let before = self.store.get();
        // Older data may hold the same task under several days. Only the one we move from is handled by `upsert`
        for stale_day in self.store.locate_all(task.id()) {
            if Some(&stale_day) != previous_day_key.as_ref() {
                log::warn!("Task {} is duplicated under {}. Removing this copy", task.id(), stale_day);
                self.store.delete(&stale_day, task.id());
            }
        }
        let after = self.store.upsert(task, previous_day_key.as_deref());
        self.publish(before, after)
    }

    /// Mark a task as done
    pub fn complete_task(&mut self, id: &str, day_key: &str) -> Result<Arc<Calendar>, CalendarError> {
        let before = self.store.get();
        let after = self.store.set_status(day_key, id, TaskStatus::Complete);
        self.publish(before, after)
    }

    /// Mark a task as not done anymore
    pub fn reopen_task(&mut self, id: &str, day_key: &str) -> Result<Arc<Calendar>, CalendarError> {
        let before = self.store.get();
        let after = self.store.set_status(day_key, id, TaskStatus::Open);
        self.publish(before, after)
    }

    /// Expand or collapse the description of a task
    pub fn toggle_description(&mut self, day_key: &str, id: &str) -> Result<Arc<Calendar>, CalendarError> {
        let before = self.store.get();
        let after = self.store.toggle_description_visibility(day_key, id);
        self.publish(before, after)
    }

    pub fn delete_task(&mut self, day_key: &str, id: &str) -> Result<Arc<Calendar>, CalendarError> {
        if matches!(&self.focused, Some((_, focused_id)) if focused_id == id) {
            self.focused = None;
        }
        let before = self.store.get();
        let after = self.store.delete(day_key, id);
        self.publish(before, after)
    }

    /// Dispatch an event coming from a displayed task
    pub fn handle_event(&mut self, event: TaskEvent) -> Result<Arc<Calendar>, CalendarError> {
        match event {
            TaskEvent::Click { day_key, id } => {
                if self.store.find(&day_key, &id).is_some() {
                    self.focused = Some((day_key.clone(), id.clone()));
                }
                self.toggle_description(&day_key, &id)
            },
            TaskEvent::Complete { day_key, id } => self.complete_task(&id, &day_key),
            TaskEvent::Reopen { day_key, id } => self.reopen_task(&id, &day_key),
            TaskEvent::Delete { day_key, id } => self.delete_task(&day_key, &id),
        }
    }

    /// The task currently open in an edit form, if it still exists
    pub fn focused_task(&self) -> Option<Task> {
        let (day_key, id) = self.focused.as_ref()?;
        self.store.find(day_key, id).cloned()
    }

    pub fn focus(&mut self, day_key: &str, id: &str) {
        self.focused = Some((day_key.to_string(), id.to_string()));
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// The seven dates (Monday to Sunday) currently displayed
    pub fn visible_week(&self) -> [NaiveDate; 7] {
        week_window(&self.active_date)
    }

    /// Display the week that contains `date`
    pub fn go_to(&mut self, date: NaiveDate) {
        self.active_date = date;
    }

    pub fn next_week(&mut self) {
        self.active_date = shift_days(&self.active_date, 7);
    }

    pub fn previous_week(&mut self) {
        self.active_date = shift_days(&self.active_date, -7);
    }

    /// The tasks of every displayed day, in order. Days without tasks have an empty list
    pub fn visible_tasks(&self) -> Vec<(DayKey, Vec<Task>)> {
        let calendar = self.store.get();
        self.visible_week().iter()
            .map(|date| {
                let key = date_key(date);
                let mut tasks: Vec<Task> = calendar.bucket(&key)
                    .map(|bucket| bucket.values().cloned().collect())
                    .unwrap_or_default();
                tasks.sort_by(crate::utils::comparison::compare_tasks_by_time);
                (key, tasks)
            })
            .collect()
    }

    /// Write the new snapshot through to the storage, and notify subscribers.
    /// Nothing happens in case the snapshot did not change
    fn publish(&mut self, before: Arc<Calendar>, new_calendar: Arc<Calendar>) -> Result<Arc<Calendar>, CalendarError> {
        if Arc::ptr_eq(&before, &new_calendar) {
            return Ok(new_calendar);
        }

        let persisted = self.persist(&new_calendar);
        if let Err(err) = &persisted {
            log::warn!("Unable to persist the calendar: {}. Changes are only kept in memory", err);
        }

        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&new_calendar);
        }

        persisted.map(|_| new_calendar)
    }

    fn persist(&mut self, calendar: &Calendar) -> Result<(), CalendarError> {
        let text = codec::encode(calendar)?;
        self.storage.write(&self.storage_key, &text)
    }
}

fn load<S: Storage>(storage: &mut S, key: &str) -> Result<Calendar, CalendarError> {
    match storage.read(key)? {
        None => Ok(Calendar::new()),
        Some(text) => codec::decode(&text),
    }
}
