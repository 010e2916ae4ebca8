//! The calendar store: tasks, grouped by day then by identifier
//!
//! The store never mutates data in place. Every mutation builds a new [`Calendar`] snapshot that only replaces the
//! day bucket it touched, and keeps sharing every other bucket with the previous snapshot.
//! Callers can thus detect changes by comparing snapshots with [`Arc::ptr_eq`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};

use crate::task::{Task, TaskId, TaskStatus, TaskStyle};
use crate::utils::{date_key, hour_minute, DayKey};
use crate::utils::comparison::compare_tasks_by_time;

/// The tasks of a single day, by identifier
pub type Bucket = HashMap<TaskId, Task>;

/// An immutable snapshot of every task, by day
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Calendar {
    days: BTreeMap<DayKey, Arc<Bucket>>,
}

impl Calendar {
    /// Create an empty calendar
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a calendar out of already-grouped buckets.
    ///
    /// Tasks are kept under the day they are given, even if this does not match their `when`.
    pub fn from_buckets(buckets: BTreeMap<DayKey, Bucket>) -> Self {
        Self {
            days: buckets.into_iter()
                .map(|(day, bucket)| (day, Arc::new(bucket)))
                .collect()
        }
    }

    /// Iterate over every day bucket, in chronological order.
    /// Empty buckets may be returned
    pub fn iter(&self) -> impl Iterator<Item = (&DayKey, &Bucket)> {
        self.days.iter().map(|(day, bucket)| (day, bucket.as_ref()))
    }

    pub fn bucket(&self, day_key: &str) -> Option<&Bucket> {
        self.days.get(day_key).map(|bucket| bucket.as_ref())
    }

    /// Look for a task. Not finding it is a perfectly normal outcome
    pub fn find(&self, day_key: &str, id: &str) -> Option<&Task> {
        self.bucket(day_key).and_then(|bucket| bucket.get(id))
    }

    /// Returns the day a task is stored under, if any
    pub fn locate(&self, id: &str) -> Option<&DayKey> {
        self.days.iter()
            .find(|(_, bucket)| bucket.contains_key(id))
            .map(|(day, _)| day)
    }

    /// Returns every day a task is stored under.
    /// This is more than one day only for data that was written with duplicates
    pub fn locate_all(&self, id: &str) -> Vec<&DayKey> {
        self.days.iter()
            .filter(|(_, bucket)| bucket.contains_key(id))
            .map(|(day, _)| day)
            .collect()
    }

    /// Returns the tasks of a day that are scheduled in a given hour, sorted by time
    pub fn tasks_at_hour(&self, day_key: &str, hour: u32) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = match self.bucket(day_key) {
            None => return Vec::new(),
            Some(bucket) => bucket.values()
                .filter(|task| hour_minute(task.when()).0 == hour)
                .collect(),
        };
        tasks.sort_by(|l, r| compare_tasks_by_time(l, r));
        tasks
    }

    /// Total count of tasks, across every day
    pub fn task_count(&self) -> usize {
        self.days.values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.task_count() == 0
    }

    /// Whether both snapshots hold the very same bucket (not a copy) for this day
    pub fn shares_bucket_with(&self, other: &Calendar, day_key: &str) -> bool {
        match (self.days.get(day_key), other.days.get(day_key)) {
            (Some(l), Some(r)) => Arc::ptr_eq(l, r),
            _ => false,
        }
    }

    /// Returns a new snapshot, where only the bucket of `day_key` has been replaced by an edited copy
    fn with_bucket<F>(&self, day_key: &str, edit: F) -> Calendar
    where
        F: FnOnce(&mut Bucket),
    {
        let mut bucket = match self.days.get(day_key) {
            Some(existing) => existing.as_ref().clone(),
            None => Bucket::new(),
        };
        edit(&mut bucket);

        let mut days = self.days.clone();
        days.insert(day_key.to_string(), Arc::new(bucket));
        Calendar { days }
    }
}


/// Owner of the canonical calendar
#[derive(Debug, Default)]
pub struct CalendarStore {
    current: Arc<Calendar>,
}

impl CalendarStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing data
    pub fn from_calendar(calendar: Calendar) -> Self {
        Self { current: Arc::new(calendar) }
    }

    /// Returns the current snapshot
    pub fn get(&self) -> Arc<Calendar> {
        Arc::clone(&self.current)
    }

    /// Insert a task, or overwrite the task with the same identifier.
    ///
    /// The task is stored under the day of its `when`. In case `previous_day_key` is given and differs from it, the
    /// task is first removed from the bucket of `previous_day_key` (if it is there), so that it ends up in exactly one bucket.
    pub fn upsert(&mut self, task: Task, previous_day_key: Option<&str>) -> Arc<Calendar> {
        let new_day_key = task.day_key();

        let mut calendar = self.current.as_ref().clone();
        if let Some(previous) = previous_day_key {
            if previous != new_day_key {
                if calendar.find(previous, task.id()).is_some() {
                    log::debug!("Moving task {} from {} to {}", task.id(), previous, new_day_key);
                    calendar = calendar.with_bucket(previous, |bucket| { bucket.remove(task.id()); });
                } else {
                    log::debug!("Task {} was not stored under {}, nothing to clean up", task.id(), previous);
                }
            }
        }

        let calendar = calendar.with_bucket(&new_day_key, move |bucket| {
            bucket.insert(task.id().clone(), task);
        });
        self.commit(calendar)
    }

    /// Remove a task. This is a no-op if it does not exist
    pub fn delete(&mut self, day_key: &str, id: &str) -> Arc<Calendar> {
        if self.current.find(day_key, id).is_none() {
            log::debug!("No task {} on {} to delete", id, day_key);
            return self.get();
        }

        let calendar = self.current.with_bucket(day_key, |bucket| { bucket.remove(id); });
        self.commit(calendar)
    }

    /// Expand or collapse the description of a task. This is a no-op if it does not exist
    pub fn toggle_description_visibility(&mut self, day_key: &str, id: &str) -> Arc<Calendar> {
        self.edit_task(day_key, id, |task| {
            task.toggle_description();
            true
        })
    }

    /// Change the status of a task. This is a no-op if it does not exist
    pub fn set_status(&mut self, day_key: &str, id: &str, status: TaskStatus) -> Arc<Calendar> {
        self.edit_task(day_key, id, |task| {
            if task.status() == status {
                return false;
            }
            task.set_status(status);
            true
        })
    }

    /// Look for a task
    pub fn find(&self, day_key: &str, id: &str) -> Option<&Task> {
        self.current.find(day_key, id)
    }

    /// Returns the day a task is currently stored under
    pub fn locate(&self, id: &str) -> Option<DayKey> {
        self.current.locate(id).cloned()
    }

    /// Returns every day a task is currently stored under
    pub fn locate_all(&self, id: &str) -> Vec<DayKey> {
        self.current.locate_all(id).into_iter().cloned().collect()
    }

    /// Apply `edit` to a copy of the addressed task. `edit` returns whether it actually changed something,
    /// otherwise the current snapshot is kept
    fn edit_task<F>(&mut self, day_key: &str, id: &str, edit: F) -> Arc<Calendar>
    where
        F: FnOnce(&mut Task) -> bool,
    {
        let mut task = match self.current.find(day_key, id) {
            None => {
                log::debug!("No task {} on {}, leaving the calendar unchanged", id, day_key);
                return self.get();
            },
            Some(task) => task.clone(),
        };

        if edit(&mut task) == false {
            return self.get();
        }

        let calendar = self.current.with_bucket(day_key, move |bucket| {
            bucket.insert(task.id().clone(), task);
        });
        self.commit(calendar)
    }

    fn commit(&mut self, calendar: Calendar) -> Arc<Calendar> {
        self.current = Arc::new(calendar);
        self.get()
    }
}


/// Build a week of sample tasks, five per day starting at 08:45, beginning on `start`
pub fn sample_week(start: &NaiveDate) -> Calendar {
    let mut buckets = BTreeMap::new();

    for offset in 0..7 {
        let date = crate::utils::shift_days(start, offset);
        let mut bucket = Bucket::new();

        for i in 0..5 {
            let when = match date.and_hms_opt(8 + i, 45, 0).and_then(|naive| Local.from_local_datetime(&naive).earliest()) {
                Some(when) => when,
                None => continue,
            };
            let id = format!("task-{}", when.timestamp_millis());
            let task = Task::new_with_parameters(
                id.clone(),
                format!("Task {}", i),
                format!("Description for Task {}", i),
                when,
                TaskStatus::Open,
                false,
                TaskStyle::default(),
            );
            bucket.insert(id, task);
        }

        buckets.insert(date_key(&date), bucket);
    }

    Calendar::from_buckets(buckets)
}
