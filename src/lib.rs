//! This crate provides the task storage behind a week-view calendar.
//!
//! Tasks are grouped by day (a `YYYY-MM-DD` [day key](utils::day_key)) then by identifier, in a [`CalendarStore`].
//! The store hands out immutable [`Calendar`] snapshots, so that a UI can tell whether something changed by simply comparing pointers.
//!
//! The [`codec`] module turns a calendar into the text it is persisted as (and back). \
//! A [`CalendarView`](view::CalendarView) ties both together with a [`Storage`](storage::Storage) backend: it is what a UI binds to.
//! It writes every change through to the storage, then notifies its subscribers.

pub mod error;
pub use error::CalendarError;

pub mod calendar;
pub use calendar::{Calendar, CalendarStore};
mod task;
pub use task::{Task, TaskId, TaskStatus, TaskStyle};
pub mod codec;
pub mod storage;
pub mod mock_behaviour;
pub mod view;
pub use view::CalendarView;

pub mod config;
pub mod utils;
