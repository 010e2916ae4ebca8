//! Errors that can happen while handling calendar data

use thiserror::Error;

/// Everything that can go wrong in this crate.
///
/// Looking up a task that does not exist is not an error: lookups return an `Option`,
/// and mutations that address a missing task simply leave the calendar unchanged.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The persisted text is not a valid calendar
    #[error("unable to decode persisted calendar data: {0}")]
    Decode(#[source] serde_json::Error),

    /// The calendar could not be turned into its persisted form
    #[error("unable to encode calendar data: {0}")]
    Encode(#[source] serde_json::Error),

    /// A persisted task holds a timestamp that cannot be represented as a local date
    #[error("invalid timestamp in persisted data: {0}")]
    InvalidTimestamp(i64),

    /// The storage backend could not be read
    #[error("unable to read from storage: {0}")]
    PersistenceRead(String),

    /// The storage backend refused a write.
    /// In-memory data is left as it was after the mutation
    #[error("unable to write to storage: {0}")]
    PersistenceWrite(String),

    /// A date/time pair coming from the user cannot be turned into a local instant
    #[error("invalid date/time {date:?} {time:?}")]
    InvalidDateTime { date: String, time: String },
}

impl CalendarError {
    /// Whether this error leaves the in-memory calendar usable as-is
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, CalendarError::PersistenceRead(_) | CalendarError::PersistenceWrite(_))
    }
}
