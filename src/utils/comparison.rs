//! Utilities to compare tasks
//!
//! These can be used to sort results, e.g. the content of a day bucket

use std::cmp::Ordering;

use crate::task::Task;

/// Compare tasks chronologically, then alphabetically by title
pub fn compare_tasks_by_time(left: &Task, right: &Task) -> Ordering {
    left.when().cmp(right.when())
        .then_with(|| compare_tasks_alpha(left, right))
}

/// Compare tasks alphabetically by title
pub fn compare_tasks_alpha(left: &Task, right: &Task) -> Ordering {
    Ord::cmp(&left.title().to_lowercase(), &right.title().to_lowercase())
}
