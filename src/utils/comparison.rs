//! Utilities to compare custom types
//!
//! These can be used to sort results, e.g. with `sort_by`, which is stable

use std::cmp::Ordering;

use crate::assignment::Assignment;

/// Compare assignments by due date. Assignments that have a due date come first, earliest first.
///
/// Two assignments due the same day (or both without due date) compare as equal
pub fn compare_by_due_date(left: &Assignment, right: &Assignment) -> Ordering {
    match (left.due(), right.due()) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
