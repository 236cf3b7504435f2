//! Assignments, and how urgent they are

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::course::{Course, CourseWork};
use crate::utils::format_date;

/// Items due within this many days get a countdown in their status
pub const SOON_THRESHOLD_DAYS: i64 = 3;

/// How urgent an assignment is, relative to a given day.
///
/// Use `to_string()` to get the label that is displayed in the report
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    /// The due date has passed
    Overdue(NaiveDate),
    DueToday,
    /// Due within a few days. Holds the number of days left, and the due date
    DueSoon(i64, NaiveDate),
    /// Due later than that
    DueLater(NaiveDate),
    NoDueDate,
}

impl Status {
    /// Classify a due date relative to `today`
    pub fn classify(due: Option<NaiveDate>, today: NaiveDate) -> Self {
        let due = match due {
            None => return Status::NoDueDate,
            Some(d) => d,
        };

        let delta = due.signed_duration_since(today).num_days();
        if delta < 0 {
            Status::Overdue(due)
        } else if delta == 0 {
            Status::DueToday
        } else if delta <= SOON_THRESHOLD_DAYS {
            Status::DueSoon(delta, due)
        } else {
            Status::DueLater(due)
        }
    }

    pub fn is_overdue(&self) -> bool {
        match self {
            Status::Overdue(_) => true,
            _ => false,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Overdue(due) => write!(f, "OVERDUE (was {})", format_date(due)),
            Status::DueToday => write!(f, "Due TODAY"),
            Status::DueSoon(days, due) => {
                let unit = if *days == 1 { "day" } else { "days" };
                write!(f, "Due in {} {} ({})", days, unit, format_date(due))
            },
            Status::DueLater(due) => write!(f, "Due {}", format_date(due)),
            Status::NoDueDate => write!(f, "No due date"),
        }
    }
}


/// A coursework item, as displayed in the report
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Display name of the course this belongs to
    course: String,
    title: String,
    due: Option<NaiveDate>,
    /// Computed once, when this assignment is created
    status: Status,
}

impl Assignment {
    pub fn new(course: String, title: String, due: Option<NaiveDate>, today: NaiveDate) -> Self {
        let status = Status::classify(due, today);
        Self { course, title, due, status }
    }

    /// Build an assignment from the data returned by the API
    pub fn from_course_work(course: &Course, item: &CourseWork, today: NaiveDate) -> Self {
        Self::new(course.display_name().to_string(), item.display_title().to_string(), item.due(), today)
    }

    pub fn course(&self) -> &str           { &self.course }
    pub fn title(&self) -> &str            { &self.title  }
    pub fn due(&self) -> Option<NaiveDate> { self.due     }
    pub fn status(&self) -> &Status        { &self.status }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "- {}: {} — {}", self.course, self.title, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn label(delta: i64) -> String {
        Status::classify(Some(today() + Duration::days(delta)), today()).to_string()
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(label(-1), "OVERDUE (was Mar 09, 2025)");
        assert_eq!(label(0), "Due TODAY");
        assert_eq!(label(1), "Due in 1 day (Mar 11, 2025)");
        assert_eq!(label(2), "Due in 2 days (Mar 12, 2025)");
        assert_eq!(label(3), "Due in 3 days (Mar 13, 2025)");
        assert_eq!(label(4), "Due Mar 14, 2025");
        assert_eq!(Status::classify(None, today()).to_string(), "No due date");
    }

    #[test]
    fn classification_variants() {
        assert!(Status::classify(Some(today() - Duration::days(30)), today()).is_overdue());
        assert_eq!(Status::classify(Some(today()), today()), Status::DueToday);
        assert_eq!(Status::classify(Some(today() + Duration::days(400)), today()),
                   Status::DueLater(NaiveDate::from_ymd_opt(2026, 4, 14).unwrap()));
        assert_eq!(Status::classify(None, today()).is_overdue(), false);
    }

    #[test]
    fn classification_is_idempotent() {
        for delta in -5..10 {
            let due = Some(today() + Duration::days(delta));
            assert_eq!(Status::classify(due, today()), Status::classify(due, today()));
        }
    }

    #[test]
    fn assignment_line() {
        let course = Course::new("1", "Maths");
        let item = CourseWork::new("Homework 3", Some(crate::course::DueDate::new(2025, 3, 10)));
        let assignment = Assignment::from_course_work(&course, &item, today());
        assert_eq!(assignment.status(), &Status::DueToday);
        assert_eq!(assignment.to_string(), "- Maths: Homework 3 — Due TODAY");

        let untitled = CourseWork::default();
        let assignment = Assignment::from_course_work(&course, &untitled, today());
        assert_eq!(assignment.to_string(), "- Maths: Untitled — No due date");
    }
}
