//! The status file displayed by the desktop widget

use std::fmt::{Display, Formatter};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::assignment::Assignment;
use crate::utils::comparison::compare_by_due_date;

/// Order assignments by due date (undated ones last, ties keep their order), and drop the overdue ones
pub fn upcoming(mut assignments: Vec<Assignment>) -> Vec<Assignment> {
    assignments.sort_by(compare_by_due_date);
    assignments.retain(|a| a.status().is_overdue() == false);
    assignments
}

/// A successful report
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    generated_at: NaiveDateTime,
    /// Already sorted and filtered
    assignments: Vec<Assignment>,
}

impl Report {
    /// Build a report from fetched assignments, that will be sorted and filtered
    pub fn new(generated_at: NaiveDateTime, assignments: Vec<Assignment>) -> Self {
        Self { generated_at, assignments: upcoming(assignments) }
    }

    pub fn generated_at(&self) -> &NaiveDateTime { &self.generated_at }
    pub fn assignments(&self) -> &[Assignment]    { &self.assignments }

    /// Overwrite `path` with this report
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_string())?;
        log::info!("Wrote {} assignments to {:?}", self.assignments.len(), path);
        Ok(())
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "📚 Google Classroom    (Last update: {})", self.generated_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(f)?;
        if self.assignments.is_empty() {
            writeln!(f, "✅ No upcoming assignments.")?;
        } else {
            for assignment in &self.assignments {
                writeln!(f, "{}", assignment)?;
            }
        }
        Ok(())
    }
}

/// The text that replaces the report when a run fails
pub fn failure_text<E: Display + ?Sized>(error: &E) -> String {
    format!("⚠️ Error fetching Classroom data\n{}\n", error)
}

/// Overwrite `path` with an error report
pub fn write_failure<E: Display + ?Sized>(path: &Path, error: &E) -> std::io::Result<()> {
    std::fs::write(path, failure_text(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(8, 3, 0).unwrap()
    }

    fn assignment(title: &str, delta: Option<i64>) -> Assignment {
        let due = delta.map(|d| today() + Duration::days(d));
        Assignment::new("Course".to_string(), title.to_string(), due, today())
    }

    fn titles(assignments: &[Assignment]) -> Vec<&str> {
        assignments.iter().map(|a| a.title()).collect()
    }

    #[test]
    fn sort_is_stable_and_puts_undated_last() {
        let input = vec![
            assignment("undated 1", None),
            assignment("in 5 days", Some(5)),
            assignment("today A", Some(0)),
            assignment("undated 2", None),
            assignment("in 1 day", Some(1)),
            assignment("today B", Some(0)),
        ];
        let sorted = upcoming(input);
        assert_eq!(titles(&sorted), vec!["today A", "today B", "in 1 day", "in 5 days", "undated 1", "undated 2"]);
    }

    #[test]
    fn sort_does_not_depend_on_input_order() {
        let a = assignment("a", Some(2));
        let b = assignment("b", Some(1));
        let c = assignment("c", None);
        let orders = vec![
            vec![a.clone(), b.clone(), c.clone()],
            vec![c.clone(), b.clone(), a.clone()],
            vec![b.clone(), c.clone(), a.clone()],
        ];
        for order in orders {
            assert_eq!(titles(&upcoming(order)), vec!["b", "a", "c"]);
        }
    }

    #[test]
    fn overdue_items_are_dropped() {
        let input = vec![
            assignment("long ago", Some(-30)),
            assignment("yesterday", Some(-1)),
            assignment("today", Some(0)),
            assignment("undated", None),
        ];
        let filtered = upcoming(input);
        assert_eq!(titles(&filtered), vec!["today", "undated"]);
        assert!(filtered.iter().all(|a| a.status().to_string().starts_with("OVERDUE") == false));
    }

    #[test]
    fn upcoming_is_idempotent() {
        let input = vec![
            assignment("b", Some(3)),
            assignment("a", Some(-2)),
            assignment("c", None),
            assignment("d", Some(1)),
        ];
        let once = upcoming(input.clone());
        assert_eq!(upcoming(input), once);
        assert_eq!(upcoming(once.clone()), once);
    }

    #[test]
    fn render_empty_report() {
        let report = Report::new(now(), vec![assignment("yesterday", Some(-1))]);
        assert_eq!(report.to_string(),
                   "📚 Google Classroom    (Last update: 2025-01-05 08:03)\n\n✅ No upcoming assignments.\n");
    }

    #[test]
    fn render_report() {
        let report = Report::new(now(), vec![
            assignment("Essay", None),
            assignment("Lab", Some(2)),
            assignment("Quiz", Some(10)),
        ]);
        assert_eq!(report.to_string(),
                   "📚 Google Classroom    (Last update: 2025-01-05 08:03)\n\n\
                    - Course: Lab — Due in 2 days (Jan 07, 2025)\n\
                    - Course: Quiz — Due Jan 15, 2025\n\
                    - Course: Essay — No due date\n");
    }

    #[test]
    fn files_are_overwritten() {
        let folder = tempfile::tempdir().unwrap();
        let path = folder.path().join("classroom.txt");
        std::fs::write(&path, "some much longer stale content that must disappear entirely\n".repeat(10)).unwrap();

        let report = Report::new(now(), Vec::new());
        report.write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), report.to_string());

        write_failure(&path, "boom").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "⚠️ Error fetching Classroom data\nboom\n");
    }
}
