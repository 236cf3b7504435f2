//! Utilities to track the progression of a fetch

use std::fmt::{Display, Error, Formatter};

/// A course whose coursework could not be fetched
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedCourse {
    pub course_id: String,
    pub course_name: String,
    /// Why it has been skipped
    pub reason: String,
}

impl Display for SkippedCourse {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} ({}): {}", self.course_name, self.course_id, self.reason)
    }
}


/// A structure that tracks the progression and the skipped courses of a fetch
#[derive(Debug, Default)]
pub struct FetchProgress {
    n_courses: usize,
    n_items: usize,
    skipped: Vec<SkippedCourse>,
}

impl FetchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a course that has been successfully fetched
    pub fn course_done(&mut self, n_items: usize) {
        self.n_courses += 1;
        self.n_items += n_items;
    }

    /// Record (and log) a course that has been skipped
    pub fn skip(&mut self, course_id: &str, course_name: &str, reason: String) {
        log::warn!("Skipping course {} ({}): {}", course_name, course_id, reason);
        self.skipped.push(SkippedCourse {
            course_id: course_id.to_string(),
            course_name: course_name.to_string(),
            reason,
        });
    }

    /// Log an info
    pub fn info(&self, text: &str) {
        log::info!("{}", text);
    }
    /// Log a debug message
    pub fn debug(&self, text: &str) {
        log::debug!("{}", text);
    }

    /// Log a summary, and hand the skipped courses over
    pub fn finish(self) -> Vec<SkippedCourse> {
        self.info(&format!("Fetched {} items from {} courses ({} skipped)", self.n_items, self.n_courses, self.skipped.len()));
        self.skipped
    }
}
