//! Courses and coursework, as returned by the Classroom API
//!
//! Only the fields this crate actually reads are modelled, every other field is ignored.

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

/// Name used for courses that have none
pub const UNNAMED_COURSE: &str = "Unnamed Course";
/// Title used for coursework items that have none
pub const UNTITLED: &str = "Untitled";

/// A Classroom course
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course_state: Option<String>,
}

impl Course {
    pub fn new<S: ToString, T: ToString>(id: S, name: T) -> Self {
        Self { id: id.to_string(), name: Some(name.to_string()), course_state: Some("ACTIVE".to_string()) }
    }

    /// The display name, or a placeholder
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_COURSE)
    }
}

/// One page of the "list courses" endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePage {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A calendar date, as Google APIs express it.
///
/// Every field may be missing (or zero) upstream, hence the `Option`s
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DueDate {
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub day: Option<i64>,
}

impl DueDate {
    pub fn new(year: i64, month: i64, day: i64) -> Self {
        Self { year: Some(year), month: Some(month), day: Some(day) }
    }

    /// Convert to an actual date. Incomplete or impossible dates (e.g. February 30th) give `None`
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let year = i32::try_from(self.year?).ok()?;
        let month = u32::try_from(self.month?).ok()?;
        let day = u32::try_from(self.day?).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// A coursework item (assignment, question, material...)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWork {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<DueDate>,
}

impl CourseWork {
    pub fn new<S: ToString>(title: S, due_date: Option<DueDate>) -> Self {
        Self { id: None, title: Some(title.to_string()), due_date }
    }

    /// The title, or a placeholder
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// The due date, if there is a valid one
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date.as_ref().and_then(|d| d.to_naive_date())
    }
}

/// One page of the "list coursework" endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWorkPage {
    #[serde(default)]
    pub course_work: Vec<CourseWork>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
