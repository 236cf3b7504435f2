//! This module walks a [`ClassroomSource`] to gather every assignment of every active course
//!
//! A course whose coursework cannot be listed because of an API error is skipped, so that one misbehaving
//! course does not prevent the others from being reported. Any other error aborts the fetch.

use chrono::NaiveDate;

use crate::assignment::Assignment;
use crate::course::Course;
use crate::error::Result;
use crate::traits::ClassroomSource;

pub mod fetch_progress;
pub use fetch_progress::{FetchProgress, SkippedCourse};

/// The assignments that have been fetched, and the courses that had to be skipped
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchOutcome {
    /// In fetch order
    pub assignments: Vec<Assignment>,
    pub skipped: Vec<SkippedCourse>,
}

/// List every active course, following continuation tokens until the last page
pub async fn fetch_active_courses<S>(source: &S) -> Result<Vec<Course>>
where
    S: ClassroomSource + Sync + ?Sized,
{
    let mut courses = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = source.list_courses(page_token.as_deref()).await?;
        courses.extend(page.courses);

        page_token = match page.next_page_token {
            Some(token) if token.is_empty() == false => Some(token),
            _ => break,
        };
    }
    log::info!("Found {} active courses", courses.len());
    Ok(courses)
}

/// Fetch the coursework of every active course, and classify it relative to `today`
pub async fn fetch_assignments<S>(source: &S, today: NaiveDate) -> Result<FetchOutcome>
where
    S: ClassroomSource + Sync + ?Sized,
{
    let mut progress = FetchProgress::new();
    let courses = fetch_active_courses(source).await?;

    let mut assignments = Vec::new();
    for course in &courses {
        let page = match source.list_coursework(&course.id).await {
            Err(err) if err.is_api_error() => {
                progress.skip(&course.id, course.display_name(), err.to_string());
                continue;
            },
            Err(err) => return Err(err),
            Ok(page) => page,
        };

        // Only the first page is considered
        if page.next_page_token.is_some() {
            progress.debug(&format!("Course {} has more coursework than a single page, ignoring the next pages", course.display_name()));
        }

        progress.debug(&format!("Course {}: {} items", course.display_name(), page.course_work.len()));
        progress.course_done(page.course_work.len());
        assignments.extend(
            page.course_work.iter()
                .map(|item| Assignment::from_course_work(course, item, today))
        );
    }

    Ok(FetchOutcome {
        assignments,
        skipped: progress.finish(),
    })
}
