//! An in-memory Classroom source, used to test the whole pipeline without any server
#![cfg(any(test, feature = "mock_classroom"))]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::course::{Course, CoursePage, CourseWork, CourseWorkPage};
use crate::error::{Error, Result};
use crate::mock_behaviour::MockBehaviour;
use crate::traits::ClassroomSource;

/// A Classroom source that serves pre-populated courses.
///
/// Courses are served `page_size` at a time, with numbered continuation tokens
pub struct MockClassroom {
    courses: Vec<Course>,
    coursework: HashMap<String, Vec<CourseWork>>,
    page_size: usize,

    /// Courses whose coursework cannot be listed because of an API error (e.g. permission denied)
    forbidden_courses: HashSet<String>,
    /// Courses whose coursework cannot be listed because the server cannot be reached
    unreachable_courses: HashSet<String>,
    behaviour: Mutex<MockBehaviour>,
    requested_pages: Mutex<Vec<Option<String>>>,
}

impl MockClassroom {
    pub fn new() -> Self {
        Self {
            courses: Vec::new(),
            coursework: HashMap::new(),
            page_size: 100,
            forbidden_courses: HashSet::new(),
            unreachable_courses: HashSet::new(),
            behaviour: Mutex::new(MockBehaviour::new()),
            requested_pages: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_behaviour(self, behaviour: MockBehaviour) -> Self {
        *self.behaviour.lock().unwrap() = behaviour;
        self
    }

    pub fn add_course(&mut self, course: Course, coursework: Vec<CourseWork>) {
        self.coursework.insert(course.id.clone(), coursework);
        self.courses.push(course);
    }

    pub fn forbid_course(&mut self, course_id: &str) {
        self.forbidden_courses.insert(course_id.to_string());
    }

    pub fn make_unreachable(&mut self, course_id: &str) {
        self.unreachable_courses.insert(course_id.to_string());
    }

    /// The continuation tokens `list_courses` has been called with, in order
    pub fn requested_pages(&self) -> Vec<Option<String>> {
        self.requested_pages.lock().unwrap().clone()
    }
}

impl Default for MockClassroom {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassroomSource for MockClassroom {
    async fn list_courses(&self, page_token: Option<&str>) -> Result<CoursePage> {
        self.requested_pages.lock().unwrap().push(page_token.map(String::from));
        self.behaviour.lock().unwrap().can_list_courses()?;

        let start = match page_token {
            None => 0,
            Some(token) => token.parse::<usize>()
                .map_err(|_| Error::Api{ url: "mock://courses".to_string(), status: 400, message: format!("Invalid page token {}", token) })?,
        };
        let end = (start + self.page_size).min(self.courses.len());
        let next_page_token = if end < self.courses.len() { Some(end.to_string()) } else { None };

        Ok(CoursePage {
            courses: self.courses.get(start..end).map(|c| c.to_vec()).unwrap_or_default(),
            next_page_token,
        })
    }

    async fn list_coursework(&self, course_id: &str) -> Result<CourseWorkPage> {
        self.behaviour.lock().unwrap().can_list_coursework()?;

        if self.unreachable_courses.contains(course_id) {
            return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused")));
        }
        if self.forbidden_courses.contains(course_id) {
            return Err(Error::Api{
                url: format!("mock://courses/{}/courseWork", course_id),
                status: 403,
                message: "The caller does not have permission".to_string(),
            });
        }

        match self.coursework.get(course_id) {
            None => Err(Error::Api{
                url: format!("mock://courses/{}/courseWork", course_id),
                status: 404,
                message: "Requested entity was not found.".to_string(),
            }),
            Some(items) => Ok(CourseWorkPage { course_work: items.clone(), next_page_token: None }),
        }
    }
}
