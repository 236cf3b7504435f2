//! This module provides a client to connect to the Classroom API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::{COURSES_PAGE_SIZE, COURSEWORK_PAGE_SIZE};
use crate::course::{CoursePage, CourseWorkPage};
use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::traits::ClassroomSource;

/// The error body Google APIs send along with a non-success status
#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetails,
}

#[derive(Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn describe_api_error(text: &str) -> String {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(ErrorBody{ error: ErrorDetails{ message: Some(message), .. } }) => message,
        Ok(ErrorBody{ error: ErrorDetails{ message: None, status: Some(status) } }) => status,
        _ => text.trim().to_string(),
    }
}


/// A Classroom source that fetches its data from the server
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
    courses_page_size: u32,
    coursework_page_size: u32,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, T: ToString>(url: S, access_token: T) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;

        Ok(Self{
            resource: Resource::new(url, access_token.to_string()),
            http: reqwest::Client::new(),
            courses_page_size: COURSES_PAGE_SIZE,
            coursework_page_size: COURSEWORK_PAGE_SIZE,
        })
    }

    /// Override the default page sizes
    pub fn with_page_sizes(mut self, courses: u32, coursework: u32) -> Self {
        self.courses_page_size = courses;
        self.coursework_page_size = coursework;
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let resource = self.resource.combine(path)?;
        log::debug!("GET {}", resource.url());

        let response = self.http
            .get(resource.url().clone())
            .bearer_auth(resource.access_token())
            .query(query)
            .send()
            .await?;

        if response.status().is_success() == false {
            let status = response.status().as_u16();
            let url = response.url().to_string();
            let text = response.text().await?;
            return Err(Error::Api{ url, status, message: describe_api_error(&text) });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ClassroomSource for Client {
    async fn list_courses(&self, page_token: Option<&str>) -> Result<CoursePage> {
        let mut query = vec![
            ("courseStates", "ACTIVE".to_string()),
            ("pageSize", self.courses_page_size.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        self.get("v1/courses", &query).await
    }

    async fn list_coursework(&self, course_id: &str) -> Result<CourseWorkPage> {
        let query = [("pageSize", self.coursework_page_size.to_string())];
        let path = format!("v1/courses/{}/courseWork", urlencode_segment(course_id));
        self.get(&path, &query).await
    }
}

/// Course IDs are numeric or aliases such as `d:school_math`, make sure they stay a single path segment
fn urlencode_segment(segment: &str) -> String {
    let mut url = Url::parse("http://localhost/").expect("cannot parse a constant URL.");
    url.path_segments_mut()
        .expect("this URL can be a base.")
        .push(segment);
    url.path().trim_start_matches('/').to_string()
}
