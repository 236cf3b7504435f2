use async_trait::async_trait;

use crate::auth::Credential;
use crate::course::{CoursePage, CourseWorkPage};
use crate::error::Result;

/// A source of Classroom data, usually a [`Client`](crate::client::Client) that talks to the server
#[async_trait]
pub trait ClassroomSource {
    /// Returns one page of the active courses.
    /// `page_token` is the continuation token returned by the previous page, or `None` for the first page
    async fn list_courses(&self, page_token: Option<&str>) -> Result<CoursePage>;

    /// Returns the first page of the coursework of a course
    async fn list_coursework(&self, course_id: &str) -> Result<CourseWorkPage>;
}

/// Somewhere a credential is persisted between runs
pub trait CredentialStore {
    /// Returns the stored credential, or `None` in case there is none yet
    fn load(&self) -> Result<Option<Credential>>;
    /// Overwrite the stored credential
    fn save(&self, credential: &Credential) -> Result<()>;
}

/// A way to get credentials from an identity provider
#[async_trait]
pub trait AuthorizationFlow {
    /// Obtain a brand new credential. This usually requires the user to interact with a browser
    async fn authorize(&self) -> Result<Credential>;
    /// Use the refresh token of an expired credential to get a new access token
    async fn refresh(&self, credential: &Credential) -> Result<Credential>;
}
