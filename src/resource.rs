use url::Url;

use crate::error::Result;

/// Just a wrapper around a URL and an access token
#[derive(Clone)]
pub struct Resource {
    url: Url,
    access_token: String,
}

impl Resource {
    pub fn new(url: Url, access_token: String) -> Self {
        Self { url, access_token }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn access_token(&self) -> &str { &self.access_token }

    /// Build a new Resource by keeping the same credentials, scheme and server from `base` but appending a relative path
    pub fn combine(&self, relative_path: &str) -> Result<Resource> {
        // `join` replaces the last segment of a base that does not end with a slash
        let mut base = self.url.clone();
        if base.path().ends_with('/') == false {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut built = (*self).clone();
        built.url = base.join(relative_path)?;
        Ok(built)
    }
}

impl std::fmt::Debug for Resource {
    /// The access token is not printed
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource").field("url", &self.url.as_str()).finish()
    }
}
