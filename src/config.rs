//! Support for run configuration: file locations, remote endpoint and OAuth scopes

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use once_cell::sync::Lazy;
use url::Url;

use crate::error::{Error, Result};

/// The public Google Classroom endpoint
pub static CLASSROOM_API_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://classroom.googleapis.com/").expect("cannot parse the Classroom API URL.")
});

/// Folder (relative to the home directory) that holds every file this program reads or writes
pub const DATA_FOLDER: &str = "classroom";
/// OAuth client configuration, downloaded from the Google Cloud console
pub const CLIENT_SECRETS_FILE: &str = "credentials.json";
/// Persisted credential, created by this program
pub const TOKEN_FILE: &str = "token.json";
/// The status file consumed by the desktop widget
pub const OUTPUT_FILE: &str = "classroom.txt";

/// Page size used when listing courses
pub const COURSES_PAGE_SIZE: u32 = 100;
/// Page size used when listing the coursework of a course
pub const COURSEWORK_PAGE_SIZE: u32 = 200;

bitflags! {
    /// OAuth scopes this program may request
    pub struct Scopes: u8 {
        /// Read-only access to the course list
        const COURSES_READONLY = 1;
        /// Read/write access to the caller's own coursework
        const COURSEWORK_ME = 2;
        /// Read-only access to coursework materials
        const COURSEWORK_MATERIALS_READONLY = 4;
    }
}

impl Scopes {
    /// The scope URLs, in a stable order
    pub fn urls(&self) -> Vec<&'static str> {
        let mut urls = Vec::new();
        if self.contains(Self::COURSES_READONLY) {
            urls.push("https://www.googleapis.com/auth/classroom.courses.readonly");
        }
        if self.contains(Self::COURSEWORK_ME) {
            urls.push("https://www.googleapis.com/auth/classroom.coursework.me");
        }
        if self.contains(Self::COURSEWORK_MATERIALS_READONLY) {
            urls.push("https://www.googleapis.com/auth/classroom.courseworkmaterials.readonly");
        }
        urls
    }

    /// The space-separated form used in OAuth requests
    pub fn to_scope_string(&self) -> String {
        self.urls().join(" ")
    }
}

/// Where a run reads its inputs from and writes its outputs to
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub client_secrets_file: PathBuf,
    pub token_file: PathBuf,
    pub output_file: PathBuf,
    pub api_url: Url,
    pub scopes: Scopes,
    pub courses_page_size: u32,
    pub coursework_page_size: u32,
}

impl Config {
    /// Build the default configuration, with every file inside `<folder>`
    pub fn in_folder(folder: &Path) -> Self {
        Self {
            client_secrets_file: folder.join(CLIENT_SECRETS_FILE),
            token_file: folder.join(TOKEN_FILE),
            output_file: folder.join(OUTPUT_FILE),
            api_url: CLASSROOM_API_URL.clone(),
            scopes: Scopes::all(),
            courses_page_size: COURSES_PAGE_SIZE,
            coursework_page_size: COURSEWORK_PAGE_SIZE,
        }
    }

    /// Build the default configuration, with every file inside `~/classroom`
    pub fn from_home_dir() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDirectory)?;
        Ok(Self::in_folder(&home.join(DATA_FOLDER)))
    }
}
