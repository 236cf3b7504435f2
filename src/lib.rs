//! This crate fetches the assignments of a Google Classroom user, and renders them into a small status file
//! that a desktop widget (e.g. Conky) can display.
//!
//! A run goes through four stages:
//! * the [`auth`] module provides an access credential, that is persisted between runs,
//! * the [`client`] module talks to the Classroom API, and the [`fetcher`] module walks every active course,
//! * every [`Assignment`] gets a [`Status`](assignment::Status) depending on how soon it is due,
//! * the [`report`] module sorts, filters and renders them.
//!
//! The [`runner`] module chains them, and writes an error report in case anything fails.

pub mod traits;
pub mod error;
pub use error::{Error, Result};
pub mod config;
pub use config::Config;

pub mod course;
pub mod assignment;
pub use assignment::Assignment;

pub mod auth;
mod resource;
pub mod client;
pub mod fetcher;
pub mod report;
pub use report::Report;
pub mod runner;

pub mod utils;

pub mod mock_behaviour;
pub mod mock_classroom;
