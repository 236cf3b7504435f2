//! One run of the whole pipeline: authenticate, fetch, classify, write

use std::path::Path;

use chrono::{DateTime, Local, Utc};

use crate::auth::ensure_credential;
use crate::client::Client;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::fetch_assignments;
use crate::report::{write_failure, Report};
use crate::traits::{AuthorizationFlow, ClassroomSource, CredentialStore};

/// Fetch the assignments of `source` and build the report, as of `now`
pub async fn build_report<S>(source: &S, now: DateTime<Local>) -> Result<Report>
where
    S: ClassroomSource + Sync + ?Sized,
{
    let outcome = fetch_assignments(source, now.date_naive()).await?;
    if outcome.skipped.is_empty() == false {
        log::info!("{} courses have been left out of the report", outcome.skipped.len());
    }
    Ok(Report::new(now.naive_local(), outcome.assignments))
}

/// Get a credential, then build the report from the Classroom server
pub async fn run_once<C, A>(config: &Config, store: &C, flow: &A, now: DateTime<Local>) -> Result<Report>
where
    C: CredentialStore + ?Sized,
    A: AuthorizationFlow + Sync + ?Sized,
{
    let credential = ensure_credential(store, flow, now.with_timezone(&Utc)).await?;
    let client = Client::new(config.api_url.as_str(), credential.access_token())?
        .with_page_sizes(config.courses_page_size, config.coursework_page_size);
    build_report(&client, now).await
}

/// Write the outcome of a run to `output`.
///
/// In case the run failed, the error is written instead of the report, and is returned
pub fn publish(outcome: Result<Report>, output: &Path) -> Result<()> {
    let err = match outcome {
        Ok(report) => match report.write_to(output) {
            Ok(()) => return Ok(()),
            Err(err) => Error::from(err),
        },
        Err(err) => err,
    };

    log::error!("Unable to fetch Classroom data: {}", err);
    if let Err(write_err) = write_failure(output, &err) {
        log::error!("Unable to write the error report to {:?}: {}", output, write_err);
    }
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::auth::tests::FakeFlow;
    use crate::auth::MemoryTokenStore;
    use crate::course::{Course, CourseWork, DueDate};
    use crate::mock_classroom::MockClassroom;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 5, 18, 45, 0).unwrap()
    }

    fn run_and_publish(outcome: Result<Report>) -> (Result<()>, String) {
        let folder = tempfile::tempdir().unwrap();
        let path = folder.path().join("classroom.txt");
        let result = publish(outcome, &path);
        let text = std::fs::read_to_string(&path).unwrap();
        (result, text)
    }

    #[tokio::test]
    async fn scenario_mixed_due_dates() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut classroom = MockClassroom::new();
        classroom.add_course(Course::new("1", "Maths"), vec![
            CourseWork::new("No deadline", None),
            CourseWork::new("Late homework", Some(DueDate::new(2025, 1, 4))),
            CourseWork::new("Project", Some(DueDate::new(2025, 1, 7))),
        ]);
        classroom.add_course(Course::new("2", "Biology"), vec![
            CourseWork::new("Lab report", Some(DueDate::new(2025, 1, 5))),
        ]);

        let report = build_report(&classroom, now()).await.unwrap();
        assert_eq!(report.generated_at(), &now().naive_local());
        let titles: Vec<&str> = report.assignments().iter().map(|a| a.title()).collect();
        assert_eq!(titles, vec!["Lab report", "Project", "No deadline"]);

        let (result, text) = run_and_publish(Ok(report));
        assert!(result.is_ok());
        assert_eq!(text,
                   "📚 Google Classroom    (Last update: 2025-01-05 18:45)\n\n\
                    - Biology: Lab report — Due TODAY\n\
                    - Maths: Project — Due in 2 days (Jan 07, 2025)\n\
                    - Maths: No deadline — No due date\n");
    }

    #[tokio::test]
    async fn scenario_no_courses() {
        let classroom = MockClassroom::new();

        let (result, text) = run_and_publish(build_report(&classroom, now()).await);
        assert!(result.is_ok());
        assert_eq!(text, "📚 Google Classroom    (Last update: 2025-01-05 18:45)\n\n✅ No upcoming assignments.\n");
    }

    #[tokio::test]
    async fn scenario_one_course_fails() {
        let mut classroom = MockClassroom::new();
        classroom.add_course(Course::new("1", "Maths"), vec![CourseWork::new("Exercises", Some(DueDate::new(2025, 1, 6)))]);
        classroom.add_course(Course::new("2", "History"), vec![CourseWork::new("Essay", Some(DueDate::new(2025, 1, 20)))]);
        classroom.forbid_course("1");

        let (result, text) = run_and_publish(build_report(&classroom, now()).await);
        assert!(result.is_ok());
        assert_eq!(text,
                   "📚 Google Classroom    (Last update: 2025-01-05 18:45)\n\n\
                    - History: Essay — Due Jan 20, 2025\n");
    }

    #[tokio::test]
    async fn scenario_authentication_fails() {
        let config = Config::in_folder(Path::new("/nonexistent"));
        let store = MemoryTokenStore::new();
        let flow = FakeFlow::failing();

        let (result, text) = run_and_publish(run_once(&config, &store, &flow, now()).await);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(text, format!("⚠️ Error fetching Classroom data\n{}\n", err));
        assert_eq!(text, "⚠️ Error fetching Classroom data\nauthorization failed: the user denied access\n");
    }

    #[tokio::test]
    async fn unwritable_output_is_reported() {
        let folder = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten by a file
        let result = publish(Ok(Report::new(now().naive_local(), Vec::new())), folder.path());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
