use std::process::ExitCode;

use chrono::Local;

use classroom_status::auth::{InstalledAppFlow, TokenFile};
use classroom_status::runner::{publish, run_once};
use classroom_status::Config;


#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let config = match Config::from_home_dir() {
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        },
        Ok(config) => config,
    };

    let store = TokenFile::new(&config.token_file);
    let flow = InstalledAppFlow::new(&config.client_secrets_file, config.scopes);

    let outcome = run_once(&config, &store, &flow, Local::now()).await;
    match publish(outcome, &config.output_file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
