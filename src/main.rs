use anyhow::Result;
use std::process::ExitCode;
use tweets_cleaner::{init_tracing_once, resolve_config_path, CleanerOptions, RunOutcome, TweetsCleaner};

fn run() -> Result<RunOutcome> {
    let config_path = resolve_config_path(std::env::args().nth(1));
    let opts = CleanerOptions::load(&config_path)?;
    TweetsCleaner::from_options(opts).run()
}

fn main() -> ExitCode {
    init_tracing_once();
    match run() {
        Ok(RunOutcome::Analyzed(report)) if !report.is_complete() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
