use std::process::ExitCode;

mod bootstrap;
mod config;
mod gameplay;
mod loop_runner;

pub(crate) fn run() -> ExitCode {
    bootstrap::init_tracing();
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => loop_runner::startup_failed(&err),
    }
}
