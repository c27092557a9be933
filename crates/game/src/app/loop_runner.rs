use std::fmt::Display;
use std::process::ExitCode;

use homestead_engine::run_app_with_metrics;
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app_with_metrics(app.config, app.scene, app.metrics) {
        return startup_failed(&err);
    }

    ExitCode::SUCCESS
}

pub(crate) fn startup_failed(err: &dyn Display) -> ExitCode {
    error!(error = %err, "startup_failed");
    ExitCode::FAILURE
}
