use std::process::ExitCode;

use tilejump_engine::run_app_with_metrics;
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app_with_metrics(app.config, app.scene, app.metrics) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
