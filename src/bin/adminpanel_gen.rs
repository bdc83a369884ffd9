use std::process::ExitCode;

use adminpanel::logging::{init_logging, LogConfig};

fn main() -> ExitCode {
    let _guard = match init_logging(&LogConfig::from_env()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: {e:#}");
            None
        }
    };

    match adminpanel::cli::run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "generation aborted");
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}
