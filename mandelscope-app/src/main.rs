mod app_dir;
mod console;
mod preferences;

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use tracing::{error, info};

use mandelscope_engine::Session;

use console::Console;
use preferences::Preferences;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting mandelscope");

    let prefs = Preferences::load();
    let session = match Session::new(prefs.session_defaults()) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to start session: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut console = Console::new(
        session,
        prefs.sessions_directory(),
        prefs.export_directory(),
    )
    .with_timings(prefs.log_recompute_timings);

    let stdout = io::stdout();
    let outcome = match std::env::args_os().nth(1) {
        Some(script) => match File::open(&script) {
            Ok(file) => {
                info!("Running script {}", script.to_string_lossy());
                console.run(BufReader::new(file), stdout.lock())
            }
            Err(e) => {
                error!("Failed to open script {}: {e}", script.to_string_lossy());
                return ExitCode::FAILURE;
            }
        },
        None => console.run(io::stdin().lock(), stdout.lock()),
    };

    match outcome {
        Ok(()) => {
            info!(
                magnification = console.session().current_viewport().magnification(),
                "Exiting mandelscope"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Console I/O failed: {e}");
            ExitCode::FAILURE
        }
    }
}
