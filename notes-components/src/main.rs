use clap::Parser;
use tracing::error;

use notes_components::cli::{execute_command, Args};

#[tokio::main]
async fn main() {
    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = notes_logging::init_subscriber();

    let args = Args::parse();
    if let Err(e) = execute_command(args).await {
        error!(error = ?e, "Command failed");
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
