//! naacl-utils - submit and verify NAACL Reproducibility Track runs

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use naacl_utils::cli::{Cli, LogLevel};
use naacl_utils::error::BUG_REPORT_URL;
use naacl_utils::{ui, version};

/// Set to skip the check for a newer release.
const NO_UPDATE_CHECK_ENV: &str = "NAACL_UTILS_NO_UPDATE_CHECK";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.run().await {
        Ok(()) => {
            notify_update().await;
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Runs only after a successful command.
async fn notify_update() {
    if std::env::var_os(NO_UPDATE_CHECK_ENV).is_some() {
        return;
    }
    if let Some(latest) = version::check_for_update().await {
        ui::print_warning(&format!(
            "You're using naacl-utils version {}, but a newer version ({}) is available. \
             Upgrade with: cargo install naacl-utils",
            version::VERSION,
            latest
        ));
    }
}

fn init_tracing(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Domain errors get a one-line message; anything else is logged with its
/// full chain so it can go into a bug report.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<naacl_utils::Error>() {
        Some(e) if e.is_expected() => ui::print_error(&e.to_string()),
        _ => {
            tracing::error!("{:?}", err);
            ui::print_error(&format!("Unexpected error: {:#}", err));
            eprintln!("Please report this at {}", BUG_REPORT_URL);
        }
    }
}
