use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::interactive;
use crate::auth::{self, Session};
use crate::beaker::BeakerClient;
use crate::config::Config;
use crate::error::Error;
use crate::permissions::ensure_workspace;
use crate::publish::publish_image;
use crate::submit::{split_override, submit_experiment, validate_run_name};
use crate::ui;
use crate::verify::{self, Outcome};

#[derive(Parser)]
#[command(name = "naacl-utils")]
#[command(
    author,
    version,
    about = "A command-line interface to help authors submit to the NAACL Reproducibility Track",
    long_about = None
)]
pub struct Cli {
    /// Set the global log level
    #[arg(long, global = true, value_enum, ignore_case = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// One-time setup: store your Beaker user token
    Setup {
        /// Ask for a new token even if one is already configured
        #[arg(short, long)]
        force: bool,

        /// Beaker user token (prompted for when missing)
        #[arg(long, env = "BEAKER_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Submit a Docker image for your experiment to https://beaker.org
    ///
    /// E.g. `naacl-utils submit hello-world run-1`
    Submit {
        /// Docker image to run, e.g. `nvidia/cuda:11.0-base`
        image: String,

        /// Name of the run (letters, digits and dashes)
        run_name: String,

        /// Override the ENTRYPOINT of the Docker image
        #[arg(long, allow_hyphen_values = true)]
        entrypoint: Option<String>,

        /// Override the CMD of the Docker image
        #[arg(long, allow_hyphen_values = true)]
        cmd: Option<String>,
    },

    /// Check the output of a finished run against the expected output
    Verify {
        /// Name of the run given to `submit`
        run_name: String,

        /// File with the expected output (`-` or omitted reads standard input)
        expected_output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Setup { force, token } => run_setup(force, token).await,
            Commands::Submit {
                image,
                run_name,
                entrypoint,
                cmd,
            } => run_submit(&image, &run_name, entrypoint.as_deref(), cmd.as_deref()).await,
            Commands::Verify {
                run_name,
                expected_output,
            } => run_verify(&run_name, expected_output.as_deref()).await,
        }
    }
}

async fn connect() -> Result<Session> {
    let config = Config::from_env()?;
    let session = Session::connect(&config).await?;
    ensure_workspace(&session).await?;
    Ok(session)
}

async fn run_setup(force: bool, token: Option<String>) -> Result<()> {
    let path = Config::config_path()?;
    let session = auth::setup(
        &path,
        token,
        force,
        BeakerClient::new,
        interactive::prompt_for_token,
    )
    .await?;
    ensure_workspace(&session).await?;

    ui::print_success(&format!(
        "Setup complete, authenticated as {}",
        style(&session.user).bold()
    ));
    ui::print_key_value("Workspace", &session.workspace);
    ui::print_key_value("Config", &path.display().to_string());
    Ok(())
}

async fn run_submit(
    image: &str,
    run_name: &str,
    entrypoint: Option<&str>,
    cmd: Option<&str>,
) -> Result<()> {
    validate_run_name(run_name)?;
    split_override("--entrypoint", entrypoint)?;
    split_override("--cmd", cmd)?;

    let session = connect().await?;

    ui::print_info(&format!("Publishing image {}", style(image).cyan()));
    let image_id = publish_image(&session, image).await?;

    ui::print_info(&format!("Submitting run {}", style(run_name).cyan()));
    let experiment_id = submit_experiment(&session, &image_id, run_name, entrypoint, cmd).await?;

    let url = session.experiment_url(&experiment_id);
    println!(
        "{}Experiment {} submitted.",
        ui::ROCKET,
        style(&experiment_id).blue()
    );
    println!("See progress at {}", ui::hyperlink(&url, &url));
    Ok(())
}

async fn run_verify(run_name: &str, expected_output: Option<&Path>) -> Result<()> {
    validate_run_name(run_name)?;
    let expected = read_expected(expected_output)?;
    verify::expected_text(&expected)?;

    let session = connect().await?;
    let result = match verify::verify_run(&session, run_name, &expected).await {
        Err(Error::RunNotCompleted(name)) => {
            ui::print_info("Try again once the run has finished.");
            return Err(Error::RunNotCompleted(name).into());
        }
        other => other?,
    };

    match result.outcome {
        Outcome::Matched => {
            ui::print_success(&format!(
                "The output of {} matches the expected output",
                style(run_name).bold()
            ));
            ui::print_key_value("Experiment", &session.experiment_url(&result.experiment_id));
            Ok(())
        }
        Outcome::Diff(diff) => {
            ui::print_header("Differences");
            ui::print_diff(&diff);
            println!();
            Err(Error::OutputMismatch(run_name.to_string()).into())
        }
        Outcome::LogFile(path) => {
            ui::print_warning(&format!(
                "The output is too long to show a diff, the full log was written to {}",
                path.display()
            ));
            Err(Error::OutputMismatch(run_name.to_string()).into())
        }
    }
}

fn read_expected(path: Option<&Path>) -> crate::Result<String> {
    let (name, content) = match path {
        Some(path) if path != Path::new("-") => {
            (path.display().to_string(), std::fs::read_to_string(path))
        }
        _ => {
            let mut content = String::new();
            let read = std::io::stdin().read_to_string(&mut content);
            ("<stdin>".to_string(), read.map(|_| content))
        }
    };
    content.map_err(|source| Error::ReadExpected { path: name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_directive() {
        assert_eq!(LogLevel::Warning.directive(), "warn");
        assert_eq!(LogLevel::Debug.directive(), "debug");
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "naacl-utils",
            "submit",
            "nvidia/cuda:11.0-base",
            "run-1",
            "--cmd",
            "nvidia-smi -L",
        ])
        .unwrap();
        match cli.command {
            Commands::Submit {
                image,
                run_name,
                entrypoint,
                cmd,
            } => {
                assert_eq!(image, "nvidia/cuda:11.0-base");
                assert_eq!(run_name, "run-1");
                assert_eq!(entrypoint, None);
                assert_eq!(cmd.as_deref(), Some("nvidia-smi -L"));
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        let cli = Cli::try_parse_from(["naacl-utils", "--log-level", "WARNING", "verify", "run-1"])
            .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Warning));
    }

    #[test]
    fn test_parse_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["naacl-utils", "--log-level", "trace", "verify", "r"]).is_err());
    }

    #[test]
    fn test_read_expected_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expected.txt");
        std::fs::write(&path, "hello\n").unwrap();
        assert_eq!(read_expected(Some(&path)).unwrap(), "hello\n");
    }

    #[test]
    fn test_read_expected_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_expected(Some(&dir.path().join("missing.txt"))).unwrap_err();
        assert!(matches!(err, Error::ReadExpected { .. }));
        assert!(err.is_expected());
    }
}
