//! Checking a finished run's logs against the expected output.
//!
//! The run is looked up by name, must have exited with code 0, and its log
//! must contain the expected text once Beaker's per-line timestamps are
//! stripped. A match is recorded on Beaker as a result dataset named after
//! the run; a mismatch is explained with a unified diff, or with the path of
//! a file holding the full log when either side is too long to print.

use similar::TextDiff;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::beaker::Platform;
use crate::error::{Error, PlatformError, Result};
use crate::submit::validate_run_name;

/// Logs or expectations with this many lines are written to a file instead of diffed
pub const DIFF_LINE_LIMIT: usize = 500;

/// File name of the uploaded expected output
pub const RESULT_FILE: &str = "expected_output.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    /// Unified diff from the actual log to the expected output
    Diff(String),
    /// Too long to diff; the normalized log was saved here
    LogFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub experiment_id: String,
    pub outcome: Outcome,
}

/// Strip the timestamp Beaker puts in front of every log line, along with
/// the single separator after it. Indentation in the output survives.
pub fn normalize_line(line: &str) -> &str {
    match line.split_once(char::is_whitespace) {
        Some((_, rest)) => rest,
        None => "",
    }
}

pub fn normalize_logs(raw: &str) -> String {
    raw.lines().map(normalize_line).collect::<Vec<_>>().join("\n")
}

/// The expected output without leading and trailing blank lines. Blank-only
/// input is rejected.
pub fn expected_text(content: &str) -> Result<String> {
    let lines: Vec<&str> = content.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => Ok(lines[first..=last].join("\n")),
        _ => Err(Error::EmptyExpectedOutput),
    }
}

pub async fn verify_run<P: Platform>(
    session: &Session<P>,
    run_name: &str,
    expected: &str,
) -> Result<Verification> {
    validate_run_name(run_name)?;
    let expected = expected_text(expected)?;

    let experiment = session
        .platform
        .get_experiment(&session.qualified(run_name))
        .await
        .map_err(|e| match e {
            PlatformError::NotFound(_) => Error::RunNotFound(run_name.to_string()),
            other => other.into(),
        })?;

    let job = match experiment.jobs.first() {
        Some(job) if job.status.exit_code == Some(0) => job,
        _ => {
            debug!("Run {} exit code: {:?}", run_name, experiment.exit_code());
            return Err(Error::RunNotCompleted(run_name.to_string()));
        }
    };

    let chunks = session.platform.job_logs(&job.id).await?;
    let raw: Vec<u8> = chunks.concat();
    let logs = normalize_logs(&String::from_utf8_lossy(&raw));
    debug!("Run {} produced {} log lines", run_name, logs.lines().count());

    let outcome = if logs.contains(&expected) {
        record_result(session, run_name, &expected).await?;
        Outcome::Matched
    } else {
        explain_mismatch(run_name, &logs, &expected)?
    };

    Ok(Verification {
        experiment_id: experiment.id,
        outcome,
    })
}

async fn record_result<P: Platform>(
    session: &Session<P>,
    run_name: &str,
    expected: &str,
) -> Result<()> {
    match session
        .platform
        .upload_result(
            &session.workspace,
            run_name,
            RESULT_FILE,
            expected.as_bytes(),
        )
        .await
    {
        Ok(dataset) => {
            info!("Uploaded result for {} as dataset {}", run_name, dataset.id);
            Ok(())
        }
        Err(PlatformError::Conflict(_)) => {
            warn!("A result for {} was already uploaded", run_name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn explain_mismatch(run_name: &str, logs: &str, expected: &str) -> Result<Outcome> {
    if logs.lines().count() < DIFF_LINE_LIMIT && expected.lines().count() < DIFF_LINE_LIMIT {
        let actual = format!("{}\n", logs);
        let expected = format!("{}\n", expected);
        let diff = TextDiff::from_lines(actual.as_str(), expected.as_str())
            .unified_diff()
            .header("Actual", "Expected")
            .to_string();
        return Ok(Outcome::Diff(diff));
    }

    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}-", run_name))
        .suffix(".log")
        .tempfile()?;
    file.write_all(logs.as_bytes())?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(Outcome::LogFile(path))
}
