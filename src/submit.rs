//! Experiment submission.

use tracing::info;

use crate::auth::Session;
use crate::beaker::{
    Context, ExperimentSpec, ImageSource, Platform, Resources, ResultSpec, TaskSpec,
};
use crate::config::BEAKER_CLUSTER;
use crate::error::{Error, PlatformError, Result};

pub const MAX_RUN_NAME_LEN: usize = 100;

const SPEC_VERSION: &str = "v2-alpha";
const TASK_NAME: &str = "main";
const RESULT_PATH: &str = "/unused";
const GPU_COUNT: u32 = 1;
const SHARED_MEMORY: &str = "1GiB";

/// Run names may only contain ASCII letters, digits and dashes.
pub fn validate_run_name(run_name: &str) -> Result<()> {
    let valid = !run_name.is_empty()
        && run_name.len() <= MAX_RUN_NAME_LEN
        && run_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidRunName(run_name.to_string()))
    }
}

/// Split an `--entrypoint` / `--cmd` override the way a POSIX shell would.
pub fn split_override(flag: &'static str, value: Option<&str>) -> Result<Option<Vec<String>>> {
    value
        .map(|v| {
            shlex::split(v).ok_or_else(|| Error::InvalidCommand {
                flag,
                value: v.to_string(),
            })
        })
        .transpose()
}

/// The single-task spec every submission uses.
pub fn experiment_spec(
    image_id: &str,
    command: Option<Vec<String>>,
    arguments: Option<Vec<String>>,
) -> ExperimentSpec {
    ExperimentSpec {
        version: SPEC_VERSION.to_string(),
        tasks: vec![TaskSpec {
            name: TASK_NAME.to_string(),
            image: ImageSource {
                beaker: image_id.to_string(),
            },
            context: Context {
                cluster: BEAKER_CLUSTER.to_string(),
            },
            result: ResultSpec {
                path: RESULT_PATH.to_string(),
            },
            command,
            arguments,
            resources: Resources {
                gpu_count: GPU_COUNT,
                shared_memory: SHARED_MEMORY.to_string(),
            },
        }],
    }
}

/// Create the experiment and return its id. A taken name is reported, never
/// retried under another name.
pub async fn submit_experiment<P: Platform>(
    session: &Session<P>,
    image_id: &str,
    run_name: &str,
    entrypoint: Option<&str>,
    cmd: Option<&str>,
) -> Result<String> {
    validate_run_name(run_name)?;
    let command = split_override("--entrypoint", entrypoint)?;
    let arguments = split_override("--cmd", cmd)?;
    let spec = experiment_spec(image_id, command, arguments);

    let experiment = session
        .platform
        .create_experiment(&session.workspace, run_name, &spec)
        .await
        .map_err(|e| match e {
            PlatformError::Conflict(_) => Error::RunExists(run_name.to_string()),
            other => other.into(),
        })?;

    info!("Submitted experiment {} as {}", experiment.id, run_name);
    Ok(experiment.id)
}
