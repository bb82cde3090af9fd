//! Wire types for the Beaker v3 API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workspace {
    pub id: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dataset {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Experiment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "exitCode", default)]
    pub exit_code: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkspaceSpec<'a> {
    pub name: &'a str,
    pub org: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageSpec<'a> {
    pub workspace: &'a str,
    pub name: &'a str,
    pub image_tag: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DatasetSpec<'a> {
    pub workspace: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DatasetCommit {
    pub committed: bool,
}

/// Experiment specification submitted to `POST .../experiments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentSpec {
    pub version: String,
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub name: String,
    pub image: ImageSource,
    pub context: Context,
    /// Required by Beaker even when the task writes no output.
    pub result: ResultSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    pub resources: Resources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSource {
    pub beaker: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    pub cluster: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSpec {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub gpu_count: u32,
    pub shared_memory: String,
}

impl Experiment {
    /// Exit code of the first job, if it has finished
    pub fn exit_code(&self) -> Option<i64> {
        self.jobs.first().and_then(|job| job.status.exit_code)
    }
}
