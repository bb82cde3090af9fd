//! In-memory platform used by unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::types::*;
use super::{Platform, PlatformResult};
use crate::error::PlatformError;

#[derive(Default)]
pub(crate) struct FakeState {
    pub workspaces: HashMap<String, Workspace>,
    /// Keyed by `user/name`
    pub images: HashMap<String, Image>,
    pub deleted_images: Vec<String>,
    /// Returned by the next image lookup regardless of name
    pub next_lookup: Option<Image>,
    /// Keyed by `user/name`
    pub experiments: HashMap<String, Experiment>,
    pub submitted: Vec<(String, String, ExperimentSpec)>,
    pub logs: HashMap<String, Vec<Vec<u8>>>,
    pub uploads: Vec<(String, String, String, Vec<u8>)>,
    pub forbidden_workspaces: Vec<String>,
    /// Every call, in order, by method name
    pub calls: Vec<&'static str>,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }
}

pub(crate) struct FakePlatform {
    pub user: String,
    pub state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Seed a finished experiment with the given exit code and log chunks
    pub fn add_run(&self, name: &str, exit_code: Option<i64>, logs: &[&str]) {
        let mut state = self.state.lock();
        let id = state.next_id("ex");
        let job_id = state.next_id("job");
        state.experiments.insert(
            format!("{}/{}", self.user, name),
            Experiment {
                id,
                name: Some(name.to_string()),
                jobs: vec![Job {
                    id: job_id.clone(),
                    status: JobStatus { exit_code },
                }],
            },
        );
        state.logs.insert(
            job_id,
            logs.iter().map(|chunk| chunk.as_bytes().to_vec()).collect(),
        );
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn whoami(&self) -> PlatformResult<User> {
        self.state.lock().calls.push("whoami");
        Ok(User {
            id: format!("us-{}", self.user),
            name: self.user.clone(),
        })
    }

    async fn get_workspace(&self, workspace: &str) -> PlatformResult<Workspace> {
        let mut state = self.state.lock();
        state.calls.push("get_workspace");
        if state.forbidden_workspaces.iter().any(|w| w == workspace) {
            return Err(PlatformError::Forbidden(workspace.to_string()));
        }
        state
            .workspaces
            .get(workspace)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(workspace.to_string()))
    }

    async fn create_workspace(&self, org: &str, name: &str) -> PlatformResult<Workspace> {
        let mut state = self.state.lock();
        state.calls.push("create_workspace");
        let full_name = format!("{}/{}", org, name);
        let workspace = Workspace {
            id: state.next_id("ws"),
            full_name: full_name.clone(),
        };
        state.workspaces.insert(full_name, workspace.clone());
        Ok(workspace)
    }

    async fn get_image(&self, image: &str) -> PlatformResult<Image> {
        let mut state = self.state.lock();
        state.calls.push("get_image");
        if let Some(stale) = state.next_lookup.take() {
            return Ok(stale);
        }
        state
            .images
            .get(image)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(image.to_string()))
    }

    async fn delete_image(&self, image_id: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.calls.push("delete_image");
        state.images.retain(|_, image| image.id != image_id);
        state.deleted_images.push(image_id.to_string());
        Ok(())
    }

    async fn create_image(
        &self,
        workspace: &str,
        name: &str,
        _image_tag: &str,
    ) -> PlatformResult<Image> {
        let mut state = self.state.lock();
        state.calls.push("create_image");
        if state.forbidden_workspaces.iter().any(|w| w == workspace) {
            return Err(PlatformError::Forbidden(workspace.to_string()));
        }
        let key = format!("{}/{}", self.user, name);
        if state.images.contains_key(&key) {
            return Err(PlatformError::Conflict(key));
        }
        let image = Image {
            id: state.next_id("im"),
            name: Some(name.to_string()),
        };
        state.images.insert(key, image.clone());
        Ok(image)
    }

    async fn create_experiment(
        &self,
        workspace: &str,
        name: &str,
        spec: &ExperimentSpec,
    ) -> PlatformResult<Experiment> {
        let mut state = self.state.lock();
        state.calls.push("create_experiment");
        let key = format!("{}/{}", self.user, name);
        if state.experiments.contains_key(&key) {
            return Err(PlatformError::Conflict(key));
        }
        let experiment = Experiment {
            id: state.next_id("ex"),
            name: Some(name.to_string()),
            jobs: Vec::new(),
        };
        state.experiments.insert(key, experiment.clone());
        state
            .submitted
            .push((workspace.to_string(), name.to_string(), spec.clone()));
        Ok(experiment)
    }

    async fn get_experiment(&self, experiment: &str) -> PlatformResult<Experiment> {
        let mut state = self.state.lock();
        state.calls.push("get_experiment");
        state
            .experiments
            .get(experiment)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(experiment.to_string()))
    }

    async fn job_logs(&self, job_id: &str) -> PlatformResult<Vec<Vec<u8>>> {
        let mut state = self.state.lock();
        state.calls.push("job_logs");
        Ok(state.logs.get(job_id).cloned().unwrap_or_default())
    }

    async fn upload_result(
        &self,
        workspace: &str,
        name: &str,
        file_name: &str,
        content: &[u8],
    ) -> PlatformResult<Dataset> {
        let mut state = self.state.lock();
        state.calls.push("upload_result");
        state.uploads.push((
            workspace.to_string(),
            name.to_string(),
            file_name.to_string(),
            content.to_vec(),
        ));
        Ok(Dataset {
            id: state.next_id("ds"),
        })
    }
}
