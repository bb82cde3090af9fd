//! Beaker platform access.
//!
//! Everything the workflows need from the remote service goes through the
//! [`Platform`] trait so the submit and verify logic can run against an
//! in-memory implementation in tests.

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod types;

pub use client::BeakerClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::PlatformError;

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

#[async_trait]
pub trait Platform: Send + Sync {
    /// The user the token belongs to
    async fn whoami(&self) -> PlatformResult<User>;

    /// Look up a workspace by full name (`org/name`)
    async fn get_workspace(&self, workspace: &str) -> PlatformResult<Workspace>;

    /// Create a workspace named `name` inside `org`
    async fn create_workspace(&self, org: &str, name: &str) -> PlatformResult<Workspace>;

    /// Look up an image by full name (`user/name`) or id
    async fn get_image(&self, image: &str) -> PlatformResult<Image>;

    async fn delete_image(&self, image_id: &str) -> PlatformResult<()>;

    /// Register `image_tag` as an image resource called `name`
    async fn create_image(
        &self,
        workspace: &str,
        name: &str,
        image_tag: &str,
    ) -> PlatformResult<Image>;

    async fn create_experiment(
        &self,
        workspace: &str,
        name: &str,
        spec: &ExperimentSpec,
    ) -> PlatformResult<Experiment>;

    /// Look up an experiment by full name (`user/name`) or id
    async fn get_experiment(&self, experiment: &str) -> PlatformResult<Experiment>;

    /// Job logs, in the chunks they arrived in
    async fn job_logs(&self, job_id: &str) -> PlatformResult<Vec<Vec<u8>>>;

    /// Store `content` as `file_name` in a new dataset called `name`
    async fn upload_result(
        &self,
        workspace: &str,
        name: &str,
        file_name: &str,
        content: &[u8],
    ) -> PlatformResult<Dataset>;
}

/// Escape a full resource name (`owner/name`) for use as a single path segment.
pub(crate) fn path_segment(name: &str) -> String {
    name.replace('%', "%25").replace('/', "%2F")
}
