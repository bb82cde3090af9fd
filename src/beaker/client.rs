//! Beaker API Client
//!
//! Thin async wrapper over the Beaker v3 REST API. All requests carry the
//! user token as a bearer credential and go through `/api/v3/...`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::types::*;
use super::{path_segment, Platform, PlatformResult};
use crate::config::Config;
use crate::error::{Error, PlatformError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Beaker API client
pub struct BeakerClient {
    client: Client,
    base_url: String,
}

impl BeakerClient {
    /// Create a client for the endpoint and token in `config`
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Create client with custom timeout
    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.user_token.trim()))
            .map_err(|_| Error::Config("user token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("naacl-utils/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PlatformError::from)?;

        Ok(Self {
            client,
            base_url: config.agent_address.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/api/v3/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> PlatformResult<reqwest::Response> {
        debug!("Beaker request: {}", url);
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_else(|_| "Unknown error".into());
        debug!("Beaker responded {} for {}: {}", status, url, body);
        Err(match status {
            StatusCode::UNAUTHORIZED => PlatformError::Unauthorized(body),
            StatusCode::FORBIDDEN => PlatformError::Forbidden(body),
            StatusCode::NOT_FOUND => PlatformError::NotFound(body),
            StatusCode::CONFLICT => PlatformError::Conflict(body),
            _ => PlatformError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            },
        })
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> PlatformResult<T> {
        let resp = self.send(request, url).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| PlatformError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PlatformResult<T> {
        let url = self.api_url(path);
        self.json(self.client.get(&url), &url).await
    }
}

#[async_trait]
impl Platform for BeakerClient {
    async fn whoami(&self) -> PlatformResult<User> {
        self.get_json("user").await
    }

    async fn get_workspace(&self, workspace: &str) -> PlatformResult<Workspace> {
        self.get_json(&format!("workspaces/{}", path_segment(workspace)))
            .await
    }

    async fn create_workspace(&self, org: &str, name: &str) -> PlatformResult<Workspace> {
        let url = self.api_url("workspaces");
        let body = WorkspaceSpec { name, org };
        self.json(self.client.post(&url).json(&body), &url).await
    }

    async fn get_image(&self, image: &str) -> PlatformResult<Image> {
        self.get_json(&format!("images/{}", path_segment(image)))
            .await
    }

    async fn delete_image(&self, image_id: &str) -> PlatformResult<()> {
        let url = self.api_url(&format!("images/{}", path_segment(image_id)));
        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    async fn create_image(
        &self,
        workspace: &str,
        name: &str,
        image_tag: &str,
    ) -> PlatformResult<Image> {
        let url = self.api_url("images");
        let body = ImageSpec {
            workspace,
            name,
            image_tag,
        };
        let request = self
            .client
            .post(&url)
            .query(&[("name", name)])
            .json(&body);
        self.json(request, &url).await
    }

    async fn create_experiment(
        &self,
        workspace: &str,
        name: &str,
        spec: &ExperimentSpec,
    ) -> PlatformResult<Experiment> {
        let url = self.api_url(&format!(
            "workspaces/{}/experiments",
            path_segment(workspace)
        ));
        let request = self
            .client
            .post(&url)
            .query(&[("name", name)])
            .json(spec);
        self.json(request, &url).await
    }

    async fn get_experiment(&self, experiment: &str) -> PlatformResult<Experiment> {
        self.get_json(&format!("experiments/{}", path_segment(experiment)))
            .await
    }

    async fn job_logs(&self, job_id: &str) -> PlatformResult<Vec<Vec<u8>>> {
        let url = self.api_url(&format!("jobs/{}/logs", path_segment(job_id)));
        let mut resp = self.send(self.client.get(&url), &url).await?;

        let mut chunks = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            chunks.push(chunk.to_vec());
        }
        debug!("Fetched {} log chunks for job {}", chunks.len(), job_id);
        Ok(chunks)
    }

    async fn upload_result(
        &self,
        workspace: &str,
        name: &str,
        file_name: &str,
        content: &[u8],
    ) -> PlatformResult<Dataset> {
        let url = self.api_url("datasets");
        let request = self
            .client
            .post(&url)
            .query(&[("name", name)])
            .json(&DatasetSpec { workspace });
        let dataset: Dataset = self.json(request, &url).await?;

        let file_url = self.api_url(&format!(
            "datasets/{}/files/{}",
            path_segment(&dataset.id),
            file_name.trim_start_matches('/')
        ));
        self.send(self.client.put(&file_url).body(content.to_vec()), &file_url)
            .await?;

        let commit_url = self.api_url(&format!("datasets/{}", path_segment(&dataset.id)));
        self.send(
            self.client
                .patch(&commit_url)
                .json(&DatasetCommit { committed: true }),
            &commit_url,
        )
        .await?;

        Ok(dataset)
    }
}
