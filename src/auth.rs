//! Credentials and the per-invocation session.

use std::path::Path;
use tracing::{debug, info};

use crate::beaker::{BeakerClient, Platform};
use crate::config::Config;
use crate::error::{Error, Result};

/// An authenticated platform handle scoped to one workspace.
pub struct Session<P = BeakerClient> {
    pub platform: P,
    pub user: String,
    pub org: String,
    pub workspace: String,
    pub agent_address: String,
}

impl Session<BeakerClient> {
    /// Authenticate against the Beaker endpoint in `config`
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = BeakerClient::new(config)?;
        Session::with_platform(client, config).await
    }
}

impl<P: Platform> Session<P> {
    pub async fn with_platform(platform: P, config: &Config) -> Result<Self> {
        let user = platform.whoami().await?;
        let workspace = config.workspace_for(&user.name);
        debug!("Authenticated as {} (workspace {})", user.name, workspace);

        Ok(Self {
            platform,
            user: user.name,
            org: config.default_org.clone(),
            workspace,
            agent_address: config.agent_address.trim_end_matches('/').to_string(),
        })
    }

    /// Full name of a resource owned by the session user
    pub fn qualified(&self, name: &str) -> String {
        format!("{}/{}", self.user, name)
    }

    /// Where to follow an experiment in the browser
    pub fn experiment_url(&self, experiment_id: &str) -> String {
        format!("{}/ex/{}", self.agent_address, experiment_id)
    }
}

/// Where the setup credentials came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Already persisted, nothing to write
    Existing(Config),
    /// Supplied now, must be saved once the workspace is known
    Fresh(Config),
}

impl Credentials {
    pub fn config(&self) -> &Config {
        match self {
            Credentials::Existing(config) | Credentials::Fresh(config) => config,
        }
    }
}

/// Decide which credentials `setup` uses. An explicit token always wins;
/// otherwise an existing config is reused unless `force` is set, and only
/// then is the user prompted.
pub fn resolve_credentials<F>(
    path: &Path,
    token: Option<String>,
    force: bool,
    prompt: F,
) -> Result<Credentials>
where
    F: FnOnce() -> Result<String>,
{
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        return Ok(Credentials::Fresh(Config::new(token.trim())));
    }

    if !force {
        match Config::load_from(path) {
            Ok(config) => return Ok(Credentials::Existing(config)),
            Err(Error::Config(reason)) => debug!("No usable config: {}", reason),
            Err(e) => return Err(e),
        }
    }

    let token = prompt()?;
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::Config("no user token was entered".to_string()));
    }
    Ok(Credentials::Fresh(Config::new(token)))
}

/// Run setup end to end: resolve credentials, authenticate, and persist a
/// fresh config together with the resolved workspace.
pub async fn setup<P, C, F>(
    path: &Path,
    token: Option<String>,
    force: bool,
    connect: C,
    prompt: F,
) -> Result<Session<P>>
where
    P: Platform,
    C: FnOnce(&Config) -> Result<P>,
    F: FnOnce() -> Result<String>,
{
    let credentials = resolve_credentials(path, token, force, prompt)?;
    let platform = connect(credentials.config())?;
    let session = Session::with_platform(platform, credentials.config()).await?;

    if let Credentials::Fresh(mut config) = credentials {
        config.default_workspace = Some(session.workspace.clone());
        config.save_to(path)?;
        info!("Saved Beaker config to {}", path.display());
    }

    Ok(session)
}
