use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const CONFIG_DIR: &str = ".naacl-utils";
const CONFIG_FILE: &str = "config.json";

/// Overrides the location of the config file.
pub const CONFIG_PATH_ENV: &str = "NAACL_UTILS_CONFIG";
/// Overrides the stored user token.
pub const TOKEN_ENV: &str = "BEAKER_TOKEN";

pub const BEAKER_ORG: &str = "NAACL";
pub const BEAKER_CLUSTER: &str = "NAACL/server";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Beaker user token
    pub user_token: String,

    /// Base URL of the Beaker API
    #[serde(default = "default_agent_address")]
    pub agent_address: String,

    /// Organization that owns the submission workspaces
    #[serde(default = "default_org")]
    pub default_org: String,

    /// Workspace experiments are created in, `<org>/<user>` once set up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workspace: Option<String>,
}

fn default_agent_address() -> String {
    std::env::var("BEAKER_ADDR").unwrap_or_else(|_| "https://beaker.org".to_string())
}

fn default_org() -> String {
    BEAKER_ORG.to_string()
}

impl Config {
    pub fn new(user_token: impl Into<String>) -> Self {
        Self {
            user_token: user_token.into(),
            agent_address: default_agent_address(),
            default_org: default_org(),
            default_workspace: None,
        }
    }

    /// Get the config file path (`$NAACL_UTILS_CONFIG` or ~/.naacl-utils/config.json)
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("cannot find home directory".to_string()))?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from `path`. A missing file or a file without a token is a
    /// configuration error; anything else wrong with the file is reported as is.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        if config.user_token.trim().is_empty() {
            return Err(Error::Config(format!(
                "{} does not contain a user token",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Load the persisted config, letting `$BEAKER_TOKEN` supply or override
    /// the token.
    pub fn from_env() -> Result<Self> {
        let path = Self::config_path()?;
        let env_token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty());

        match (Self::load_from(&path), env_token) {
            (Ok(mut config), Some(token)) => {
                config.user_token = token;
                Ok(config)
            }
            (Ok(config), None) => Ok(config),
            (Err(Error::Config(_)), Some(token)) => Ok(Config::new(token)),
            (Err(e), _) => Err(e),
        }
    }

    /// Save config to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Workspace for `user`, honoring an explicit default
    pub fn workspace_for(&self, user: &str) -> String {
        self.default_workspace
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.default_org, user))
    }
}
