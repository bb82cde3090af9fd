use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const CRATES_IO_URL: &str = "https://crates.io/api/v1/crates/naacl-utils";
const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    max_stable_version: Option<String>,
}

/// `latest` if it is a newer release than `current`
pub fn newer_version(current: &str, latest: &str) -> Option<semver::Version> {
    let current = semver::Version::parse(current.trim_start_matches('v')).ok()?;
    let latest = semver::Version::parse(latest.trim_start_matches('v')).ok()?;
    (latest > current).then_some(latest)
}

/// Ask crates.io for the latest release. Best effort: any failure, including
/// a slow network, yields `None`.
pub async fn check_for_update() -> Option<semver::Version> {
    match fetch_latest().await {
        Ok(Some(latest)) => newer_version(VERSION, &latest),
        Ok(None) => None,
        Err(e) => {
            debug!("Version check failed: {}", e);
            None
        }
    }
}

async fn fetch_latest() -> Result<Option<String>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(CHECK_TIMEOUT)
        .user_agent(concat!("naacl-utils/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let resp: CrateResponse = client
        .get(CRATES_IO_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(resp.krate.max_stable_version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_version() {
        assert_eq!(
            newer_version("0.2.0", "0.3.0"),
            Some(semver::Version::new(0, 3, 0))
        );
        assert_eq!(
            newer_version("0.2.0", "v0.2.1"),
            Some(semver::Version::new(0, 2, 1))
        );
    }

    #[test]
    fn test_same_or_older_version() {
        assert_eq!(newer_version("0.2.0", "0.2.0"), None);
        assert_eq!(newer_version("0.2.0", "0.1.9"), None);
    }

    #[test]
    fn test_unparseable_version_is_ignored() {
        assert_eq!(newer_version("0.2.0", "latest"), None);
        assert_eq!(newer_version("dev", "0.3.0"), None);
    }

    #[test]
    fn test_crate_response_parsing() {
        let json = r#"{"crate": {"name": "naacl-utils", "max_stable_version": "1.0.0"}}"#;
        let resp: CrateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.krate.max_stable_version.as_deref(), Some("1.0.0"));
    }
}
