use tracing::info;

use crate::auth::Session;
use crate::beaker::Platform;
use crate::error::{Error, PlatformError, Result};

/// Make sure the session's workspace exists and is accessible, creating it
/// on first use. A 403 from Beaker means the account has not been added to
/// the organization yet.
pub async fn ensure_workspace<P: Platform>(session: &Session<P>) -> Result<()> {
    let forbidden = |e: PlatformError| match e {
        PlatformError::Forbidden(_) => Error::Permission {
            workspace: session.workspace.clone(),
        },
        other => other.into(),
    };

    match session.platform.get_workspace(&session.workspace).await {
        Ok(_) => Ok(()),
        Err(PlatformError::NotFound(_)) => {
            let (org, name) = session
                .workspace
                .split_once('/')
                .unwrap_or((session.org.as_str(), session.workspace.as_str()));
            session
                .platform
                .create_workspace(org, name)
                .await
                .map_err(forbidden)?;
            info!("Created workspace {}", session.workspace);
            Ok(())
        }
        Err(e) => Err(forbidden(e)),
    }
}
