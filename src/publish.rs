//! Registering local Docker images as Beaker image resources.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info};

use crate::auth::Session;
use crate::beaker::Platform;
use crate::error::{PlatformError, Result};

const SUFFIX_LEN: usize = 4;

/// Turn a Docker tag into a Beaker image name: `:` and `/` become `-` and a
/// short random suffix keeps repeated submissions of one tag apart.
pub fn image_name(tag: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{}", tag.replace([':', '/'], "-"), suffix)
}

/// Publish `tag` and return the id of the new image resource. An image that
/// already holds the generated name is removed first.
pub async fn publish_image<P: Platform>(session: &Session<P>, tag: &str) -> Result<String> {
    let name = image_name(tag);
    let qualified = session.qualified(&name);

    match session.platform.get_image(&qualified).await {
        Ok(existing) => {
            debug!("Replacing stale image {} ({})", qualified, existing.id);
            session.platform.delete_image(&existing.id).await?;
        }
        Err(PlatformError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let image = session
        .platform
        .create_image(&session.workspace, &name, tag)
        .await?;
    info!("Created image {} ({}) from {}", qualified, image.id, tag);
    Ok(image.id)
}
