//! JSON persistence for scraped catalogs
//!
//! Writes overwrite in place; there is no temp-file rename, so a crash
//! mid-write can leave a truncated file.

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{ScraperError, ScraperResult};

/// Serialize `data` as pretty JSON to `path`, creating missing parent
/// directories first.
pub async fn save_json<T>(path: impl AsRef<Path>, data: &T) -> ScraperResult<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| ScraperError::Storage { path: parent.to_path_buf(), source })?;
    }

    let content = serde_json::to_string_pretty(data)?;
    fs::write(path, content)
        .await
        .map_err(|source| ScraperError::Storage { path: path.to_path_buf(), source })?;

    info!("💾 Saved JSON to {}", path.display());
    Ok(())
}

/// Read back a JSON file written by `save_json`
pub async fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> ScraperResult<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ScraperError::Storage { path: path.to_path_buf(), source })?;
    debug!("Loaded {} bytes from {}", content.len(), path.display());
    Ok(serde_json::from_str(&content)?)
}
