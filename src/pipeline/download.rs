use crate::error::{Result, TaskError};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Step 1: stream the OSM PBF file to disk.
pub async fn download_osm(osm_url: &str, osm_file_path: &Path) -> Result<PathBuf> {
    info!("Downloading OSM data from {}", osm_url);

    let client = reqwest::Client::new();
    let mut response = client.get(osm_url).send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(TaskError::Download { status, body });
    }

    let mut file = File::create(osm_file_path).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!(
        "Downloaded {} bytes to {}",
        written,
        osm_file_path.display()
    );
    Ok(osm_file_path.to_path_buf())
}
