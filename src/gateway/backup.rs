use crate::error::Result;
use crate::gateway::ObjectStore;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Packs `files` into a gzipped tarball at `tar_path`. Entries keep only
/// their file names.
pub fn archive(files: &[PathBuf], tar_path: &Path) -> Result<()> {
    let encoder = GzEncoder::new(File::create(tar_path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for file in files {
        let name = file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| file.clone());
        builder.append_path_with_name(file, name)?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Tars up step outputs and ships them to the object store as
/// `<backup_name>.tar.gz`. The local tarball is removed after upload.
pub async fn archive_and_upload(
    store: Arc<dyn ObjectStore>,
    files: Vec<PathBuf>,
    backup_name: String,
    working_dir: PathBuf,
) -> Result<String> {
    let tar_name = format!("{}.tar.gz", backup_name);
    let tar_path = working_dir.join(&tar_name);

    let archive_path = tar_path.clone();
    tokio::task::spawn_blocking(move || archive(&files, &archive_path)).await??;

    let uri = store.upload(&tar_path, &tar_name).await?;
    tokio::fs::remove_file(&tar_path).await?;
    info!("Backed up step data to {}", uri);
    Ok(uri)
}
