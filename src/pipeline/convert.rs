use crate::error::Result;
use crate::exec::run_tool;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

/// Step 2: convert the PBF to osmium's text export, filtered by the
/// attribute/tag configuration. Each output line is a WKT geometry followed
/// by the matching `attribute=tag` list.
pub async fn osm_to_txt(
    osm_file_path: &Path,
    txt_file_path: &Path,
    osmium_config: &Path,
) -> Result<PathBuf> {
    info!(
        "Converting {} to {}",
        osm_file_path.display(),
        txt_file_path.display()
    );

    let mut cmd = Command::new("osmium");
    cmd.arg("export")
        .args(["-f", "text"])
        .arg("-c")
        .arg(osmium_config)
        .arg("-O")
        .arg("-o")
        .arg(txt_file_path)
        .arg(osm_file_path);

    run_tool("osmium export", &mut cmd).await?;
    Ok(txt_file_path.to_path_buf())
}
