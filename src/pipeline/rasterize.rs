use crate::constants::{BLOCK_SIZE, PIXEL_SIZE};
use crate::error::Result;
use crate::exec::run_tool;
use crate::raster::Bounds;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

/// Step 4: burn each CSV into a single-band Byte GeoTIFF. Jobs run
/// concurrently, capped at one per CPU minus one for the orchestrator.
pub async fn rasterize(csv_files: &[PathBuf], output_dir: &Path, bounds: Bounds) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(output_dir).await?;

    let output_files: Vec<PathBuf> = csv_files
        .iter()
        .map(|csv| {
            let stem = csv.file_stem().unwrap_or_default();
            output_dir.join(Path::new(stem).with_extension("tif"))
        })
        .collect();

    let jobs = worker_count();
    info!(
        "Rasterizing {} CSV files with {} workers",
        csv_files.len(),
        jobs
    );

    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut set: JoinSet<Result<()>> = JoinSet::new();
    for (csv, tif) in csv_files.iter().cloned().zip(output_files.iter().cloned()) {
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            rasterize_one(&csv, &tif, bounds).await
        });
    }

    while let Some(joined) = set.join_next().await {
        joined??;
    }

    Ok(output_files)
}

async fn rasterize_one(csv: &Path, tif: &Path, bounds: Bounds) -> Result<()> {
    let block = BLOCK_SIZE.to_string();
    let res = PIXEL_SIZE.to_string();

    let mut cmd = Command::new("gdal_rasterize");
    cmd.args(["-of", "GTiff"])
        .args(["-ot", "Byte"])
        .args(["-a_nodata", "0"])
        .args(["-init", "0"])
        .args(["-burn", "1"])
        .args(["-tr", &res, &res])
        .arg("-tap")
        .args(["-a_srs", "EPSG:4326"])
        .arg("-te")
        .args([
            bounds.min_x.to_string(),
            bounds.min_y.to_string(),
            bounds.max_x.to_string(),
            bounds.max_y.to_string(),
        ])
        .args(["-co", "TILED=YES"])
        .args(["-co", &format!("BLOCKXSIZE={}", block)])
        .args(["-co", &format!("BLOCKYSIZE={}", block)])
        .arg(csv)
        .arg(tif);

    run_tool("gdal_rasterize", &mut cmd).await?;
    Ok(())
}

/// CPUs minus one, at least one.
pub fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}
