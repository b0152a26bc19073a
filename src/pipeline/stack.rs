use crate::constants::BLOCK_SIZE;
use crate::error::{Result, TaskError};
use crate::exec::run_tool;
use crate::pipeline::rasterize::worker_count;
use crate::raster::{Bounds, Grid, Strip};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::info;

/// Working-file name of the band-stacking VRT.
pub const VRT_NAME: &str = "stacked.vrt";

/// Step 5: stack every band image into multiband GeoTIFFs, split into
/// vertical strips so the strips can be written in parallel. Band order in
/// the output equals `image_paths` order.
pub async fn stack_images(
    image_paths: &[PathBuf],
    output_dir: &Path,
    bounds: Bounds,
) -> Result<Vec<PathBuf>> {
    if image_paths.is_empty() {
        return Err(TaskError::Config(
            "No rasterized images to stack".to_string(),
        ));
    }

    let vrt_path = output_dir.join(VRT_NAME);
    build_vrt(image_paths, &vrt_path).await?;

    let splits = split_count();
    let strips = Grid::from_bounds(&bounds).strips(splits);
    info!(
        "Stacking {} bands into {} strip image(s)",
        image_paths.len(),
        strips.len()
    );

    let output_paths: Vec<PathBuf> = (1..=strips.len())
        .map(|n| output_dir.join(format!("stacked-{}.tif", n)))
        .collect();

    let mut set: JoinSet<Result<()>> = JoinSet::new();
    for (strip, output) in strips.iter().zip(output_paths.iter()) {
        let vrt = vrt_path.clone();
        let strip = *strip;
        let output = output.clone();
        set.spawn(async move { translate_strip(&vrt, &output, strip).await });
    }
    while let Some(joined) = set.join_next().await {
        joined??;
    }

    Ok(output_paths)
}

async fn build_vrt(image_paths: &[PathBuf], vrt_path: &Path) -> Result<()> {
    let mut cmd = Command::new("gdalbuildvrt");
    cmd.arg("-separate").arg(vrt_path).args(image_paths);
    run_tool("gdalbuildvrt", &mut cmd).await?;
    Ok(())
}

async fn translate_strip(vrt: &Path, output: &Path, strip: Strip) -> Result<()> {
    let block = BLOCK_SIZE.to_string();

    let mut cmd = Command::new("gdal_translate");
    cmd.args(["-of", "GTiff"])
        .args(["-ot", "Byte"])
        .args(["-a_nodata", "0"])
        .arg("-srcwin")
        .args([
            strip.x_off.to_string(),
            "0".to_string(),
            strip.width.to_string(),
            strip.height.to_string(),
        ])
        .args(["-co", "TILED=YES"])
        .args(["-co", &format!("BLOCKXSIZE={}", block)])
        .args(["-co", &format!("BLOCKYSIZE={}", block)])
        .args(["-co", "COMPRESS=DEFLATE"])
        .args(["-co", "PREDICTOR=2"])
        .args(["-co", "ZLEVEL=9"])
        .args(["-co", "NUM_THREADS=1"])
        .arg(vrt)
        .arg(output);

    run_tool("gdal_translate", &mut cmd).await?;
    Ok(())
}

/// Half the rasterize workers, at least one; strip writes are heavier on
/// memory than rasterize jobs.
pub fn split_count() -> usize {
    (worker_count() + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_count_is_positive() {
        assert!(split_count() >= 1);
    }
}
