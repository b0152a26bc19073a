use crate::config::OsmiumConfig;
use crate::constants::{DEFAULT_OSM_URL, OSM_DATA_SOURCE_VAR};
use crate::error::{Result, TaskError};
use crate::gateway::{backup, unique_file_name, ObjectStore};
use crate::metadata::ImageMetadata;
use crate::raster::Bounds;
use crate::timer::Timer;
use chrono::NaiveDate;
use metrics::counter;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub mod convert;
pub mod download;
pub mod rasterize;
pub mod split;
pub mod stack;

/// Resolved CLI options for one task run.
#[derive(Debug, Clone)]
pub struct TaskOptions {
    pub taskdate: NaiveDate,
    pub osm_file: Option<PathBuf>,
    pub osm_url: Option<String>,
    pub osmium_text_file: Option<PathBuf>,
    pub working_dir: PathBuf,
    pub bounds: Bounds,
    pub backup_step_data: bool,
    pub osmium_config: PathBuf,
    pub no_roads: bool,
}

#[derive(Debug)]
pub struct TaskResult {
    pub metadata_uri: String,
    pub image_uris: Vec<String>,
    pub road_uri: Option<String>,
}

/// The OSM rasterize task. Runs the seven pipeline steps in order:
/// download, convert, split, rasterize, stack, upload, cleanup.
pub struct RasterizeTask {
    options: TaskOptions,
    store: Arc<dyn ObjectStore>,
    /// Files this run created and may delete. User-supplied inputs never
    /// land here.
    scratch_files: Vec<PathBuf>,
    scratch_dirs: Vec<PathBuf>,
}

impl RasterizeTask {
    pub fn new(options: TaskOptions, store: Arc<dyn ObjectStore>) -> Self {
        RasterizeTask {
            options,
            store,
            scratch_files: Vec::new(),
            scratch_dirs: Vec::new(),
        }
    }

    pub async fn run(&mut self) -> Result<TaskResult> {
        counter!("hii_task_runs_total").increment(1);

        let config = OsmiumConfig::load(&self.options.osmium_config)?;
        if !self.options.no_roads && config.road_tags.is_empty() {
            return Err(TaskError::Config(format!(
                "No road_tags in '{}'; pass --no-roads to skip the roads extract",
                self.options.osmium_config.display()
            )));
        }

        tokio::fs::create_dir_all(&self.options.working_dir).await?;

        // Steps 1-2 are skipped when a text file is supplied directly.
        let (text_file, backup_handle) = self.prepare_text_file().await?;

        // Step 3
        let split_result = {
            let _t = Timer::new("Split text file to CSV files");
            let split_dir = self.options.working_dir.join("split_files");
            let roads_path = self.options.working_dir.join("roads.csv");
            self.scratch_dirs.push(split_dir.clone());
            self.scratch_files.push(roads_path.clone());

            let text = text_file.clone();
            let road_tags: HashMap<String, (String, String)> = config.road_tags.clone();
            let write_roads = !self.options.no_roads;
            tokio::task::spawn_blocking(move || {
                split::split_osmium_text_file(&text, &split_dir, &roads_path, &road_tags, write_roads)
            })
            .await??
        };
        counter!("hii_rows_split_total").increment(split_result.rows);
        println!(
            "✅ Split into {} CSV files ({} rows)",
            split_result.csv_files.len(),
            split_result.rows
        );

        // Step 4
        let image_paths = {
            let _t = Timer::new("Rasterize CSV files");
            let images_dir = self.options.working_dir.join("images");
            self.scratch_dirs.push(images_dir.clone());
            rasterize::rasterize(&split_result.csv_files, &images_dir, self.options.bounds).await?
        };
        println!("✅ Rasterized {} images", image_paths.len());

        // Step 5
        let stacked_images = {
            let _t = Timer::new("Stack images into multiband strips");
            self.scratch_files
                .push(self.options.working_dir.join(stack::VRT_NAME));
            let stacked =
                stack::stack_images(&image_paths, &self.options.working_dir, self.options.bounds)
                    .await?;
            self.scratch_files.extend(stacked.iter().cloned());
            stacked
        };
        println!("✅ Stacked into {} strip image(s)", stacked_images.len());

        // Step 6
        let result = {
            let _t = Timer::new("Upload outputs to cloud storage");
            let mut image_uris = Vec::new();
            for stacked in &stacked_images {
                let name = stacked
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| {
                        TaskError::Config(format!("Unexpected image path: {}", stacked.display()))
                    })?;
                image_uris.push(self.store.upload(stacked, name).await?);
            }

            let road_uri = match &split_result.roads_file {
                Some(roads) => Some(self.store.upload(roads, "roads.csv").await?),
                None => None,
            };

            let metadata = ImageMetadata::build(&image_paths, image_uris.clone(), road_uri.clone())?;
            let metadata_path = self.options.working_dir.join("metadata.json");
            metadata.write(&metadata_path)?;
            self.scratch_files.push(metadata_path.clone());
            let metadata_uri = self.store.upload(&metadata_path, "metadata.json").await?;

            TaskResult {
                metadata_uri,
                image_uris,
                road_uri,
            }
        };

        // The step-2 backup runs in the background; settle it before cleanup.
        if let Some(handle) = backup_handle {
            match handle.await? {
                Ok(uri) => info!("Step data backup at {}", uri),
                Err(e) => warn!("Step data backup failed: {}", e),
            }
        }

        // Step 7
        {
            let _t = Timer::new("Clean up working files");
            self.cleanup_working_files().await;
        }

        println!("Metadata uri: {}", result.metadata_uri);
        println!("Image URIS:");
        for image_uri in &result.image_uris {
            println!("\t{}", image_uri);
        }
        if let Some(road_uri) = &result.road_uri {
            println!("Road uri: {}", road_uri);
        }

        Ok(result)
    }

    /// Steps 1-2: ensure an osmium text export exists, downloading and
    /// converting as needed. Also kicks off the optional backup upload.
    async fn prepare_text_file(
        &mut self,
    ) -> Result<(PathBuf, Option<JoinHandle<Result<String>>>)> {
        if let Some(text_file) = &self.options.osmium_text_file {
            info!("Using pre-converted text file {}", text_file.display());
            return Ok((text_file.clone(), None));
        }

        let osm_file = match &self.options.osm_file {
            Some(path) => path.clone(),
            None => {
                let _t = Timer::new("Download osm file");
                let osm_url = self.resolve_osm_url();
                let path = self
                    .options
                    .working_dir
                    .join(unique_file_name("pbf", None));
                self.scratch_files.push(path.clone());
                download::download_osm(&osm_url, &path).await?
            }
        };

        let text_file = {
            let _t = Timer::new("Convert OSM to text file");
            let path = self
                .options
                .working_dir
                .join(unique_file_name("txt", None));
            self.scratch_files.push(path.clone());
            convert::osm_to_txt(&osm_file, &path, &self.options.osmium_config).await?
        };

        let backup_handle = if self.options.backup_step_data {
            let store = self.store.clone();
            let files = vec![text_file.clone()];
            let backup_name = unique_file_name(
                "txt",
                Some(&format!("pbf_text-{}", self.options.taskdate)),
            );
            let working_dir = self.options.working_dir.clone();
            Some(tokio::spawn(backup::archive_and_upload(
                store,
                files,
                backup_name,
                working_dir,
            )))
        } else {
            None
        };

        Ok((text_file, backup_handle))
    }

    /// --osm-url beats OSM_DATA_SOURCE beats the planet mirror default.
    fn resolve_osm_url(&self) -> String {
        if let Some(url) = &self.options.osm_url {
            return url.clone();
        }
        std::env::var(OSM_DATA_SOURCE_VAR).unwrap_or_else(|_| DEFAULT_OSM_URL.to_string())
    }

    /// Step 7: drop everything this run created under the working directory.
    /// Cleanup failures are logged, not fatal.
    async fn cleanup_working_files(&mut self) {
        for file in self.scratch_files.drain(..) {
            if let Err(e) = tokio::fs::remove_file(&file).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", file.display(), e);
                }
            }
        }
        for dir in self.scratch_dirs.drain(..) {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", dir.display(), e);
                }
            }
        }
    }
}
