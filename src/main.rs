use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use hii_osm_rasterize::constants::DEFAULT_EXTENT;
use hii_osm_rasterize::gateway::gcs::GcsStore;
use hii_osm_rasterize::gateway::ObjectStore;
use hii_osm_rasterize::logging;
use hii_osm_rasterize::pipeline::{RasterizeTask, TaskOptions};
use hii_osm_rasterize::raster::Bounds;

#[derive(Parser)]
#[command(name = "hii_osm_rasterize")]
#[command(about = "Rasterize OpenStreetMap attribute/tag extracts and upload them to cloud storage")]
#[command(version = "0.1.0")]
struct Cli {
    /// Task date; used as the cloud storage prefix for all outputs
    #[arg(short = 'd', long, default_value_t = Utc::now().date_naive())]
    taskdate: NaiveDate,

    /// Local path to an OSM PBF file. If not provided, the file is downloaded
    #[arg(short = 'f', long)]
    osm_file: Option<PathBuf>,

    /// Source URL for the OSM PBF download
    #[arg(short = 'u', long)]
    osm_url: Option<String>,

    /// Pre-converted osmium text export; skips the download and convert steps
    #[arg(long)]
    osmium_text_file: Option<PathBuf>,

    /// Working directory for files and directories created during processing
    #[arg(short = 'w', long, default_value = "/tmp")]
    working_dir: PathBuf,

    /// Output geographic bounds as minx,miny,maxx,maxy
    #[arg(long, default_value = DEFAULT_EXTENT)]
    extent: String,

    /// Back up the osmium text export to cloud storage as a tar.gz
    #[arg(long, default_value_t = false)]
    backup_step_data: bool,

    /// Osmium export configuration; also carries the road_tags mapping
    #[arg(long, default_value = "osmium_config.json")]
    osmium_config: PathBuf,

    /// Overwrite existing cloud objects instead of incrementing their names
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Skip the roads CSV extract and upload
    #[arg(long, default_value_t = false)]
    no_roads: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let bounds = Bounds::parse(&cli.extent)?;
    let store: Arc<dyn ObjectStore> = Arc::new(GcsStore::from_env(cli.taskdate, cli.overwrite)?);

    let options = TaskOptions {
        taskdate: cli.taskdate,
        osm_file: cli.osm_file,
        osm_url: cli.osm_url,
        osmium_text_file: cli.osmium_text_file,
        working_dir: cli.working_dir,
        bounds,
        backup_step_data: cli.backup_step_data,
        osmium_config: cli.osmium_config,
        no_roads: cli.no_roads,
    };

    println!("🚀 Running OSM rasterize task for {}", options.taskdate);
    let mut task = RasterizeTask::new(options, store);
    match task.run().await {
        Ok(_) => {
            println!("✅ Task completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Task failed: {}", e);
            println!("❌ Task failed: {}", e);
            Err(e.into())
        }
    }
}
