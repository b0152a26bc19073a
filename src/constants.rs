/// Tuning constants shared across pipeline steps.

/// Smallest polygon kept in the roads extract, in square meters.
pub const MIN_GEOM_AREA: f64 = 5.0;

/// Decimal places kept when rounding polygon coordinates.
pub const POLYGON_PRECISION: u32 = 5;

/// Data rows per split CSV before a new file is opened.
pub const MAX_ROWS: usize = 1_000_000;

/// Output pixel size in degrees (both axes).
pub const PIXEL_SIZE: f64 = 0.003;

/// GeoTIFF internal tile size.
pub const BLOCK_SIZE: u32 = 1024;

/// Default output bounds: minx, miny, maxx, maxy.
pub const DEFAULT_EXTENT: &str = "-180.0,-58.0,180.0,84.0";

/// Planet mirror used when neither --osm-url nor OSM_DATA_SOURCE is given.
pub const DEFAULT_OSM_URL: &str = "https://ftp.fau.de/osm-planet/pbf/planet-latest.osm.pbf";

/// Environment variable holding the storage bearer token.
pub const SERVICE_ACCOUNT_KEY_VAR: &str = "SERVICE_ACCOUNT_KEY";

/// Environment variable naming the target Cloud Storage bucket.
pub const BUCKET_VAR: &str = "HII_OSM_BUCKET";

/// Environment variable overriding the default PBF source URL.
pub const OSM_DATA_SOURCE_VAR: &str = "OSM_DATA_SOURCE";
