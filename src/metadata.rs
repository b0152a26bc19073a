use crate::error::{Result, TaskError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One attribute/tag combination and the 1-based bands it owns in the
/// stacked images. A combination that spilled over several CSVs owns
/// several bands.
#[derive(Debug, Serialize, Deserialize)]
pub struct BandGroup {
    pub attribute: String,
    pub tag: String,
    pub bands: Vec<usize>,
}

/// Sidecar document describing the uploaded rasters: which band carries
/// which attribute/tag, the stacked image URIs, and the roads CSV URI.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub bands: BTreeMap<String, BandGroup>,
    pub images: Vec<String>,
    pub road: Option<String>,
}

impl ImageMetadata {
    /// Band numbering follows `image_paths` order, which is the band order
    /// the stacking step fed to gdalbuildvrt.
    pub fn build(
        image_paths: &[PathBuf],
        image_uris: Vec<String>,
        road_uri: Option<String>,
    ) -> Result<Self> {
        let mut bands: BTreeMap<String, BandGroup> = BTreeMap::new();
        for (n, path) in image_paths.iter().enumerate() {
            let (attribute_tag, attribute, tag) = parse_band_name(path)?;
            bands
                .entry(attribute_tag)
                .or_insert_with(|| BandGroup {
                    attribute,
                    tag,
                    bands: Vec::new(),
                })
                .bands
                .push(n + 1);
        }

        Ok(ImageMetadata {
            bands,
            images: image_uris,
            road: road_uri,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Splits an image file name of the form `<attribute>=<tag>_<uuid>.tif` into
/// its attribute/tag parts.
fn parse_band_name(path: &Path) -> Result<(String, String, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TaskError::Config(format!("Unexpected image name: {}", path.display())))?;

    let (attribute_tag, _uuid) = stem.rsplit_once('_').ok_or_else(|| {
        TaskError::Config(format!("Image name has no uuid suffix: {}", stem))
    })?;
    let (attribute, tag) = attribute_tag.split_once('=').ok_or_else(|| {
        TaskError::Config(format!("Image name has no attribute=tag prefix: {}", stem))
    })?;

    Ok((
        attribute_tag.to_string(),
        attribute.to_string(),
        tag.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_bands_by_attribute_tag() {
        let images = vec![
            PathBuf::from("/tmp/images/highway=residential_aaa.tif"),
            PathBuf::from("/tmp/images/highway=residential_bbb.tif"),
            PathBuf::from("/tmp/images/landuse=quarry_ccc.tif"),
        ];
        let uris = vec!["gs://b/d/stacked-1.tif".to_string()];
        let meta =
            ImageMetadata::build(&images, uris, Some("gs://b/d/roads.csv".to_string())).unwrap();

        let residential = &meta.bands["highway=residential"];
        assert_eq!(residential.attribute, "highway");
        assert_eq!(residential.tag, "residential");
        assert_eq!(residential.bands, vec![1, 2]);

        let quarry = &meta.bands["landuse=quarry"];
        assert_eq!(quarry.bands, vec![3]);
        assert_eq!(meta.road.as_deref(), Some("gs://b/d/roads.csv"));
    }

    #[test]
    fn roads_uri_serializes_to_null_when_absent() {
        let images = vec![PathBuf::from("highway=motorway_xyz.tif")];
        let meta = ImageMetadata::build(&images, vec![], None).unwrap();
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["road"], serde_json::Value::Null);
    }

    #[test]
    fn rejects_malformed_image_names() {
        let images = vec![PathBuf::from("no-tag-here.tif")];
        assert!(ImageMetadata::build(&images, vec![], None).is_err());
    }
}
