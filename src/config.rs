use crate::error::{Result, TaskError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// The osmium export configuration file. The same JSON is passed verbatim to
/// `osmium export -c`; this crate only reads the `road_tags` section, which
/// maps an `attribute=tag` key to the `[attribute, tag]` pair written to the
/// roads CSV.
#[derive(Debug, Deserialize)]
pub struct OsmiumConfig {
    #[serde(default)]
    pub road_tags: HashMap<String, (String, String)>,
}

impl OsmiumConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TaskError::Config(format!(
                "Failed to read osmium config '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: OsmiumConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_road_tags_and_ignores_osmium_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "attributes": {{ "type": false, "id": false }},
                "linear_tags": ["highway", "railway"],
                "road_tags": {{
                    "highway=residential": ["highway", "residential"],
                    "highway=motorway": ["highway", "motorway"]
                }}
            }}"#
        )
        .unwrap();

        let config = OsmiumConfig::load(file.path()).unwrap();
        assert_eq!(config.road_tags.len(), 2);
        assert_eq!(
            config.road_tags.get("highway=motorway"),
            Some(&("highway".to_string(), "motorway".to_string()))
        );
    }

    #[test]
    fn missing_road_tags_defaults_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "linear_tags": ["highway"] }}"#).unwrap();

        let config = OsmiumConfig::load(file.path()).unwrap();
        assert!(config.road_tags.is_empty());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = OsmiumConfig::load(Path::new("/nonexistent/osmium_config.json")).unwrap_err();
        assert!(matches!(err, TaskError::Config(_)));
    }
}
