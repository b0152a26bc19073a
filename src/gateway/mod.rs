use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub mod backup;
pub mod gcs;
pub mod local;

/// Destination for pipeline outputs. Implementations place objects under the
/// taskdate prefix and report back the destination URI.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, src_path: &Path, name: &str) -> Result<String>;
}

/// A collision-free working file name, `<prefix>-<uuid>.<ext>`.
pub fn unique_file_name(ext: &str, prefix: Option<&str>) -> String {
    let name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
    match prefix {
        Some(p) => format!("{}-{}", p, name),
        None => name,
    }
}

/// `roads.csv` -> `roads-1.csv`, `roads-2.csv`, ... used when an object
/// already exists and --overwrite is not set.
pub fn incremented_name(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}-{}.{}", stem, n, ext),
        None => format!("{}-{}", name, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_carry_prefix_and_extension() {
        let name = unique_file_name("pbf", None);
        assert!(name.ends_with(".pbf"));

        let name = unique_file_name("txt", Some("pbf_text-2023-01-01"));
        assert!(name.starts_with("pbf_text-2023-01-01-"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn unique_names_do_not_repeat() {
        assert_ne!(unique_file_name("tif", None), unique_file_name("tif", None));
    }

    #[test]
    fn incremented_names_keep_the_extension() {
        assert_eq!(incremented_name("roads.csv", 1), "roads-1.csv");
        assert_eq!(incremented_name("stacked-2.tif", 3), "stacked-2-3.tif");
        assert_eq!(incremented_name("noext", 1), "noext-1");
    }
}
