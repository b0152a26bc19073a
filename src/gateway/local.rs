use crate::error::Result;
use crate::gateway::{incremented_name, ObjectStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Filesystem twin of the GCS gateway, with the same taskdate prefix and
/// overwrite/increment behavior. Used by tests and offline runs.
pub struct LocalStore {
    root: PathBuf,
    prefix: String,
    overwrite: bool,
}

impl LocalStore {
    pub fn new(root: PathBuf, taskdate: NaiveDate, overwrite: bool) -> Self {
        LocalStore {
            root,
            prefix: taskdate.to_string(),
            overwrite,
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn upload(&self, src_path: &Path, name: &str) -> Result<String> {
        let dir = self.root.join(&self.prefix);
        tokio::fs::create_dir_all(&dir).await?;

        let mut target = dir.join(name);
        if !self.overwrite {
            let mut attempt = 0;
            while target.exists() {
                attempt += 1;
                target = dir.join(incremented_name(name, attempt));
            }
        }

        tokio::fs::copy(src_path, &target).await?;
        Ok(target.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn taskdate() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn uploads_under_the_taskdate_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("roads.csv");
        fs::write(&src, "\"wkt\",\"attribute\",\"tag\"\n").unwrap();

        let store = LocalStore::new(tmp.path().join("bucket"), taskdate(), true);
        let uri = store.upload(&src, "roads.csv").await.unwrap();
        assert!(uri.ends_with("2023-06-01/roads.csv"));
        assert!(Path::new(&uri).exists());
    }

    #[tokio::test]
    async fn increments_instead_of_clobbering() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("metadata.json");
        fs::write(&src, "{}").unwrap();

        let store = LocalStore::new(tmp.path().join("bucket"), taskdate(), false);
        let first = store.upload(&src, "metadata.json").await.unwrap();
        let second = store.upload(&src, "metadata.json").await.unwrap();
        assert!(first.ends_with("metadata.json"));
        assert!(second.ends_with("metadata-1.json"));
        assert!(Path::new(&first).exists());
        assert!(Path::new(&second).exists());
    }

    #[tokio::test]
    async fn overwrite_replaces_the_object() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        fs::write(&src, "one").unwrap();

        let store = LocalStore::new(tmp.path().join("bucket"), taskdate(), true);
        let first = store.upload(&src, "a.txt").await.unwrap();
        fs::write(&src, "two").unwrap();
        let second = store.upload(&src, "a.txt").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "two");
    }
}
