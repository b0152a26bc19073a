use crate::constants::{BUCKET_VAR, SERVICE_ACCOUNT_KEY_VAR};
use crate::error::{Result, TaskError};
use crate::gateway::{incremented_name, ObjectStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

/// How many `name-1.ext`, `name-2.ext` alternatives to probe before giving up.
const MAX_INCREMENTS: u32 = 100;

/// Google Cloud Storage gateway, driven by the JSON API over plain HTTP.
/// Config via env:
/// - HII_OSM_BUCKET (target bucket)
/// - SERVICE_ACCOUNT_KEY (bearer token for storage uploads)
pub struct GcsStore {
    client: reqwest::Client,
    bucket: String,
    token: String,
    prefix: String,
    overwrite: bool,
}

impl GcsStore {
    pub fn from_env(taskdate: NaiveDate, overwrite: bool) -> Result<Self> {
        let bucket = std::env::var(BUCKET_VAR)?;
        let token = std::env::var(SERVICE_ACCOUNT_KEY_VAR)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3600))
            .build()?;

        Ok(GcsStore {
            client,
            bucket,
            token,
            prefix: taskdate.to_string(),
            overwrite,
        })
    }

    async fn try_upload(&self, src_path: &Path, object: &str) -> Result<StatusCode> {
        let file = tokio::fs::File::open(src_path).await?;
        let len = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let endpoint = format!(
            "https://storage.googleapis.com/upload/storage/v1/b/{}/o",
            self.bucket
        );
        let mut request = self
            .client
            .post(&endpoint)
            .query(&[("uploadType", "media"), ("name", object)])
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, len)
            .body(body);

        // ifGenerationMatch=0 only succeeds when the object does not exist
        // yet; a 412 response is the existence signal for increment handling.
        if !self.overwrite {
            request = request.query(&[("ifGenerationMatch", "0")]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::PRECONDITION_FAILED && !self.overwrite {
            return Ok(status);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaskError::Upload { status, body });
        }
        Ok(status)
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn upload(&self, src_path: &Path, name: &str) -> Result<String> {
        let mut candidate = name.to_string();
        for attempt in 1..=MAX_INCREMENTS {
            let object = format!("{}/{}", self.prefix, candidate);
            let status = self.try_upload(src_path, &object).await?;
            if status == StatusCode::PRECONDITION_FAILED {
                warn!("gs://{}/{} exists, incrementing", self.bucket, object);
                candidate = incremented_name(name, attempt);
                continue;
            }
            let uri = format!("gs://{}/{}", self.bucket, object);
            info!("Uploaded {} to {}", src_path.display(), uri);
            return Ok(uri);
        }

        Err(TaskError::Upload {
            status: StatusCode::PRECONDITION_FAILED,
            body: format!(
                "gave up finding a free name for '{}' after {} attempts",
                name, MAX_INCREMENTS
            ),
        })
    }
}
