use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{tool} failed with {status}: {stderr}")]
    Command {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Download failed: {status} - {body}")]
    Download {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Upload failed: {status} - {body}")]
    Upload {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, TaskError>;
