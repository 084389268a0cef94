use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BalloonError {
    #[error("invalid page {page}: {reason}")]
    InvalidPage { page: usize, reason: String },

    #[error("page source failed: {0}")]
    Source(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
