use roomscene_persist::StoreError;
use std::path::PathBuf;

/// Errors from building the scene environment.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
