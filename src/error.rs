use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(PathBuf),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    #[error("Unknown action '{action}' for service {service}")]
    UnknownAction { service: String, action: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
