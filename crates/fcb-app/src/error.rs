//! Error types for the fcb-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates so
/// the CLI only deals with one error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read settings file: {path}")]
    SettingsFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Settings validation failed: {0}")]
    Validation(String),

    #[error("Dictionary error: {0}")]
    Dict(String),

    #[error("Case error: {0}")]
    Case(String),

    #[error("Boundary error: {0}")]
    Boundary(String),

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fcb-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<fcb_dict::DictError> for AppError {
    fn from(err: fcb_dict::DictError) -> Self {
        AppError::Dict(err.to_string())
    }
}

impl From<fcb_case::CaseError> for AppError {
    fn from(err: fcb_case::CaseError) -> Self {
        AppError::Case(err.to_string())
    }
}

impl From<fcb_boundary::BoundaryError> for AppError {
    fn from(err: fcb_boundary::BoundaryError) -> Self {
        AppError::Boundary(err.to_string())
    }
}

impl From<fcb_mesh::MeshError> for AppError {
    fn from(err: fcb_mesh::MeshError) -> Self {
        AppError::Mesh(err.to_string())
    }
}

impl From<fcb_runtime::RuntimeError> for AppError {
    fn from(err: fcb_runtime::RuntimeError) -> Self {
        AppError::Runtime(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Manifest(err.to_string())
    }
}
