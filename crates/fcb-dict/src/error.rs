use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictError {
    #[error("{}: byte {offset}: {message}", path.display())]
    Format {
        path: PathBuf,
        offset: usize,
        message: String,
    },

    #[error("invalid key path '{path}'")]
    InvalidPath { path: String },

    #[error("invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("invalid dictionary location '{location}'")]
    InvalidLocation { location: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DictError {
    pub(crate) fn format(offset: usize, message: impl Into<String>) -> Self {
        DictError::Format {
            path: PathBuf::from("<input>"),
            offset,
            message: message.into(),
        }
    }

    /// Attach the source file to a format error raised while parsing text.
    pub(crate) fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            DictError::Format {
                offset, message, ..
            } => DictError::Format {
                path: file.into(),
                offset,
                message,
            },
            other => other,
        }
    }
}

pub type DictResult<T> = Result<T, DictError>;
