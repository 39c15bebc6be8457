//! fcb-runtime: locating an OpenFOAM installation and running its tools.
//!
//! A [`RuntimeEnvironment`] is detected once and passed by reference to
//! everything that launches solver tools. Commands are described with the
//! structured [`FoamCommand`] builder and only rendered into a concrete
//! shell invocation by [`ProcessRunner`].

pub mod command;
pub mod config;
pub mod detect;
pub mod path;
pub mod process;
pub mod version;

pub use command::{FoamCommand, Invocation};
pub use config::RuntimeConfig;
pub use detect::{LoginShell, RuntimeEnvironment, ShellQuery, check_prerequisites};
pub use path::{RuntimeKind, normalize_windows_path};
pub use process::{LineCallback, OutputCallbacks, ProcessHandle, ProcessRunner, RunOutcome};
pub use version::{FoamVariant, FoamVersion};

use std::path::PathBuf;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("No OpenFOAM installation found; set installation_path in the runtime config")]
    NotFound,

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error("'{program}' exited with code {exit_code}")]
    NonZeroExit {
        program: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Invalid version string '{0}'")]
    InvalidVersion(String),

    #[error("Invalid runtime config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
