//! fcb-case: case directory creation from scratch, tutorials, or existing cases.

pub mod builder;
pub mod fsutil;
pub mod lock;
pub mod run_script;
pub mod templates;

pub use builder::{
    CaseDirectory, CaseOrigin, create_case, list_field_variables, move_poly_mesh,
};
pub use lock::CaseLock;
pub use run_script::{RunScript, write_run_script};
pub use templates::SolverFamily;

pub type CaseResult<T> = Result<T, CaseError>;

#[derive(thiserror::Error, Debug)]
pub enum CaseError {
    #[error("Template not found: {}", path.display())]
    TemplateNotFound { path: std::path::PathBuf },

    #[error("Case directory is locked by another build: {}", path.display())]
    Locked { path: std::path::PathBuf },

    #[error("Source and target are the same directory: {}", path.display())]
    SourceIsTarget { path: std::path::PathBuf },

    #[error("Source {} lies inside the case directory {}", path.display(), case_dir.display())]
    SourceInsideTarget {
        path: std::path::PathBuf,
        case_dir: std::path::PathBuf,
    },

    #[error("Installation root required to resolve tutorial '{tutorial}'")]
    NoInstallation { tutorial: String },

    #[error("Dictionary error: {0}")]
    Dict(#[from] fcb_dict::DictError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
