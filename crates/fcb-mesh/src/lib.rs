//! fcb-mesh: converting external meshes into OpenFOAM's `polyMesh`.
//!
//! Conversion shells out to the installation's converter, then fixes up
//! the generated `constant/polyMesh/boundary` file and rescales the
//! points into metres.

pub mod boundary;
pub mod convert;
pub mod fenics;
pub mod format;
pub mod names;

pub use boundary::{
    DEFAULT_FACES, boundary_file_path, change_patch_type, list_patch_names, rename_patch,
};
pub use convert::{ConvertedMesh, MeshConversion, convert_mesh};
pub use fenics::dolfin_convert;
pub use format::MeshFormat;
pub use names::{normalize_unv_boundary_names, strip_generated_suffix};

use std::path::PathBuf;

pub type MeshResult<T> = Result<T, MeshError>;

#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    #[error("Mesh conversion with {tool} failed (exit code {exit_code}): {stderr}")]
    Conversion {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Unsupported mesh file: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Mesh file not found: {}", path.display())]
    MeshNotFound { path: PathBuf },

    #[error("Runtime error: {0}")]
    Runtime(#[from] fcb_runtime::RuntimeError),

    #[error("Dictionary error: {0}")]
    Dict(#[from] fcb_dict::DictError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
