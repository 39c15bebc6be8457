//! fcb-boundary: translation of physical boundary descriptors into
//! solver boundary conditions.
//!
//! Two targets are supported: FEniCS (Dirichlet/Neumann/Robin records for
//! the JSON case file) and OpenFOAM (per-field `boundaryField`
//! dictionaries). Unsupported type/subtype combinations are reported as
//! [`Diagnostic`]s and the patch is left out; an unknown thermal subtype is
//! an error.

pub mod fenics;
pub mod foam;
pub mod schema;
pub mod table;
pub mod turbulence;

pub use fenics::{
    FenicsBoundary, FenicsCondition, FenicsTranslation, NumericalType, TurbulenceRecord,
    translate_fenics,
};
pub use foam::{FieldBoundaries, FieldClass, FoamDialect, FoamTranslation, translate_foam};
pub use schema::*;
pub use table::{BoundaryTable, patch_type};
pub use turbulence::{TurbulenceModel, TurbulenceValues};

pub type BoundaryResult<T> = Result<T, BoundaryError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("Boundary '{boundary}': '{subtype}' is not a valid thermal boundary type")]
    ThermalSubtypeInvalid { boundary: String, subtype: String },

    #[error("Duplicate boundary name: {name}")]
    DuplicateName { name: String },
}
