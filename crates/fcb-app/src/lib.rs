//! Shared application service layer for foam-case-builder.
//!
//! Turns one [`CaseSettings`] document into a solver case (OpenFOAM case
//! directory or FEniCS JSON case file), records what happened in a
//! [`BuildReport`] plus an on-disk manifest, and starts the solver.

pub mod case_writer;
pub mod error;
pub mod fenics_writer;
pub mod manifest;
pub mod progress;
pub mod report;
pub mod residuals;
pub mod settings;
pub mod solver_service;

// Re-export key types for convenience
pub use case_writer::{FoamCaseWriter, write_foam_case};
pub use error::{AppError, AppResult};
pub use fenics_writer::{FenicsCaseFile, FenicsCaseWriter};
pub use manifest::{CaseManifest, compute_settings_hash, load_manifest, save_manifest};
pub use progress::{BuildProgressEvent, BuildStage};
pub use report::{BuildMessage, BuildReport, Severity};
pub use residuals::{ResidualSample, ResidualTracker};
pub use settings::{
    CaseSettings, InitialValues, MaterialSettings, MeshSettings, SolverTarget,
    TransientSettings, load_settings, save_settings, validate_settings,
};
pub use solver_service::launch;

use fcb_runtime::{ProcessRunner, RuntimeEnvironment};

/// Write the case described by `settings` for its solver target.
pub fn write_case(
    settings: &CaseSettings,
    runtime: &RuntimeEnvironment,
    progress_cb: Option<&mut dyn FnMut(BuildProgressEvent)>,
) -> BuildReport {
    match settings.solver {
        SolverTarget::OpenFoam => {
            let runner = ProcessRunner::new(runtime);
            FoamCaseWriter::new(settings, &runner).write(progress_cb)
        }
        SolverTarget::Fenics => FenicsCaseWriter::new(settings).write(progress_cb),
    }
}
