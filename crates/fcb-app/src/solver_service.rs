//! Starting the solver on a written case.

use std::path::Path;

use fcb_runtime::process::start_invocation;
use fcb_runtime::{FoamCommand, Invocation, OutputCallbacks, ProcessHandle, ProcessRunner, RuntimeEnvironment};

use crate::error::{AppError, AppResult};
use crate::fenics_writer::FenicsCaseWriter;
use crate::settings::{CaseSettings, SolverTarget};

/// Python interpreter used for the FEniCS solvers.
pub const FENICS_PYTHON: &str = "python3";
pub const FENICS_MODULE: &str = "FenicsSolver";

/// Command that runs an OpenFOAM case: its `Allrun` script when present,
/// otherwise `<solver> -case <case>` logged to `log.<solver>`.
pub fn foam_solver_command(
    settings: &CaseSettings,
    runtime: &RuntimeEnvironment,
    case_dir: &Path,
) -> FoamCommand {
    if case_dir.join("Allrun").is_file() {
        FoamCommand::new("sh").arg("Allrun").cwd(case_dir)
    } else {
        FoamCommand::new(&settings.solver_name)
            .arg("-case")
            .arg(runtime.translate_path(case_dir))
            .cwd(case_dir)
            .logged()
    }
}

pub fn fenics_solver_invocation(settings: &CaseSettings) -> Invocation {
    let case_file = FenicsCaseWriter::new(settings).case_file_path();
    Invocation::new(FENICS_PYTHON)
        .arg("-m")
        .arg(FENICS_MODULE)
        .arg(case_file.to_string_lossy())
        .cwd(settings.case_dir())
}

/// Start the solver for a case written from `settings`.
///
/// Output lines go to `callbacks` as they arrive; the returned handle can
/// be polled, awaited or killed.
pub fn launch(
    settings: &CaseSettings,
    runtime: &RuntimeEnvironment,
    callbacks: OutputCallbacks,
) -> AppResult<ProcessHandle> {
    let case_dir = settings.case_dir();
    if !case_dir.is_dir() {
        return Err(AppError::Case(format!(
            "Case directory {} does not exist, write the case first",
            case_dir.display()
        )));
    }

    let handle = match settings.solver {
        SolverTarget::OpenFoam => {
            let cmd = foam_solver_command(settings, runtime, &case_dir);
            ProcessRunner::new(runtime).start(&cmd, callbacks)?
        }
        SolverTarget::Fenics => start_invocation(&fenics_solver_invocation(settings), callbacks)?,
    };
    tracing::info!(pid = handle.pid(), case = %case_dir.display(), "solver started");
    Ok(handle)
}
