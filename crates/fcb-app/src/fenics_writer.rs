//! FEniCS case writer: one JSON case file read by the FEniCS solvers.

use std::path::{Path, PathBuf};
use std::time::Instant;

use fcb_boundary::{FenicsBoundary, translate_fenics};
use fcb_case::CaseLock;
use fcb_core::Real;
use fcb_mesh::dolfin_convert;
use serde::{Serialize, Serializer};

use crate::error::{AppError, AppResult};
use crate::manifest::{CaseManifest, save_manifest};
use crate::progress::{BuildProgressEvent, BuildStage, ProgressCallback, emit_progress};
use crate::report::BuildReport;
use crate::settings::{CaseSettings, validate_settings};

pub const SCALAR_TRANSPORT_SOLVER: &str = "ScalarTransportSolver";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FenicsMaterial {
    pub name: String,
    pub kinematic_viscosity: Real,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_heat_capacity: Option<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermal_conductivity: Option<Real>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FenicsInitialValues {
    pub velocity: Vec<Real>,
    pub pressure: Real,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Real>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverParameters {
    pub relative_tolerance: Real,
    pub maximum_iterations: u32,
    pub monitor_convergence: bool,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-5,
            maximum_iterations: 500,
            monitor_convergence: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceValues {
    pub pressure: Real,
    pub velocity: Vec<Real>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransientControl {
    pub transient: bool,
    pub starting_time: Real,
    pub ending_time: Real,
    pub time_step: Real,
    pub write_interval: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FenicsSolverSettings {
    pub solver_parameters: SolverParameters,
    pub reference_values: ReferenceValues,
    pub transient_settings: TransientControl,
}

/// Content of `<case>/<case_name>.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FenicsCaseFile {
    pub case_name: String,
    pub case_folder: PathBuf,
    pub case_file: PathBuf,
    /// DOLFIN XML mesh; `null` when no mesh was given.
    pub mesh: Option<PathBuf>,
    pub solver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar_name: Option<String>,
    pub material: FenicsMaterial,
    /// Written as an object keyed by boundary name, in input order.
    #[serde(serialize_with = "named_map")]
    pub boundary_conditions: Vec<FenicsBoundary>,
    pub initial_values: FenicsInitialValues,
    pub solver_settings: FenicsSolverSettings,
    pub solving_temperature: bool,
    pub body_source: Option<Real>,
}

fn named_map<S: Serializer>(boundaries: &[FenicsBoundary], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(boundaries.iter().map(|b| (b.name.as_str(), b)))
}

impl FenicsCaseFile {
    /// Serialize with 4-space indentation.
    pub fn to_json(&self) -> AppResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| AppError::Settings(format!("Failed to serialize FEniCS case: {}", e)))?;
        String::from_utf8(buf).map_err(|e| AppError::Settings(e.to_string()))
    }
}

/// Builds a FEniCS case folder from [`CaseSettings`].
pub struct FenicsCaseWriter<'a> {
    settings: &'a CaseSettings,
}

impl<'a> FenicsCaseWriter<'a> {
    pub fn new(settings: &'a CaseSettings) -> Self {
        Self { settings }
    }

    pub fn case_file_path(&self) -> PathBuf {
        self.settings
            .case_dir()
            .join(format!("{}.json", self.settings.case_name))
    }

    /// Assemble the case file content. `mesh` is the converted XML mesh.
    pub fn case_file(
        &self,
        mesh: Option<PathBuf>,
        report: &mut BuildReport,
    ) -> AppResult<FenicsCaseFile> {
        let settings = self.settings;
        let physics = settings.effective_physics();
        let dim = physics.dimension;

        let translation = translate_fenics(&settings.boundaries, &physics)?;
        for diagnostic in &translation.diagnostics {
            report.warning(diagnostic.to_string());
        }

        let heat = physics.heat_transfer;
        let material = &settings.material;
        let transient_settings = match &settings.transient {
            Some(t) => TransientControl {
                transient: true,
                starting_time: t.start_time,
                ending_time: t.end_time,
                time_step: t.time_step,
                write_interval: t.write_interval,
            },
            None => TransientControl {
                transient: false,
                starting_time: 0.0,
                ending_time: 1.0,
                time_step: 0.01,
                write_interval: 0.1,
            },
        };

        Ok(FenicsCaseFile {
            case_name: settings.case_name.clone(),
            case_folder: settings.case_dir(),
            case_file: self.case_file_path(),
            mesh,
            solver_name: settings.solver_name.clone(),
            scalar_name: (settings.solver_name == SCALAR_TRANSPORT_SOLVER)
                .then(|| "temperature".to_string()),
            material: FenicsMaterial {
                name: material.name.clone(),
                kinematic_viscosity: physics.kinematic_viscosity,
                density: material.density,
                specific_heat_capacity: material.specific_heat,
                thermal_conductivity: material.conductivity,
            },
            boundary_conditions: translation.boundaries,
            initial_values: FenicsInitialValues {
                velocity: dim.truncate(&settings.initial_values.velocity),
                pressure: settings.initial_values.pressure,
                temperature: heat.then_some(settings.initial_values.temperature),
            },
            solver_settings: FenicsSolverSettings {
                solver_parameters: SolverParameters::default(),
                reference_values: ReferenceValues {
                    pressure: 1e5,
                    velocity: vec![1.0; dim.count()],
                },
                transient_settings,
            },
            solving_temperature: heat,
            body_source: None,
        })
    }

    fn prepare_mesh(&self, report: &mut BuildReport) -> AppResult<Option<PathBuf>> {
        let Some(mesh) = &self.settings.mesh else {
            report.warning("No mesh file given, case file has no mesh");
            return Ok(None);
        };
        let ext = mesh
            .file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xml") => Ok(Some(mesh.file.clone())),
            Some("msh") => {
                let xml = dolfin_convert(&mesh.file)?;
                report.info(format!("Converted mesh to {}", xml.display()));
                Ok(Some(xml))
            }
            _ => Err(AppError::Mesh(format!(
                "FEniCS needs a Gmsh .msh or DOLFIN .xml mesh, got {}",
                mesh.file.display()
            ))),
        }
    }

    pub fn write(
        &self,
        mut progress_cb: Option<&mut dyn FnMut(BuildProgressEvent)>,
    ) -> BuildReport {
        let started = Instant::now();
        let case_dir = self.settings.case_dir();
        let mut report = BuildReport::new(&case_dir);

        match self.build(&mut report, &mut progress_cb, started) {
            Ok(path) => {
                report.success = true;
                report.info(format!("Case file written to {}", path.display()));
                emit_progress(&mut progress_cb, BuildStage::Completed, started, None);
            }
            Err(err) => report.error(err.to_string()),
        }

        if case_dir.is_dir() {
            let manifest = CaseManifest::new(self.settings, &report);
            if let Err(err) = save_manifest(&case_dir, &manifest) {
                report.warning(format!("Case manifest not written: {err}"));
            }
        }
        report
    }

    fn build(
        &self,
        report: &mut BuildReport,
        progress_cb: &mut ProgressCallback<'_>,
        started: Instant,
    ) -> AppResult<PathBuf> {
        validate_settings(self.settings)?;

        emit_progress(progress_cb, BuildStage::AcquiringLock, started, None);
        let case_dir = self.settings.case_dir();
        std::fs::create_dir_all(&self.settings.working_dir)?;
        let _lock = CaseLock::acquire(&case_dir)?;

        emit_progress(progress_cb, BuildStage::CreatingCase, started, None);
        std::fs::create_dir_all(&case_dir)?;

        emit_progress(progress_cb, BuildStage::ConvertingMesh, started, None);
        let mesh = self.prepare_mesh(report)?;

        emit_progress(progress_cb, BuildStage::WritingBoundaries, started, None);
        let file = self.case_file(mesh, report)?;
        let path = self.case_file_path();
        write_case_file(&path, &file)?;
        Ok(path)
    }
}

pub fn write_case_file(path: &Path, file: &FenicsCaseFile) -> AppResult<()> {
    std::fs::write(path, file.to_json()?)?;
    tracing::debug!(path = %path.display(), "wrote FEniCS case file");
    Ok(())
}
