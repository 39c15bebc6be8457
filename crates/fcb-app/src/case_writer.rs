//! OpenFOAM case writer: settings in, runnable case directory out.

use std::time::Instant;

use fcb_boundary::{
    FieldBoundaries, FoamDialect, TurbulenceModel, patch_type, translate_foam,
};
use fcb_case::{CaseDirectory, CaseLock, RunScript, create_case, move_poly_mesh, write_run_script};
use fcb_dict::{
    ChangeKind, Dictionary, FoamDict, Header, Value, uniform_scalar, uniform_vector,
};
use fcb_mesh::{DEFAULT_FACES, MeshConversion, change_patch_type, convert_mesh};
use fcb_runtime::{ProcessRunner, RuntimeEnvironment};

use crate::error::AppResult;
use crate::manifest::{CaseManifest, save_manifest};
use crate::progress::{BuildProgressEvent, BuildStage, ProgressCallback, emit_progress};
use crate::report::BuildReport;
use crate::settings::{CaseSettings, validate_settings};

const NU_DIMENSIONS: &str = "[0 2 -1 0 0 0 0]";

/// Builds an OpenFOAM case directory from [`CaseSettings`].
///
/// External tools (mesh converters, `transformPoints`) run through the
/// given runner, so its environment decides the installation and dialect.
pub struct FoamCaseWriter<'a> {
    settings: &'a CaseSettings,
    runner: &'a ProcessRunner<'a>,
}

impl<'a> FoamCaseWriter<'a> {
    pub fn new(settings: &'a CaseSettings, runner: &'a ProcessRunner<'a>) -> Self {
        Self { settings, runner }
    }

    fn runtime(&self) -> &RuntimeEnvironment {
        self.runner.environment()
    }

    fn dialect(&self) -> FoamDialect {
        let env = self.runtime();
        FoamDialect {
            major: env.version.major,
            fork_extend: env.variant.is_extend(),
        }
    }

    fn header(&self, object: &str, location: &str) -> AppResult<Header> {
        let mut header = Header::new(object).with_location(location)?;
        let version = self.runtime().version;
        if !version.is_dev() {
            header = header.with_banner_version((version.major, version.minor));
        }
        Ok(header)
    }

    /// Run the whole pipeline.
    ///
    /// Never panics on a failed step: the error is appended to the report,
    /// `success` stays false and whatever was written so far is left on
    /// disk. A manifest is written whenever the case directory exists.
    pub fn write(
        &self,
        mut progress_cb: Option<&mut dyn FnMut(BuildProgressEvent)>,
    ) -> BuildReport {
        let started = Instant::now();
        let case_dir = self.settings.case_dir();
        let mut report = BuildReport::new(&case_dir);
        tracing::info!(case = %case_dir.display(), solver = %self.settings.solver_name, "writing case");

        match self.build(&mut report, &mut progress_cb, started) {
            Ok(()) => {
                report.success = true;
                report.info(format!("Case written to {}", case_dir.display()));
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
    ) -> AppResult<()> {
        let settings = self.settings;
        validate_settings(settings)?;

        emit_progress(progress_cb, BuildStage::AcquiringLock, started, None);
        std::fs::create_dir_all(&settings.working_dir)?;
        let case_dir = settings.case_dir();
        let _lock = CaseLock::acquire(&case_dir)?;

        emit_progress(progress_cb, BuildStage::CreatingCase, started, None);
        let case = create_case(
            &case_dir,
            settings.origin(),
            self.runtime().install_dir.as_deref(),
            settings.backup_dir.as_deref(),
        )?;
        report.info(format!("Created case directory {}", case.root.display()));

        emit_progress(progress_cb, BuildStage::ConvertingMesh, started, None);
        let mesh = self.convert_mesh(&case, report)?;

        emit_progress(progress_cb, BuildStage::WritingProperties, started, None);
        self.write_transport_properties(&case)?;
        self.write_turbulence_properties(&case, report)?;
        report.info("Wrote transportProperties and turbulenceProperties");
        if settings.physics.heat_transfer {
            report.warning("Heat transfer enabled: thermophysical properties must be edited by hand");
        }

        emit_progress(progress_cb, BuildStage::WritingBoundaries, started, None);
        self.write_boundary_fields(&case, mesh.default_patch.as_deref(), report)?;

        emit_progress(progress_cb, BuildStage::WritingControls, started, None);
        self.write_controls(&case, report)?;

        emit_progress(progress_cb, BuildStage::WritingRunScript, started, None);
        let script = RunScript {
            solver: settings.solver_name.clone(),
            parallel: settings.parallel,
            potential_foam: settings.potential_foam,
            link_mesh: mesh.linked,
        };
        let path = write_run_script(&case.root, &script)?;
        report.info(format!("Wrote run script {}", path.display()));
        Ok(())
    }

    fn convert_mesh(&self, case: &CaseDirectory, report: &mut BuildReport) -> AppResult<MeshState> {
        let Some(mesh) = &self.settings.mesh else {
            report.info("No mesh file given, mesh left as provided by the case");
            return Ok(MeshState {
                default_patch: None,
                linked: case.constant().join("polyMesh.org").is_dir(),
            });
        };

        let mut request = MeshConversion::new(&mesh.file)
            .with_unit_schema(mesh.unit_schema)
            .with_boundaries(self.settings.boundary_names());
        if let Some(format) = mesh.format {
            request = request.with_format(format);
        }
        let converted = convert_mesh(self.runner, &case.root, &request)?;
        report.info(format!(
            "Converted {} mesh with {} patches (scale {})",
            converted.format,
            converted.patches.len(),
            converted.scale
        ));

        for desc in &self.settings.boundaries {
            if !converted.patches.contains(&desc.name) {
                report.warning(format!(
                    "Boundary '{}' has no matching mesh patch",
                    desc.name
                ));
                continue;
            }
            let kind = patch_type(desc.boundary_type, &desc.subtype);
            if kind != "patch" {
                change_patch_type(&case.root, &desc.name, kind)?;
            }
        }

        move_poly_mesh(&case.root)?;
        let default_patch = converted
            .patches
            .iter()
            .any(|p| p == DEFAULT_FACES)
            .then(|| DEFAULT_FACES.to_string());
        Ok(MeshState {
            default_patch,
            linked: true,
        })
    }

    fn write_transport_properties(&self, case: &CaseDirectory) -> AppResult<()> {
        let nu = self.settings.material.kinematic_viscosity();
        let mut doc = FoamDict::new(self.header("transportProperties", "constant")?);
        doc.body.insert("transportModel", Value::word("Newtonian"));
        let mut entry = Vec::new();
        if self.dialect().legacy() {
            entry.push(Value::word("nu"));
        }
        if let Value::Tuple(dims) = Value::words(NU_DIMENSIONS) {
            entry.extend(dims);
        }
        entry.push(Value::number(nu));
        doc.body.insert("nu", Value::Tuple(entry));
        doc.save_in_case(&case.root)?;
        Ok(())
    }

    fn write_turbulence_properties(
        &self,
        case: &CaseDirectory,
        report: &mut BuildReport,
    ) -> AppResult<()> {
        let model = TurbulenceModel::from_name(&self.settings.physics.turbulence_model);
        let simulation_type = model.simulation_type();
        let mut doc = FoamDict::new(self.header("turbulenceProperties", "constant")?);
        doc.body.insert("simulationType", Value::word(simulation_type));

        if simulation_type != "laminar" {
            let mut block = Dictionary::new();
            block.insert(format!("{simulation_type}Model"), Value::word(model.name()));
            block.insert("turbulence", Value::boolean(true));
            block.insert("printCoeffs", Value::boolean(true));
            if simulation_type == "LES" {
                block.insert("delta", Value::word("cubeRootVol"));
            }
            doc.body.insert(simulation_type, block);
        } else if !model.is_laminar() {
            report.warning(format!(
                "Turbulence model '{}' is not supported, running laminar",
                model.name()
            ));
        }
        doc.save_in_case(&case.root)?;
        Ok(())
    }

    fn internal_field(&self, field: &FieldBoundaries) -> Value {
        let initial = &self.settings.initial_values;
        match field.field.as_str() {
            "U" => {
                let mut v = [0.0; 3];
                for (dst, src) in v.iter_mut().zip(&initial.velocity) {
                    *dst = *src;
                }
                uniform_vector(&v)
            }
            "p" => uniform_scalar(initial.pressure),
            "T" => uniform_scalar(initial.temperature),
            _ => field.internal.clone(),
        }
    }

    fn write_boundary_fields(
        &self,
        case: &CaseDirectory,
        default_patch: Option<&str>,
        report: &mut BuildReport,
    ) -> AppResult<()> {
        let physics = self.settings.effective_physics();
        let translation = translate_foam(
            &self.settings.boundaries,
            &physics,
            self.dialect(),
            default_patch,
        )?;
        for diagnostic in &translation.diagnostics {
            report.warning(diagnostic.to_string());
        }
        for warning in &translation.warnings {
            report.warning(warning.clone());
        }

        std::fs::create_dir_all(case.zero())?;
        for field in &translation.fields {
            let header = self
                .header(&field.field, "0")?
                .with_class(field.class.class_name());
            let mut doc = FoamDict::new(header);
            doc.body.insert("dimensions", Value::words(field.dimensions));
            doc.body.insert("internalField", self.internal_field(field));
            doc.body.insert("boundaryField", field.boundary_field.clone());
            doc.save_in_case(&case.root)?;
        }
        let names: Vec<&str> = translation.fields.iter().map(|f| f.field.as_str()).collect();
        report.info(format!("Wrote field files: {}", names.join(", ")));
        Ok(())
    }

    fn write_controls(&self, case: &CaseDirectory, report: &mut BuildReport) -> AppResult<()> {
        let path = case.system().join("controlDict");
        let mut doc = FoamDict::load(&path)?;

        let mut patch = Dictionary::new();
        patch.insert("application", Value::word(&self.settings.solver_name));
        if let Some(t) = &self.settings.transient {
            patch.insert("startTime", Value::number(t.start_time));
            patch.insert("endTime", Value::number(t.end_time));
            patch.insert("deltaT", Value::number(t.time_step));
            patch.insert("writeInterval", Value::number(t.write_interval));
            if !fcb_case::SolverFamily::from_solver_name(&self.settings.solver_name).is_transient()
            {
                report.warning(format!(
                    "Time step settings given for steady solver {}",
                    self.settings.solver_name
                ));
            }
        }

        let merge = doc.update(&patch, false);
        for change in merge.overwritten() {
            if let ChangeKind::Overwritten { old, new } = &change.kind {
                report.info(format!("controlDict {}: {} -> {}", change.path, old, new));
            }
        }
        if merge.changed() {
            doc.save(&path)?;
        }
        Ok(())
    }
}

/// What the mesh step left behind for the later steps.
struct MeshState {
    /// Converter catch-all patch, when the converted mesh has one.
    default_patch: Option<String>,
    /// `constant/polyMesh.org` exists and the run script must link it.
    linked: bool,
}

/// Convenience wrapper: build `settings` with `runtime` and no progress
/// callback.
pub fn write_foam_case(settings: &CaseSettings, runtime: &RuntimeEnvironment) -> BuildReport {
    let runner = ProcessRunner::new(runtime);
    FoamCaseWriter::new(settings, &runner).write(None)
}

