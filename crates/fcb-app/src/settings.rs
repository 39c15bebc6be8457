//! Case settings: the complete input of one case build.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use fcb_boundary::{BoundaryDescriptor, PhysicsSettings};
use fcb_case::CaseOrigin;
use fcb_core::{Real, UnitSchema};
use fcb_mesh::MeshFormat;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Kinematic viscosity used when the material gives none, m²/s.
pub const DEFAULT_KINEMATIC_VISCOSITY: Real = 1e-3;

/// Which solver stack the case is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverTarget {
    #[default]
    OpenFoam,
    Fenics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    pub file: PathBuf,
    /// Needed for Fluent meshes; otherwise taken from the extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<MeshFormat>,
    #[serde(default)]
    pub unit_schema: UnitSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSettings {
    #[serde(default = "default_material_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinematic_viscosity: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_viscosity: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_heat: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductivity: Option<Real>,
}

fn default_material_name() -> String {
    "water".to_string()
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            name: default_material_name(),
            kinematic_viscosity: None,
            dynamic_viscosity: None,
            density: None,
            specific_heat: None,
            conductivity: None,
        }
    }
}

impl MaterialSettings {
    /// Kinematic viscosity, m²/s.
    ///
    /// An explicit value wins; otherwise it is derived from dynamic
    /// viscosity and a positive density. Anything else falls back to
    /// [`DEFAULT_KINEMATIC_VISCOSITY`].
    pub fn kinematic_viscosity(&self) -> Real {
        if let Some(nu) = self.kinematic_viscosity {
            return nu;
        }
        match (self.dynamic_viscosity, self.density) {
            (Some(mu), Some(rho)) if rho > 0.0 => mu / rho,
            (Some(_), _) => {
                tracing::warn!(
                    material = %self.name,
                    "density missing or zero, default kinematic viscosity used"
                );
                DEFAULT_KINEMATIC_VISCOSITY
            }
            (None, _) => DEFAULT_KINEMATIC_VISCOSITY,
        }
    }
}

/// Time control of a transient run; absent for steady cases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransientSettings {
    #[serde(default)]
    pub start_time: Real,
    pub end_time: Real,
    pub time_step: Real,
    pub write_interval: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialValues {
    #[serde(default)]
    pub pressure: Real,
    /// Non-zero: an all-zero field is reported converged on the first
    /// iteration by some solvers.
    #[serde(default = "default_velocity")]
    pub velocity: Vec<Real>,
    #[serde(default = "default_temperature")]
    pub temperature: Real,
}

fn default_velocity() -> Vec<Real> {
    vec![0.0, 0.0, 0.001]
}

fn default_temperature() -> Real {
    300.0
}

impl Default for InitialValues {
    fn default() -> Self {
        Self {
            pressure: 0.0,
            velocity: default_velocity(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSettings {
    pub case_name: String,
    pub working_dir: PathBuf,
    #[serde(default)]
    pub solver: SolverTarget,
    pub solver_name: String,
    /// How the case directory is populated; defaults to from scratch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<CaseOrigin>,
    /// Where an existing case directory is moved instead of deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshSettings>,
    #[serde(default)]
    pub physics: PhysicsSettings,
    #[serde(default)]
    pub material: MaterialSettings,
    #[serde(default)]
    pub boundaries: Vec<BoundaryDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient: Option<TransientSettings>,
    #[serde(default)]
    pub initial_values: InitialValues,
    /// MPI ranks for the generated run script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<u32>,
    #[serde(default)]
    pub potential_foam: bool,
}

impl CaseSettings {
    pub fn new(
        case_name: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        solver_name: impl Into<String>,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            working_dir: working_dir.into(),
            solver: SolverTarget::OpenFoam,
            solver_name: solver_name.into(),
            creation: None,
            backup_dir: None,
            mesh: None,
            physics: PhysicsSettings::default(),
            material: MaterialSettings::default(),
            boundaries: Vec::new(),
            transient: None,
            initial_values: InitialValues::default(),
            parallel: None,
            potential_foam: false,
        }
    }

    pub fn case_dir(&self) -> PathBuf {
        self.working_dir.join(&self.case_name)
    }

    pub fn origin(&self) -> CaseOrigin {
        self.creation
            .clone()
            .unwrap_or_else(|| CaseOrigin::FromScratch {
                solver: self.solver_name.clone(),
            })
    }

    /// Physics switches with the material's viscosity filled in.
    pub fn effective_physics(&self) -> PhysicsSettings {
        PhysicsSettings {
            kinematic_viscosity: self.material.kinematic_viscosity(),
            ..self.physics.clone()
        }
    }

    pub fn boundary_names(&self) -> Vec<String> {
        self.boundaries.iter().map(|b| b.name.clone()).collect()
    }

    /// Resolve relative paths against `base`, normally the directory of
    /// the settings file.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.working_dir);
        if let Some(mesh) = self.mesh.as_mut() {
            resolve(&mut mesh.file);
        }
        if let Some(backup) = self.backup_dir.as_mut() {
            resolve(backup);
        }
        if let Some(CaseOrigin::FromExisting { source }) = self.creation.as_mut() {
            resolve(source);
        }
    }
}

fn positive(value: Real, what: &str) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{what} must be a positive number, got {value}"
        )))
    }
}

/// Validate settings before anything is written.
pub fn validate_settings(settings: &CaseSettings) -> AppResult<()> {
    let name = settings.case_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Case name must not be empty".to_string()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(AppError::Validation(format!(
            "Case name '{}' must be a plain directory name",
            settings.case_name
        )));
    }
    if settings.solver_name.trim().is_empty() {
        return Err(AppError::Validation("Solver name must not be empty".to_string()));
    }

    let mut seen = HashSet::new();
    for boundary in &settings.boundaries {
        if boundary.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Boundary names must not be empty".to_string(),
            ));
        }
        if !seen.insert(boundary.name.as_str()) {
            return Err(AppError::Validation(format!(
                "Duplicate boundary name: {}",
                boundary.name
            )));
        }
    }

    if let Some(CaseOrigin::FromTutorial { tutorial }) = &settings.creation {
        if tutorial.trim().is_empty() {
            return Err(AppError::Validation(
                "Tutorial path must not be empty".to_string(),
            ));
        }
    }

    if let Some(t) = &settings.transient {
        if !t.start_time.is_finite() || t.start_time < 0.0 {
            return Err(AppError::Validation(format!(
                "Start time must be non-negative, got {}",
                t.start_time
            )));
        }
        if !(t.end_time > t.start_time) {
            return Err(AppError::Validation(format!(
                "End time {} must be after start time {}",
                t.end_time, t.start_time
            )));
        }
        positive(t.time_step, "Time step")?;
        positive(t.write_interval, "Write interval")?;
    }

    if let Some(nu) = settings.material.kinematic_viscosity {
        positive(nu, "Kinematic viscosity")?;
    }
    if settings.parallel == Some(0) {
        return Err(AppError::Validation(
            "Parallel process count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Load settings from a YAML (or `.json`) file, resolve relative paths
/// against the file's directory and validate them.
pub fn load_settings(path: &Path) -> AppResult<CaseSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::SettingsFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let mut settings: CaseSettings = if is_json {
        serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings JSON: {}", e)))?
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings YAML: {}", e)))?
    };

    if let Some(base) = path.parent() {
        settings.resolve_paths(base);
    }
    validate_settings(&settings)?;
    Ok(settings)
}

/// Save settings as YAML.
pub fn save_settings(path: &Path, settings: &CaseSettings) -> AppResult<()> {
    let content = serde_yaml::to_string(settings)
        .map_err(|e| AppError::Settings(format!("Failed to serialize settings: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
