//! External mesh -> `constant/polyMesh`.

use std::path::{Path, PathBuf};

use fcb_core::{Real, Tolerances, UnitSchema, nearly_equal};
use fcb_runtime::{FoamCommand, ProcessRunner};
use serde::Serialize;

use crate::boundary::{DEFAULT_FACES, change_patch_type, list_patch_names, rename_patch};
use crate::names::strip_generated_suffix;
use crate::{MeshError, MeshFormat, MeshResult};

/// One conversion request.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshConversion {
    pub mesh_file: PathBuf,
    /// Overrides the extension-based choice (needed for Fluent `.msh`).
    pub format: Option<MeshFormat>,
    pub unit_schema: UnitSchema,
    /// User-facing boundary names that generated patch names are matched to.
    pub boundary_names: Vec<String>,
}

impl MeshConversion {
    pub fn new(mesh_file: impl Into<PathBuf>) -> Self {
        Self {
            mesh_file: mesh_file.into(),
            format: None,
            unit_schema: UnitSchema::default(),
            boundary_names: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: MeshFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_unit_schema(mut self, schema: UnitSchema) -> Self {
        self.unit_schema = schema;
        self
    }

    pub fn with_boundaries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boundary_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn resolved_format(&self) -> MeshResult<MeshFormat> {
        self.format
            .or_else(|| MeshFormat::from_path(&self.mesh_file))
            .ok_or_else(|| MeshError::UnsupportedFormat {
                path: self.mesh_file.clone(),
            })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConvertedMesh {
    pub poly_mesh_dir: PathBuf,
    pub format: MeshFormat,
    pub scale: Real,
    pub patches: Vec<String>,
}

fn scale_command(scale: Real) -> FoamCommand {
    FoamCommand::new("transformPoints")
        .arg("-scale")
        .arg(format!("({scale} {scale} {scale})"))
        .logged()
}

fn run_step(runner: &ProcessRunner<'_>, cmd: FoamCommand) -> MeshResult<()> {
    let outcome = runner.run(&cmd)?;
    if outcome.success() {
        Ok(())
    } else {
        Err(MeshError::Conversion {
            tool: cmd.app_name().to_string(),
            exit_code: outcome.exit_code,
            stderr: outcome.stderr,
        })
    }
}

/// Converts `request.mesh_file` into `<case>/constant/polyMesh`.
///
/// After the converter runs, generated `_Faces`/`_Edges` patch names are
/// renamed to the matching boundary name, `defaultFaces` becomes a wall and
/// the points are scaled into metres unless the scale is already 1.
pub fn convert_mesh(
    runner: &ProcessRunner<'_>,
    case: &Path,
    request: &MeshConversion,
) -> MeshResult<ConvertedMesh> {
    let format = request.resolved_format()?;
    if !request.mesh_file.is_file() {
        return Err(MeshError::MeshNotFound {
            path: request.mesh_file.clone(),
        });
    }
    let mesh_path = runner.environment().translate_path(&request.mesh_file);
    tracing::info!(%format, mesh = %request.mesh_file.display(), "converting mesh");
    run_step(
        runner,
        FoamCommand::new(format.converter())
            .arg(mesh_path)
            .cwd(case)
            .logged(),
    )?;

    let mut patches = list_patch_names(case)?;
    for patch in patches.iter_mut() {
        let stem = strip_generated_suffix(patch).to_string();
        if stem != *patch
            && request.boundary_names.contains(&stem)
            && rename_patch(case, patch, &stem)?
        {
            *patch = stem;
        }
    }
    change_patch_type(case, DEFAULT_FACES, "wall")?;

    let scale = request.unit_schema.mesh_scale();
    if !nearly_equal(scale, 1.0, Tolerances::default()) {
        tracing::info!(scale, "scaling mesh points");
        run_step(runner, scale_command(scale).cwd(case))?;
    }

    Ok(ConvertedMesh {
        poly_mesh_dir: case.join("constant").join("polyMesh"),
        format,
        scale,
        patches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetre_mesh_scales_by_one_thousandth() {
        let cmd = scale_command(UnitSchema::Standard.mesh_scale());
        assert_eq!(cmd.args, vec!["-scale", "(0.001 0.001 0.001)"]);
        assert_eq!(cmd.log_file.as_deref(), Some("log.transformPoints"));
    }

    #[test]
    fn format_resolution() {
        let req = MeshConversion::new("a.msh");
        assert_eq!(req.resolved_format().unwrap(), MeshFormat::GmshMsh);
        let req = req.with_format(MeshFormat::FluentMsh);
        assert_eq!(req.resolved_format().unwrap(), MeshFormat::FluentMsh);
        assert!(matches!(
            MeshConversion::new("a.step").resolved_format(),
            Err(MeshError::UnsupportedFormat { .. })
        ));
    }
}
