//! Gmsh -> DOLFIN XML for the FEniCS solver.

use std::path::{Path, PathBuf};

use fcb_runtime::Invocation;
use fcb_runtime::process::run_invocation;

use crate::{MeshError, MeshResult};

pub const DOLFIN_CONVERT: &str = "dolfin-convert";

/// Runs `dolfin-convert mesh.msh mesh.xml` next to the input and returns
/// the XML path. The tool is expected on `PATH` of the host.
pub fn dolfin_convert(msh: &Path) -> MeshResult<PathBuf> {
    dolfin_convert_with(DOLFIN_CONVERT, msh)
}

pub(crate) fn dolfin_convert_with(tool: &str, msh: &Path) -> MeshResult<PathBuf> {
    if !msh.is_file() {
        return Err(MeshError::MeshNotFound {
            path: msh.to_path_buf(),
        });
    }
    let xml = msh.with_extension("xml");
    let mut inv = Invocation::new(tool)
        .arg(msh.to_string_lossy())
        .arg(xml.to_string_lossy());
    if let Some(dir) = msh.parent().filter(|d| !d.as_os_str().is_empty()) {
        inv = inv.cwd(dir);
    }
    let outcome = run_invocation(&inv)?;
    if !outcome.success() {
        return Err(MeshError::Conversion {
            tool: tool.to_string(),
            exit_code: outcome.exit_code,
            stderr: outcome.stderr,
        });
    }
    let facets = facet_region_path(&xml);
    if !facets.exists() {
        tracing::warn!(file = %facets.display(), "mesh boundary file not generated");
    }
    Ok(xml)
}

/// `mesh.xml` -> `mesh_facet_region.xml`.
pub fn facet_region_path(xml: &Path) -> PathBuf {
    let stem = xml
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    xml.with_file_name(format!("{stem}_facet_region.xml"))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn failing_tool_is_conversion_error() {
        let dir = std::env::temp_dir().join("fcb_mesh_dolfin");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let msh = dir.join("pipe.msh");
        fs::write(&msh, "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n").unwrap();

        let xml = dolfin_convert_with("true", &msh).unwrap();
        assert_eq!(xml, dir.join("pipe.xml"));
        assert_eq!(facet_region_path(&xml), dir.join("pipe_facet_region.xml"));

        match dolfin_convert_with("false", &msh) {
            Err(MeshError::Conversion { tool, exit_code, .. }) => {
                assert_eq!(tool, "false");
                assert_eq!(exit_code, 1);
            }
            other => panic!("expected conversion error, got {other:?}"),
        }
        assert!(matches!(
            dolfin_convert_with("true", &dir.join("missing.msh")),
            Err(MeshError::MeshNotFound { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
