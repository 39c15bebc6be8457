//! Fix-ups on `constant/polyMesh/boundary` after conversion.

use std::path::{Path, PathBuf};

use fcb_dict::{BoundaryFile, Value, read_boundary_file, write_boundary_file};

use crate::MeshResult;

/// Patch the converters put every unassigned exterior face into.
pub const DEFAULT_FACES: &str = "defaultFaces";

pub fn boundary_file_path(case: &Path) -> PathBuf {
    case.join("constant").join("polyMesh").join("boundary")
}

fn load(case: &Path) -> MeshResult<BoundaryFile> {
    Ok(read_boundary_file(&boundary_file_path(case))?)
}

fn store(case: &Path, file: &BoundaryFile) -> MeshResult<()> {
    Ok(write_boundary_file(&boundary_file_path(case), file)?)
}

pub fn list_patch_names(case: &Path) -> MeshResult<Vec<String>> {
    Ok(load(case)?.patch_names().map(str::to_string).collect())
}

/// Sets the `type` of one patch. A missing patch is logged and the file
/// is left untouched; returns whether anything changed.
pub fn change_patch_type(case: &Path, patch: &str, patch_type: &str) -> MeshResult<bool> {
    let mut file = load(case)?;
    let Some(dict) = file.patch_mut(patch) else {
        tracing::warn!(patch, "boundary patch not found, type not changed");
        return Ok(false);
    };
    if dict.get("type").and_then(Value::as_word) == Some(patch_type) {
        return Ok(false);
    }
    dict.insert("type", Value::word(patch_type));
    if patch_type == "wall" {
        dict.insert("inGroups", Value::words("1(wall)"));
    } else {
        dict.remove("inGroups");
    }
    store(case, &file)?;
    tracing::debug!(patch, patch_type, "changed boundary patch type");
    Ok(true)
}

/// Renames a patch. Returns false (with a warning) if `from` is absent or
/// `to` already exists.
pub fn rename_patch(case: &Path, from: &str, to: &str) -> MeshResult<bool> {
    let mut file = load(case)?;
    if file.patch(to).is_some() {
        tracing::warn!(from, to, "target patch name already exists, not renamed");
        return Ok(false);
    }
    let Some(entry) = file.patches.iter_mut().find(|(n, _)| n == from) else {
        tracing::warn!(patch = from, "boundary patch not found, not renamed");
        return Ok(false);
    };
    entry.0 = to.to_string();
    store(case, &file)?;
    tracing::debug!(from, to, "renamed boundary patch");
    Ok(true)
}
