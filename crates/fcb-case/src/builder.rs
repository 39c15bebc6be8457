//! Case directory creation and clean-up.

use std::fs;
use std::path::{Path, PathBuf};

use fcb_dict::FoamDict;
use serde::{Deserialize, Serialize};

use crate::fsutil::{copy_dir_all, move_dir, remove_any};
use crate::templates;
use crate::{CaseError, CaseResult};

/// How a case directory was (or will be) created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CaseOrigin {
    FromScratch { solver: String },
    /// Path relative to the installation's `tutorials/` directory.
    FromTutorial { tutorial: String },
    FromExisting { source: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDirectory {
    pub root: PathBuf,
    pub origin: CaseOrigin,
}

impl CaseDirectory {
    pub fn system(&self) -> PathBuf {
        self.root.join("system")
    }

    pub fn constant(&self) -> PathBuf {
        self.root.join("constant")
    }

    pub fn zero(&self) -> PathBuf {
        self.root.join("0")
    }
}

enum Populate {
    Scratch(String),
    Clone(PathBuf),
}

/// Files and directories removed from a cloned case.
const CLONE_LEFTOVERS: &[&str] = &[
    "constant/polyMesh",
    "constant/polyMesh.org",
    "polyMesh.org",
    "system/blockMeshDict",
    "Allrun",
    "Allclean",
    "Allrun.sh",
    "Allclean.sh",
];

/// Create `case_dir` from `origin`.
///
/// Any existing directory at `case_dir` is removed first, or moved to
/// `backup` when one is given. `foam_dir` is the installation root used to
/// resolve tutorials.
pub fn create_case(
    case_dir: &Path,
    origin: CaseOrigin,
    foam_dir: Option<&Path>,
    backup: Option<&Path>,
) -> CaseResult<CaseDirectory> {
    let plan = match &origin {
        CaseOrigin::FromScratch { solver } => Populate::Scratch(solver.clone()),
        CaseOrigin::FromTutorial { tutorial } => {
            let root = foam_dir.ok_or_else(|| CaseError::NoInstallation {
                tutorial: tutorial.clone(),
            })?;
            Populate::Clone(resolve_source(&root.join("tutorials").join(tutorial), case_dir)?)
        }
        CaseOrigin::FromExisting { source } => Populate::Clone(resolve_source(source, case_dir)?),
    };

    reset_dir(case_dir, backup)?;

    match plan {
        Populate::Scratch(solver) => populate_scratch(case_dir, &solver)?,
        Populate::Clone(source) => {
            copy_case_content(&source, case_dir)?;
            clean_cloned_case(case_dir)?;
        }
    }

    tracing::info!(case = %case_dir.display(), origin = ?origin, "case directory created");
    Ok(CaseDirectory {
        root: case_dir.to_path_buf(),
        origin,
    })
}

fn resolve_source(source: &Path, case_dir: &Path) -> CaseResult<PathBuf> {
    if !source.is_dir() {
        return Err(CaseError::TemplateNotFound {
            path: source.to_path_buf(),
        });
    }
    if let (Ok(a), Ok(b)) = (source.canonicalize(), case_dir.canonicalize()) {
        if a == b {
            return Err(CaseError::SourceIsTarget { path: a });
        }
        if a.starts_with(&b) {
            return Err(CaseError::SourceInsideTarget {
                path: a,
                case_dir: b,
            });
        }
    }
    Ok(source.to_path_buf())
}

fn reset_dir(case_dir: &Path, backup: Option<&Path>) -> CaseResult<()> {
    if case_dir.exists() {
        match backup {
            Some(backup) => {
                tracing::info!(
                    from = %case_dir.display(),
                    to = %backup.display(),
                    "backing up existing case"
                );
                move_dir(case_dir, backup)?;
            }
            None => fs::remove_dir_all(case_dir)?,
        }
    }
    fs::create_dir_all(case_dir)?;
    Ok(())
}

fn populate_scratch(case_dir: &Path, solver: &str) -> CaseResult<()> {
    for dir in ["system", "constant", "0"] {
        fs::create_dir_all(case_dir.join(dir))?;
    }
    templates::control_dict(solver).save_in_case(case_dir)?;
    templates::fv_schemes(solver).save_in_case(case_dir)?;
    templates::fv_solution(solver).save_in_case(case_dir)?;
    Ok(())
}

fn copy_case_content(source: &Path, case_dir: &Path) -> CaseResult<()> {
    for dir in ["constant", "system"] {
        let from = source.join(dir);
        if from.is_dir() {
            copy_dir_all(&from, &case_dir.join(dir))?;
        } else {
            tracing::warn!(dir, source = %source.display(), "source case has no such directory");
            fs::create_dir_all(case_dir.join(dir))?;
        }
    }

    let zero = source.join("0");
    let zero_orig = source.join("0.orig");
    if zero.is_dir() {
        copy_dir_all(&zero, &case_dir.join("0"))?;
    } else if zero_orig.is_dir() {
        tracing::debug!("copying 0.orig as initial time directory");
        copy_dir_all(&zero_orig, &case_dir.join("0"))?;
    } else {
        fs::create_dir_all(case_dir.join("0"))?;
    }
    Ok(())
}

/// Strip the mesh, mesh-generation inputs, run scripts, and `functions`.
fn clean_cloned_case(case_dir: &Path) -> CaseResult<()> {
    for leftover in CLONE_LEFTOVERS {
        if remove_any(&case_dir.join(leftover))? {
            tracing::debug!(path = leftover, "removed from cloned case");
        }
    }

    let control = case_dir.join("system").join("controlDict");
    if control.is_file() {
        let mut doc = FoamDict::load(&control)?;
        if doc.body.remove("functions").is_some() {
            tracing::debug!("removed functions from controlDict");
            doc.save(&control)?;
        }
    }
    Ok(())
}

/// Move `constant/polyMesh` to `constant/polyMesh.org`, replacing any
/// previous copy.
pub fn move_poly_mesh(case_dir: &Path) -> CaseResult<()> {
    let mesh = case_dir.join("constant").join("polyMesh");
    if !mesh.is_dir() {
        return Err(CaseError::TemplateNotFound { path: mesh });
    }
    move_dir(&mesh, &case_dir.join("constant").join("polyMesh.org"))?;
    Ok(())
}

/// Names of the field files in `0/`, sorted.
pub fn list_field_variables(case_dir: &Path) -> CaseResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(case_dir.join("0"))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
