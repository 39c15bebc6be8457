//! `Allrun` script generation.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use fcb_dict::{FoamDict, Header, Value};

use crate::CaseResult;

#[derive(Debug, Clone, PartialEq)]
pub struct RunScript {
    pub solver: String,
    /// Number of MPI ranks; `None` or `Some(1)` runs serially.
    pub parallel: Option<u32>,
    /// Initialise the flow field with `potentialFoam` first.
    pub potential_foam: bool,
    /// Link `constant/polyMesh` from `constant/polyMesh.org` before running.
    pub link_mesh: bool,
}

impl RunScript {
    pub fn serial(solver: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            parallel: None,
            potential_foam: false,
            link_mesh: true,
        }
    }

    fn ranks(&self) -> Option<u32> {
        self.parallel.filter(|n| *n > 1)
    }

    pub fn render(&self) -> String {
        let mut s = String::from("#!/bin/sh\ncd \"${0%/*}\" || exit 1\n\n");

        if self.link_mesh {
            s.push_str("mkdir -p constant/polyMesh\n");
            s.push_str("for f in constant/polyMesh.org/*; do\n");
            s.push_str("    ln -sf \"../polyMesh.org/${f##*/}\" constant/polyMesh/\n");
            s.push_str("done\n\n");
        }

        if self.potential_foam {
            s.push_str("potentialFoam -writep 2>&1 | tee log.potentialFoam\n");
        }

        match self.ranks() {
            Some(n) => {
                s.push_str("decomposePar -force 2>&1 | tee log.decomposePar\n");
                let _ = writeln!(
                    s,
                    "mpirun -np {n} {} -parallel 2>&1 | tee log.{}",
                    self.solver, self.solver
                );
                s.push_str("reconstructPar 2>&1 | tee log.reconstructPar\n");
            }
            None => {
                let _ = writeln!(s, "{} 2>&1 | tee log.{}", self.solver, self.solver);
            }
        }
        s
    }
}

/// Write `<case>/Allrun` (mode 0755 on unix). Parallel runs also get a
/// `system/decomposeParDict`.
pub fn write_run_script(case_dir: &Path, script: &RunScript) -> CaseResult<PathBuf> {
    let path = case_dir.join("Allrun");
    fs::write(&path, script.render())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    if let Some(n) = script.ranks() {
        let mut decompose = FoamDict::new(Header::new("decomposeParDict").with_location("system")?);
        decompose.body.insert("numberOfSubdomains", Value::number(f64::from(n)));
        decompose.body.insert("method", Value::word("scotch"));
        decompose.save_in_case(case_dir)?;
    }

    tracing::debug!(script = %path.display(), solver = %script.solver, "run script written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_script() {
        let text = RunScript::serial("simpleFoam").render();
        assert!(text.contains("simpleFoam 2>&1 | tee log.simpleFoam"));
        assert!(!text.contains("mpirun"));
        assert!(text.contains("polyMesh.org"));
    }

    #[test]
    fn parallel_script() {
        let script = RunScript {
            parallel: Some(4),
            potential_foam: true,
            ..RunScript::serial("pimpleFoam")
        };
        let text = script.render();
        assert!(text.contains("decomposePar"));
        assert!(text.contains("mpirun -np 4 pimpleFoam -parallel"));
        assert!(text.find("potentialFoam").unwrap() < text.find("mpirun").unwrap());
    }

    #[test]
    fn single_rank_is_serial() {
        let script = RunScript {
            parallel: Some(1),
            ..RunScript::serial("icoFoam")
        };
        assert!(!script.render().contains("mpirun"));
    }
}
