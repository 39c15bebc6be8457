//! Boundary group names written by the CAD mesher.
//!
//! Exported groups carry a `_Faces` (3D) or `_Edges` (2D) suffix that the
//! user never sees; patches must be named after the boundary itself.

use std::fs;
use std::path::Path;

use crate::MeshResult;

pub const GENERATED_SUFFIXES: [&str; 2] = ["_Faces", "_Edges"];

/// `inlet_Faces` -> `inlet`.
pub fn strip_generated_suffix(name: &str) -> &str {
    GENERATED_SUFFIXES
        .iter()
        .find_map(|s| name.strip_suffix(s))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(name)
}

/// Removes the generated suffixes from a UNV file in place and returns
/// how many were removed.
///
/// The original is copied to `<file>.bak` first and the backup is removed
/// once the rewrite succeeded.
pub fn normalize_unv_boundary_names(file: &Path) -> MeshResult<usize> {
    let mut backup = file.as_os_str().to_owned();
    backup.push(".bak");
    let backup = Path::new(&backup).to_path_buf();
    fs::copy(file, &backup)?;

    let text = fs::read_to_string(&backup)?;
    let mut count = 0;
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let mut line = line.to_string();
        for suffix in GENERATED_SUFFIXES {
            count += line.matches(suffix).count();
            line = line.replace(suffix, "");
        }
        out.push_str(&line);
    }
    fs::write(file, out)?;
    fs::remove_file(&backup)?;
    tracing::debug!(file = %file.display(), count, "normalized boundary names");
    Ok(count)
}
