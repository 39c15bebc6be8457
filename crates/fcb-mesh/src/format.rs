use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Mesh file formats with an OpenFOAM converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeshFormat {
    Unv,
    GmshMsh,
    /// Fluent also writes `.msh`; it is never picked from the extension.
    FluentMsh,
}

impl MeshFormat {
    /// `.unv` is I-DEAS universal, `.msh` is taken to be Gmsh.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "unv" => Some(Self::Unv),
            "msh" => Some(Self::GmshMsh),
            _ => None,
        }
    }

    pub fn converter(&self) -> &'static str {
        match self {
            Self::Unv => "ideasUnvToFoam",
            Self::GmshMsh => "gmshToFoam",
            Self::FluentMsh => "fluentMeshToFoam",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unv => "UNV",
            Self::GmshMsh => "Gmsh MSH",
            Self::FluentMsh => "Fluent MSH",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_converter_by_extension() {
        let unv = MeshFormat::from_path(Path::new("case/pipe.UNV")).unwrap();
        assert_eq!(unv.converter(), "ideasUnvToFoam");
        let msh = MeshFormat::from_path(Path::new("pipe.msh")).unwrap();
        assert_eq!(msh, MeshFormat::GmshMsh);
        assert_eq!(MeshFormat::FluentMsh.converter(), "fluentMeshToFoam");
        assert!(MeshFormat::from_path(Path::new("pipe.stl")).is_none());
        assert!(MeshFormat::from_path(Path::new("pipe")).is_none());
    }
}
