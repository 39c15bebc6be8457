use std::fs;

use fcb_dict::{
    BoundaryFile, DictError, Dictionary, FoamDict, Header, Value, read_boundary_file,
    write_boundary_file,
};

const BOUNDARY: &str = r#"/*--------------------------------*- C++ -*----------------------------------*\
  =========                 |
  \\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox
\*---------------------------------------------------------------------------*/
FoamFile
{
    version     2.0;
    format      ascii;
    class       polyBoundaryMesh;
    location    "constant/polyMesh";
    object      boundary;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

3
(
    inlet_Faces
    {
        type            patch;
        nFaces          20;
        startFace       760;
    }
    outlet_Faces
    {
        type            patch;
        nFaces          20;
        startFace       780;
    }
    defaultFaces
    {
        type            empty;
        inGroups        1(empty);
        nFaces          800;
        startFace       800;
    }
)
"#;

#[test]
fn boundary_file_parses_patch_list() {
    let file = BoundaryFile::parse(BOUNDARY).unwrap();
    assert_eq!(file.header.class, "polyBoundaryMesh");
    assert_eq!(
        file.patch_names().collect::<Vec<_>>(),
        vec!["inlet_Faces", "outlet_Faces", "defaultFaces"]
    );
    let faces = file.patch("defaultFaces").unwrap();
    assert_eq!(faces.get("type"), Some(&Value::word("empty")));
    assert_eq!(faces.get("nFaces"), Some(&Value::number(800.0)));
}

#[test]
fn boundary_file_round_trips_through_disk() {
    let dir = std::env::temp_dir().join("fcb_dict_boundary_roundtrip");
    let _ = fs::remove_dir_all(&dir);
    let path = dir.join("constant/polyMesh/boundary");

    let mut file = BoundaryFile::parse(BOUNDARY).unwrap();
    file.patch_mut("defaultFaces")
        .unwrap()
        .insert("type", "wall");
    write_boundary_file(&path, &file).unwrap();

    let back = read_boundary_file(&path).unwrap();
    assert_eq!(back, file);
    assert_eq!(
        back.patch("defaultFaces").unwrap().get("type"),
        Some(&Value::word("wall"))
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn load_uses_file_name_as_object() {
    let dir = std::env::temp_dir().join("fcb_dict_load_object");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("transportProperties");
    fs::write(&path, "transportModel Newtonian;\nnu 1e-05;\n").unwrap();

    let d = FoamDict::load(&path).unwrap();
    assert_eq!(d.header.object, "transportProperties");
    assert_eq!(d.get("nu"), Some(&Value::number(1e-5)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn format_error_names_the_file() {
    let dir = std::env::temp_dir().join("fcb_dict_format_error");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("fvSchemes");
    fs::write(&path, "ddtSchemes\n{\n    default Euler;\n").unwrap();

    match FoamDict::load(&path) {
        Err(DictError::Format { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected format error, got {other:?}"),
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn save_then_load_preserves_content() {
    let dir = std::env::temp_dir().join("fcb_dict_save_load");
    let _ = fs::remove_dir_all(&dir);

    let mut doc = FoamDict::new(Header::new("fvSolution").with_location("system").unwrap());
    doc.set("solvers/p/solver", "PCG").unwrap();
    doc.set("solvers/p/tolerance", 1e-6).unwrap();
    doc.set("PISO/nCorrectors", 2.0).unwrap();
    doc.set("\"(U|k)\"/solver", "smoothSolver").unwrap();
    let path = doc.save_in_case(&dir).unwrap();
    assert_eq!(path, dir.join("system/fvSolution"));

    let back = FoamDict::load(&path).unwrap();
    assert_eq!(back, doc);

    let mut body = Dictionary::new();
    body.set_path("PISO/nCorrectors", 2.0).unwrap();
    let mut again = back.clone();
    assert!(!again.update(&body, false).changed());

    let _ = fs::remove_dir_all(&dir);
}
