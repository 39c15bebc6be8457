#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fcb_core::UnitSchema;
use fcb_dict::{Value, read_boundary_file};
use fcb_mesh::{
    DEFAULT_FACES, MeshConversion, MeshError, boundary_file_path, convert_mesh,
};
use fcb_runtime::{FoamVersion, ProcessRunner, RuntimeEnvironment, RuntimeKind};

fn has_bash() -> bool {
    Path::new("/bin/bash").exists() || Path::new("/usr/bin/bash").exists()
}

/// Stand-in converters defined as shell functions in the fake bashrc.
const BASHRC: &str = r#"
ideasUnvToFoam() {
    mkdir -p constant/polyMesh
    cat > constant/polyMesh/boundary <<'EOF'
FoamFile
{
    version     2.0;
    format      ascii;
    class       polyBoundaryMesh;
    location    "constant/polyMesh";
    object      boundary;
}
2
(
    inlet_Faces
    {
        type            patch;
        nFaces          4;
        startFace       10;
    }
    defaultFaces
    {
        type            empty;
        nFaces          8;
        startFace       14;
    }
)
EOF
    echo "$1" > converted.from
}
gmshToFoam() {
    echo "cannot read mesh" >&2
    return 3
}
transformPoints() {
    echo "$@" > transform.args
}
"#;

fn setup(name: &str) -> (PathBuf, RuntimeEnvironment) {
    let root = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&root);
    let install = root.join("openfoam5");
    fs::create_dir_all(install.join("etc")).unwrap();
    fs::write(install.join("etc").join("bashrc"), BASHRC).unwrap();
    fs::create_dir_all(root.join("case")).unwrap();
    let env = RuntimeEnvironment::new(&install, FoamVersion::new(5, 0), RuntimeKind::Posix);
    (root, env)
}

fn read_eventually(path: &Path) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(text) = fs::read_to_string(path) {
            if !text.is_empty() || Instant::now() > deadline {
                return text;
            }
        } else if Instant::now() > deadline {
            return String::new();
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn unv_conversion_fixes_boundary_and_scales() {
    if !has_bash() {
        return;
    }
    let (root, env) = setup("fcb_mesh_convert_unv");
    let case = root.join("case");
    let mesh = root.join("pipe.unv");
    fs::write(&mesh, "    -1\n").unwrap();

    let request = MeshConversion::new(&mesh)
        .with_unit_schema(UnitSchema::Standard)
        .with_boundaries(["inlet", "outlet"]);
    let converted = convert_mesh(&ProcessRunner::new(&env), &case, &request).unwrap();

    assert_eq!(converted.scale, 0.001);
    assert_eq!(converted.patches, vec!["inlet", DEFAULT_FACES]);
    assert_eq!(
        read_eventually(&case.join("converted.from")).trim(),
        mesh.to_string_lossy()
    );
    assert_eq!(
        read_eventually(&case.join("transform.args")).trim(),
        "-scale (0.001 0.001 0.001)"
    );

    let boundary = read_boundary_file(&boundary_file_path(&case)).unwrap();
    let wall = boundary.patch(DEFAULT_FACES).unwrap();
    assert_eq!(wall.get("type").and_then(Value::as_word), Some("wall"));
    assert!(boundary.patch("inlet").is_some());
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn metre_schema_skips_scaling() {
    if !has_bash() {
        return;
    }
    let (root, env) = setup("fcb_mesh_convert_mks");
    let case = root.join("case");
    let mesh = root.join("pipe.unv");
    fs::write(&mesh, "    -1\n").unwrap();
    let request = MeshConversion::new(&mesh).with_unit_schema(UnitSchema::Mks);
    let converted = convert_mesh(&ProcessRunner::new(&env), &case, &request).unwrap();
    assert_eq!(converted.scale, 1.0);
    // no boundary name given, so the generated name stays
    assert_eq!(converted.patches[0], "inlet_Faces");
    assert!(!case.join("transform.args").exists());
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn converter_failure_aborts() {
    if !has_bash() {
        return;
    }
    let (root, env) = setup("fcb_mesh_convert_fail");
    let case = root.join("case");
    let mesh = root.join("pipe.msh");
    fs::write(&mesh, "$MeshFormat\n").unwrap();
    let err = convert_mesh(&ProcessRunner::new(&env), &case, &MeshConversion::new(&mesh))
        .unwrap_err();
    match err {
        MeshError::Conversion {
            tool,
            exit_code,
            stderr,
        } => {
            assert_eq!(tool, "gmshToFoam");
            assert_eq!(exit_code, 3);
            assert!(stderr.contains("cannot read mesh"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!case.join("transform.args").exists());
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_mesh_file() {
    let env = RuntimeEnvironment::new("/opt/openfoam5", FoamVersion::default(), RuntimeKind::Posix);
    let err = convert_mesh(
        &ProcessRunner::new(&env),
        Path::new("/tmp"),
        &MeshConversion::new("/definitely/missing/mesh.unv"),
    )
    .unwrap_err();
    assert!(matches!(err, MeshError::MeshNotFound { .. }));
}
