//! Integration tests for the OpenFOAM case writer pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use fcb_app::{
    BuildProgressEvent, BuildReport, BuildStage, CaseSettings, FoamCaseWriter, MeshSettings,
    Severity, TransientSettings, load_manifest,
};
use fcb_boundary::{BoundaryDescriptor, BoundaryType, BoundaryValue};
use fcb_case::{CaseLock, CaseOrigin};
use fcb_core::UnitSchema;
use fcb_dict::{FoamDict, Value};
use fcb_runtime::{FoamVersion, ProcessRunner, RuntimeEnvironment, RuntimeKind};

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn runtime(install: impl Into<PathBuf>) -> RuntimeEnvironment {
    RuntimeEnvironment::new(install, FoamVersion::new(5, 0), RuntimeKind::Posix)
}

fn cavity(dir: &Path) -> CaseSettings {
    let mut settings = CaseSettings::new("cavity", dir, "icoFoam");
    settings.boundaries = vec![
        BoundaryDescriptor::new(
            "movingWall",
            BoundaryType::Wall,
            "moving",
            BoundaryValue::Vector(vec![1.0, 0.0, 0.0]),
        ),
        BoundaryDescriptor::new("fixedWalls", BoundaryType::Wall, "fixed", BoundaryValue::default()),
        BoundaryDescriptor::new(
            "frontAndBack",
            BoundaryType::Interface,
            "empty",
            BoundaryValue::default(),
        ),
    ];
    settings.transient = Some(TransientSettings {
        start_time: 0.0,
        end_time: 0.5,
        time_step: 0.005,
        write_interval: 20.0,
    });
    settings.material.kinematic_viscosity = Some(0.01);
    settings
}

fn build(settings: &CaseSettings, env: &RuntimeEnvironment) -> (BuildReport, Vec<BuildProgressEvent>) {
    let runner = ProcessRunner::new(env);
    let mut events = Vec::new();
    let report = FoamCaseWriter::new(settings, &runner).write(Some(&mut |e| events.push(e)));
    (report, events)
}

fn word<'a>(doc: &'a FoamDict, path: &str) -> Option<&'a str> {
    doc.get(path).and_then(Value::as_word)
}

#[test]
fn scratch_case_is_complete() {
    let dir = workdir("fcb_app_writer_scratch");
    let settings = cavity(&dir);
    let (report, events) = build(&settings, &runtime("/opt/openfoam5"));

    assert!(report.success, "build failed: {:?}", report.messages);
    let stages: Vec<BuildStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            BuildStage::AcquiringLock,
            BuildStage::CreatingCase,
            BuildStage::ConvertingMesh,
            BuildStage::WritingProperties,
            BuildStage::WritingBoundaries,
            BuildStage::WritingControls,
            BuildStage::WritingRunScript,
            BuildStage::Completed,
        ]
    );
    assert!(events.windows(2).all(|w| w[0].elapsed_wall_s <= w[1].elapsed_wall_s));

    let case = settings.case_dir();
    let u = FoamDict::load(&case.join("0").join("U")).unwrap();
    assert_eq!(u.header.class, "volVectorField");
    assert_eq!(word(&u, "boundaryField/movingWall/type"), Some("movingWallVelocity"));
    assert_eq!(word(&u, "boundaryField/fixedWalls/type"), Some("noSlip"));
    assert_eq!(word(&u, "boundaryField/frontAndBack/type"), Some("empty"));
    assert_eq!(
        u.get("internalField").map(ToString::to_string).as_deref(),
        Some("uniform (0 0 0.001)")
    );

    let p = FoamDict::load(&case.join("0").join("p")).unwrap();
    assert_eq!(word(&p, "boundaryField/movingWall/type"), Some("zeroGradient"));

    let transport = FoamDict::load(&case.join("constant").join("transportProperties")).unwrap();
    match transport.get("nu") {
        Some(Value::Tuple(items)) => {
            assert_eq!(items.last().and_then(Value::as_number), Some(0.01));
        }
        other => panic!("unexpected nu entry: {other:?}"),
    }
    let turbulence = FoamDict::load(&case.join("constant").join("turbulenceProperties")).unwrap();
    assert_eq!(word(&turbulence, "simulationType"), Some("laminar"));

    let control = FoamDict::load(&case.join("system").join("controlDict")).unwrap();
    assert_eq!(word(&control, "application"), Some("icoFoam"));
    assert_eq!(control.get("endTime").and_then(Value::as_number), Some(0.5));
    assert_eq!(control.get("deltaT").and_then(Value::as_number), Some(0.005));
    assert_eq!(control.get("writeInterval").and_then(Value::as_number), Some(20.0));

    let allrun = fs::read_to_string(case.join("Allrun")).unwrap();
    assert!(allrun.contains("icoFoam 2>&1 | tee log.icoFoam"));
    assert!(!allrun.contains("polyMesh.org"));

    let manifest = load_manifest(&case).unwrap();
    assert!(manifest.success);
    assert!(manifest.matches(&settings));
    assert_eq!(manifest.messages, report.messages);

    assert!(!CaseLock::lock_path(&case).exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn ras_model_writes_turbulence_fields() {
    let dir = workdir("fcb_app_writer_ras");
    let mut settings = cavity(&dir);
    settings.solver_name = "simpleFoam".to_string();
    settings.transient = None;
    settings.physics.turbulence_model = "kEpsilon".to_string();
    let (report, _) = build(&settings, &runtime("/opt/openfoam5"));
    assert!(report.success, "build failed: {:?}", report.messages);

    let case = settings.case_dir();
    let turbulence = FoamDict::load(&case.join("constant").join("turbulenceProperties")).unwrap();
    assert_eq!(word(&turbulence, "simulationType"), Some("RAS"));
    assert_eq!(word(&turbulence, "RAS/RASModel"), Some("kEpsilon"));
    assert_eq!(
        turbulence.get("RAS/turbulence"),
        Some(&Value::boolean(true))
    );
    for field in ["k", "epsilon", "nut"] {
        assert!(case.join("0").join(field).is_file(), "missing 0/{field}");
    }
    let control = FoamDict::load(&case.join("system").join("controlDict")).unwrap();
    assert_eq!(word(&control, "application"), Some("simpleFoam"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unsupported_boundary_is_reported_not_fatal() {
    let dir = workdir("fcb_app_writer_unsupported");
    let mut settings = cavity(&dir);
    settings.boundaries.push(BoundaryDescriptor::new(
        "rough",
        BoundaryType::Wall,
        "rough",
        BoundaryValue::default(),
    ));
    let (report, _) = build(&settings, &runtime("/opt/openfoam5"));
    assert!(report.success);
    assert!(report.warnings().any(|m| m.text.contains("rough")));

    let u = FoamDict::load(&settings.case_dir().join("0").join("U")).unwrap();
    assert!(u.get("boundaryField/rough").is_none());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_template_fails_and_reports() {
    let dir = workdir("fcb_app_writer_missing_tutorial");
    let mut settings = cavity(&dir);
    settings.creation = Some(CaseOrigin::FromTutorial {
        tutorial: "incompressible/icoFoam/nowhere".to_string(),
    });
    let (report, events) = build(&settings, &runtime(dir.join("openfoam5")));

    assert!(!report.success);
    let last = report.messages.last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.text.contains("Template not found"));
    assert!(events.iter().all(|e| e.stage != BuildStage::Completed));
    assert!(!settings.case_dir().exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn concurrent_build_is_refused() {
    let dir = workdir("fcb_app_writer_locked");
    let settings = cavity(&dir);
    let _held = CaseLock::acquire(&settings.case_dir()).unwrap();
    let (report, _) = build(&settings, &runtime("/opt/openfoam5"));
    assert!(!report.success);
    assert!(report.errors().any(|m| m.text.contains("locked")));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_settings_fail_before_touching_disk() {
    let dir = workdir("fcb_app_writer_invalid");
    let mut settings = cavity(&dir);
    settings.case_name = String::new();
    let (report, events) = build(&settings, &runtime("/opt/openfoam5"));
    assert!(!report.success);
    assert!(events.is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[cfg(unix)]
mod with_mesh {
    use super::*;

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
3
(
    inlet_Faces
    {
        type            patch;
        nFaces          4;
        startFace       10;
    }
    outlet_Faces
    {
        type            patch;
        nFaces          4;
        startFace       14;
    }
    defaultFaces
    {
        type            empty;
        nFaces          8;
        startFace       18;
    }
)
EOF
}
transformPoints() {
    echo "$@" > transform.args
}
"#;

    fn has_bash() -> bool {
        Path::new("/bin/bash").exists() || Path::new("/usr/bin/bash").exists()
    }

    #[test]
    fn converted_mesh_is_moved_and_linked() {
        if !has_bash() {
            return;
        }
        let dir = workdir("fcb_app_writer_mesh");
        let install = dir.join("openfoam5");
        fs::create_dir_all(install.join("etc")).unwrap();
        fs::write(install.join("etc").join("bashrc"), BASHRC).unwrap();
        let mesh = dir.join("pipe.unv");
        fs::write(&mesh, "    -1\n").unwrap();

        let mut settings = CaseSettings::new("pipe", &dir, "simpleFoam");
        settings.mesh = Some(MeshSettings {
            file: mesh,
            format: None,
            unit_schema: UnitSchema::Standard,
        });
        settings.boundaries = vec![
            BoundaryDescriptor::new(
                "inlet",
                BoundaryType::Inlet,
                "uniformVelocity",
                BoundaryValue::Vector(vec![1.0, 0.0, 0.0]),
            ),
            BoundaryDescriptor::new(
                "outlet",
                BoundaryType::Outlet,
                "staticPressure",
                BoundaryValue::Scalar(0.0),
            ),
        ];

        let (report, _) = build(&settings, &runtime(&install));
        assert!(report.success, "build failed: {:?}", report.messages);

        let case = settings.case_dir();
        assert!(case.join("constant").join("polyMesh.org").join("boundary").is_file());
        assert!(!case.join("constant").join("polyMesh").exists());
        assert!(case.join("transform.args").is_file());

        let u = FoamDict::load(&case.join("0").join("U")).unwrap();
        assert_eq!(word(&u, "boundaryField/inlet/type"), Some("fixedValue"));
        assert_eq!(word(&u, "boundaryField/defaultFaces/type"), Some("noSlip"));
        let p = FoamDict::load(&case.join("0").join("p")).unwrap();
        assert_eq!(word(&p, "boundaryField/outlet/type"), Some("fixedValue"));

        let allrun = fs::read_to_string(case.join("Allrun")).unwrap();
        assert!(allrun.contains("polyMesh.org"));
        assert!(report.messages.iter().any(|m| m.text.contains("3 patches")));
        let _ = fs::remove_dir_all(&dir);
    }
}
