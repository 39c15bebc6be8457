use fcb_boundary::{
    BoundaryDescriptor, BoundaryError, BoundaryType, BoundaryValue, FoamDialect, NumericalType,
    PhysicsSettings, ThermalSettings, TurbulenceSpec, translate_fenics, translate_foam,
};
use fcb_core::SpatialDim;

fn scalar(v: f64) -> BoundaryValue {
    BoundaryValue::Scalar(v)
}

fn sample() -> Vec<BoundaryDescriptor> {
    vec![
        BoundaryDescriptor::new("inlet", BoundaryType::Inlet, "uniformVelocity", scalar(1.5))
            .with_direction(vec![1.0, 0.0, 0.0]),
        BoundaryDescriptor::new("outlet", BoundaryType::Outlet, "staticPressure", scalar(0.0)),
        BoundaryDescriptor::new("walls", BoundaryType::Wall, "fixed", scalar(0.0)),
    ]
}

#[test]
fn ordinals_are_stable_across_runs() {
    let physics = PhysicsSettings::default();
    let a = translate_fenics(&sample(), &physics).unwrap();
    let b = translate_fenics(&sample(), &physics).unwrap();
    let ids = |t: &fcb_boundary::FenicsTranslation| {
        t.boundaries
            .iter()
            .map(|b| (b.name.clone(), b.boundary_id.get()))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&a), ids(&b));
    assert_eq!(
        ids(&a),
        vec![
            ("inlet".to_string(), 1),
            ("outlet".to_string(), 2),
            ("walls".to_string(), 3)
        ]
    );
}

#[test]
fn every_supported_pair_yields_one_flow_entry() {
    let supported = [
        (BoundaryType::Wall, "fixed", scalar(0.0)),
        (BoundaryType::Wall, "moving", BoundaryValue::Vector(vec![1.0, 0.0, 0.0])),
        (BoundaryType::Inlet, "uniformVelocity", scalar(2.0)),
        (BoundaryType::Inlet, "totalPressure", scalar(10.0)),
        (BoundaryType::Inlet, "staticPressure", scalar(10.0)),
        (BoundaryType::Outlet, "staticPressure", scalar(0.0)),
        (BoundaryType::Outlet, "uniformVelocity", scalar(1.0)),
        (BoundaryType::FarField, "freestreamPressure", scalar(0.0)),
        (BoundaryType::FarField, "freestreamVelocity", scalar(3.0)),
    ];
    let physics = PhysicsSettings::default();

    for (ty, sub, value) in supported {
        let desc = BoundaryDescriptor::new("b", ty, sub, value).with_direction(vec![0.0, 0.0, 1.0]);
        let out = translate_fenics(&[desc], &physics).unwrap();
        assert!(out.diagnostics.is_empty(), "{ty} {sub}: {:?}", out.diagnostics);
        assert_eq!(out.boundaries.len(), 1);
        let values = &out.boundaries[0].values;
        let flow = values
            .keys()
            .filter(|k| *k == "velocity" || *k == "pressure")
            .count();
        assert_eq!(flow, 1, "{ty} {sub}");
        assert!(values.values().all(|c| c.kind == NumericalType::Dirichlet));
    }
}

#[test]
fn freestream_and_outflow_degrade_to_diagnostics() {
    let descs = vec![
        BoundaryDescriptor::new("far", BoundaryType::Freestream, "freestreamVelocity", scalar(1.0)),
        BoundaryDescriptor::new("out", BoundaryType::Outlet, "outFlow", scalar(0.0)),
        BoundaryDescriptor::new("sym", BoundaryType::Interface, "symmetry", scalar(0.0)),
        BoundaryDescriptor::new("rough", BoundaryType::Wall, "rough", scalar(0.0)),
    ];
    let out = translate_fenics(&descs, &PhysicsSettings::default()).unwrap();
    assert!(out.boundaries.is_empty());
    let names: Vec<_> = out.diagnostics.iter().map(|d| d.boundary.as_str()).collect();
    assert_eq!(names, vec!["far", "out", "sym", "rough"]);
}

#[test]
fn bogus_thermal_subtype_is_fatal() {
    let physics = PhysicsSettings {
        heat_transfer: true,
        ..PhysicsSettings::default()
    };
    let descs = vec![
        BoundaryDescriptor::new("walls", BoundaryType::Wall, "fixed", scalar(0.0)).with_thermal(
            ThermalSettings {
                subtype: "bogus".to_string(),
                ..ThermalSettings::default()
            },
        ),
    ];
    let err = translate_fenics(&descs, &physics).unwrap_err();
    assert_eq!(
        err,
        BoundaryError::ThermalSubtypeInvalid {
            boundary: "walls".to_string(),
            subtype: "bogus".to_string()
        }
    );
    assert!(matches!(
        translate_foam(&descs, &physics, FoamDialect::default(), None),
        Err(BoundaryError::ThermalSubtypeInvalid { .. })
    ));
}

#[test]
fn heat_transfer_adds_temperature() {
    let physics = PhysicsSettings {
        heat_transfer: true,
        ..PhysicsSettings::default()
    };
    let descs = vec![
        BoundaryDescriptor::new("walls", BoundaryType::Wall, "fixed", scalar(0.0)).with_thermal(
            ThermalSettings {
                subtype: "fixedValue".to_string(),
                temperature: 320.0,
                ..ThermalSettings::default()
            },
        ),
    ];
    let out = translate_fenics(&descs, &physics).unwrap();
    let t = &out.boundaries[0].values["temperature"];
    assert_eq!(t.kind, NumericalType::Dirichlet);
    assert_eq!(t.value, Some(BoundaryValue::Scalar(320.0)));
}

fn rough_heated_wall() -> Vec<BoundaryDescriptor> {
    vec![
        BoundaryDescriptor::new("rough", BoundaryType::Wall, "rough", scalar(0.0)).with_thermal(
            ThermalSettings {
                subtype: "fixedValue".to_string(),
                temperature: 350.0,
                ..ThermalSettings::default()
            },
        ),
    ]
}

#[test]
fn unsupported_wall_keeps_fenics_temperature() {
    let physics = PhysicsSettings {
        heat_transfer: true,
        ..PhysicsSettings::default()
    };
    let out = translate_fenics(&rough_heated_wall(), &physics).unwrap();
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].boundary, "rough");

    assert_eq!(out.boundaries.len(), 1);
    let values = &out.boundaries[0].values;
    assert!(values.get("velocity").is_none());
    assert!(values.get("pressure").is_none());
    assert_eq!(values["temperature"].kind, NumericalType::Dirichlet);
    assert_eq!(values["temperature"].value, Some(BoundaryValue::Scalar(350.0)));
}

#[test]
fn unsupported_wall_keeps_foam_temperature() {
    let physics = PhysicsSettings {
        heat_transfer: true,
        ..PhysicsSettings::default()
    };
    let out = translate_foam(&rough_heated_wall(), &physics, FoamDialect::default(), None).unwrap();
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].boundary, "rough");

    assert!(out.field("U").unwrap().boundary_field.get("rough").is_none());
    assert!(out.field("p").unwrap().boundary_field.get("rough").is_none());
    let t = &out.field("T").unwrap().boundary_field;
    assert_eq!(t.get_path("rough/type").unwrap().to_string(), "fixedValue");
    assert_eq!(t.get_path("rough/value").unwrap().to_string(), "uniform 350");
}

#[test]
fn turbulence_record_only_on_inflow_when_turbulent() {
    let physics = PhysicsSettings {
        turbulence_model: "kEpsilon".to_string(),
        ..PhysicsSettings::default()
    };
    let mut descs = sample();
    descs[0].turbulence = Some(TurbulenceSpec::default());
    let out = translate_fenics(&descs, &physics).unwrap();
    assert!(out.boundaries[0].turbulence_settings.is_some());
    assert!(out.boundaries[1].turbulence_settings.is_none());

    let laminar = translate_fenics(&descs, &PhysicsSettings::default()).unwrap();
    assert!(laminar.boundaries[0].turbulence_settings.is_none());
}

#[test]
fn fenics_json_shape() {
    let physics = PhysicsSettings {
        dimension: SpatialDim::Two,
        ..PhysicsSettings::default()
    };
    let out = translate_fenics(&sample(), &physics).unwrap();
    let json = serde_json::to_value(&out.boundaries[2]).unwrap();
    assert_eq!(json["boundary_id"], 3);
    assert_eq!(json["values"]["velocity"]["type"], "Dirichlet");
    assert_eq!(json["values"]["velocity"]["value"], serde_json::json!([0.0, 0.0]));
    let inlet = serde_json::to_value(&out.boundaries[0]).unwrap();
    assert_eq!(inlet["values"]["velocity"]["value"], serde_json::json!([1.5, 0.0]));
}

#[test]
fn foam_fields_for_k_epsilon() {
    let physics = PhysicsSettings {
        turbulence_model: "kEpsilon".to_string(),
        ..PhysicsSettings::default()
    };
    let out = translate_foam(&sample(), &physics, FoamDialect::default(), Some("defaultFaces")).unwrap();
    let names: Vec<_> = out.fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(names, vec!["U", "p", "k", "epsilon", "nut"]);

    let u = &out.field("U").unwrap().boundary_field;
    assert_eq!(u.get_path("walls/type").unwrap().to_string(), "noSlip");
    assert_eq!(u.get_path("defaultFaces/type").unwrap().to_string(), "noSlip");
    assert_eq!(u.get_path("inlet/value").unwrap().to_string(), "uniform (1.5 0 0)");
    assert_eq!(u.get_path("outlet/type").unwrap().to_string(), "inletOutlet");

    let p = &out.field("p").unwrap().boundary_field;
    assert_eq!(p.get_path("outlet/type").unwrap().to_string(), "fixedValue");
    assert_eq!(p.get_path("inlet/type").unwrap().to_string(), "zeroGradient");

    let k = &out.field("k").unwrap().boundary_field;
    assert_eq!(k.get_path("walls/type").unwrap().to_string(), "kqRWallFunction");
    assert_eq!(k.get_path("inlet/type").unwrap().to_string(), "fixedValue");
    let nut = &out.field("nut").unwrap().boundary_field;
    assert_eq!(nut.get_path("inlet/type").unwrap().to_string(), "calculated");
}

#[test]
fn foam_old_versions_use_fixed_value_walls() {
    let out = translate_foam(
        &sample(),
        &PhysicsSettings::default(),
        FoamDialect {
            major: 3,
            fork_extend: false,
        },
        None,
    )
    .unwrap();
    let u = &out.field("U").unwrap().boundary_field;
    assert_eq!(u.get_path("walls/type").unwrap().to_string(), "fixedValue");
    assert_eq!(u.get_path("walls/value").unwrap().to_string(), "uniform (0 0 0)");
}

#[test]
fn foam_unsupported_patch_is_absent_everywhere() {
    let mut descs = sample();
    descs.push(BoundaryDescriptor::new("out2", BoundaryType::Outlet, "outFlow", scalar(0.0)));
    descs.push(BoundaryDescriptor::new("front", BoundaryType::Interface, "empty", scalar(0.0)));
    let out = translate_foam(&descs, &PhysicsSettings::default(), FoamDialect::default(), None).unwrap();

    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].boundary, "out2");
    assert_eq!(out.diagnostics[0].id.get(), 4);
    for field in &out.fields {
        assert!(field.boundary_field.get("out2").is_none());
        assert_eq!(
            field.boundary_field.get_path("front/type").unwrap().to_string(),
            "empty"
        );
    }
}

#[test]
fn descriptors_load_from_yaml() {
    let yaml = r#"
- name: inlet
  type: inlet
  subtype: uniformVelocity
  value: 2.0
  direction: [0.0, 1.0, 0.0]
  turbulence:
    specification: intensity&HydraulicDiameter
    intensity: 0.05
    length_value: 0.2
- name: lid
  type: wall
  subtype: moving
  value: [1.0, 0.0, 0.0]
- name: odd
  type: wall
  subtype: wavy
"#;
    let descs: Vec<BoundaryDescriptor> = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(descs.len(), 3);
    assert_eq!(descs[1].value, BoundaryValue::Vector(vec![1.0, 0.0, 0.0]));
    assert_eq!(descs[2].subtype.as_str(), "wavy");
    assert_eq!(descs[2].value, BoundaryValue::Scalar(0.0));
}
