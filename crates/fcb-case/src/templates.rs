//! Default `system/` dictionaries for a case built from scratch.

use fcb_dict::{Dictionary, FoamDict, Header, Value};

/// Pressure-velocity coupling family a solver belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverFamily {
    /// Steady state, `SIMPLE` dictionary.
    Simple,
    /// Transient, `PISO` dictionary.
    Piso,
    /// Transient, `PIMPLE` dictionary.
    Pimple,
}

impl SolverFamily {
    pub fn from_solver_name(name: &str) -> Self {
        if name.contains("Simple") || matches!(name, "potentialFoam" | "laplacianFoam") {
            SolverFamily::Simple
        } else if matches!(name, "icoFoam" | "pisoFoam" | "nonNewtonianIcoFoam") {
            SolverFamily::Piso
        } else {
            SolverFamily::Pimple
        }
    }

    pub fn is_transient(self) -> bool {
        !matches!(self, SolverFamily::Simple)
    }

    /// Name of the algorithm sub-dictionary in `fvSolution`.
    pub fn algorithm(self) -> &'static str {
        match self {
            SolverFamily::Simple => "SIMPLE",
            SolverFamily::Piso => "PISO",
            SolverFamily::Pimple => "PIMPLE",
        }
    }
}

fn system_header(object: &str) -> Header {
    let mut header = Header::new(object);
    header.location = Some("system".to_string());
    header
}

fn entries(pairs: &[(&str, Value)]) -> Dictionary {
    pairs.iter().cloned().collect()
}

pub fn control_dict(solver: &str) -> FoamDict {
    let family = SolverFamily::from_solver_name(solver);
    let (end_time, delta_t, write_interval) = if family.is_transient() {
        (1.0, 0.001, 100.0)
    } else {
        (1000.0, 1.0, 100.0)
    };

    let mut doc = FoamDict::new(system_header("controlDict"));
    doc.body = entries(&[
        ("application", Value::word(solver)),
        ("startFrom", Value::word("startTime")),
        ("startTime", Value::number(0.0)),
        ("stopAt", Value::word("endTime")),
        ("endTime", Value::number(end_time)),
        ("deltaT", Value::number(delta_t)),
        ("writeControl", Value::word("timeStep")),
        ("writeInterval", Value::number(write_interval)),
        ("purgeWrite", Value::number(0.0)),
        ("writeFormat", Value::word("ascii")),
        ("writePrecision", Value::number(6.0)),
        ("writeCompression", Value::boolean(false)),
        ("timeFormat", Value::word("general")),
        ("timePrecision", Value::number(6.0)),
        ("runTimeModifiable", Value::boolean(true)),
    ]);
    doc
}

pub fn fv_schemes(solver: &str) -> FoamDict {
    let family = SolverFamily::from_solver_name(solver);
    let mut doc = FoamDict::new(system_header("fvSchemes"));

    let ddt = if family.is_transient() {
        "Euler"
    } else {
        "steadyState"
    };
    let (convection, turbulence) = if family.is_transient() {
        ("Gauss linearUpwind grad(U)", "Gauss limitedLinear 1")
    } else {
        ("bounded Gauss linearUpwind grad(U)", "bounded Gauss upwind")
    };

    let body = &mut doc.body;
    body.insert("ddtSchemes", entries(&[("default", Value::word(ddt))]));
    body.insert(
        "gradSchemes",
        entries(&[("default", Value::words("Gauss linear"))]),
    );
    body.insert(
        "divSchemes",
        entries(&[
            ("default", Value::word("none")),
            ("div(phi,U)", Value::words(convection)),
            ("div(phi,k)", Value::words(turbulence)),
            ("div(phi,epsilon)", Value::words(turbulence)),
            ("div(phi,omega)", Value::words(turbulence)),
            ("div(phi,nuTilda)", Value::words(turbulence)),
            ("div(phi,T)", Value::words(turbulence)),
            (
                "div((nuEff*dev2(T(grad(U)))))",
                Value::words("Gauss linear"),
            ),
        ]),
    );
    body.insert(
        "laplacianSchemes",
        entries(&[("default", Value::words("Gauss linear corrected"))]),
    );
    body.insert(
        "interpolationSchemes",
        entries(&[("default", Value::word("linear"))]),
    );
    body.insert(
        "snGradSchemes",
        entries(&[("default", Value::word("corrected"))]),
    );
    body.insert("wallDist", entries(&[("method", Value::word("meshWave"))]));
    doc
}

pub fn fv_solution(solver: &str) -> FoamDict {
    let family = SolverFamily::from_solver_name(solver);
    let mut doc = FoamDict::new(system_header("fvSolution"));
    let body = &mut doc.body;

    let mut solvers = Dictionary::new();
    if family.is_transient() {
        solvers.insert(
            "p",
            entries(&[
                ("solver", Value::word("PCG")),
                ("preconditioner", Value::word("DIC")),
                ("tolerance", Value::number(1e-6)),
                ("relTol", Value::number(0.05)),
            ]),
        );
        solvers.insert(
            "pFinal",
            entries(&[("$p", Value::Tuple(Vec::new())), ("relTol", Value::number(0.0))]),
        );
    } else {
        solvers.insert(
            "p",
            entries(&[
                ("solver", Value::word("GAMG")),
                ("smoother", Value::word("GaussSeidel")),
                ("tolerance", Value::number(1e-6)),
                ("relTol", Value::number(0.1)),
            ]),
        );
    }
    solvers.insert(
        "\"(U|k|epsilon|omega|nuTilda|T)\"",
        entries(&[
            ("solver", Value::word("smoothSolver")),
            ("smoother", Value::word("symGaussSeidel")),
            ("tolerance", Value::number(1e-5)),
            ("relTol", Value::number(if family.is_transient() { 0.0 } else { 0.1 })),
        ]),
    );
    body.insert("solvers", solvers);

    let algorithm = match family {
        SolverFamily::Simple => entries(&[
            ("nNonOrthogonalCorrectors", Value::number(0.0)),
            ("consistent", Value::boolean(true)),
            (
                "residualControl",
                Value::Dict(entries(&[
                    ("p", Value::number(1e-2)),
                    ("U", Value::number(1e-3)),
                    ("\"(k|epsilon|omega|nuTilda)\"", Value::number(1e-3)),
                ])),
            ),
        ]),
        SolverFamily::Piso => entries(&[
            ("nCorrectors", Value::number(2.0)),
            ("nNonOrthogonalCorrectors", Value::number(0.0)),
            ("pRefCell", Value::number(0.0)),
            ("pRefValue", Value::number(0.0)),
        ]),
        SolverFamily::Pimple => entries(&[
            ("nOuterCorrectors", Value::number(1.0)),
            ("nCorrectors", Value::number(2.0)),
            ("nNonOrthogonalCorrectors", Value::number(0.0)),
            ("pRefCell", Value::number(0.0)),
            ("pRefValue", Value::number(0.0)),
        ]),
    };
    body.insert(family.algorithm(), algorithm);

    if !family.is_transient() {
        body.insert(
            "relaxationFactors",
            entries(&[(
                "equations",
                Value::Dict(entries(&[
                    ("U", Value::number(0.9)),
                    ("\".*\"", Value::number(0.9)),
                ])),
            )]),
        );
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_from_name() {
        assert_eq!(SolverFamily::from_solver_name("simpleFoam"), SolverFamily::Simple);
        assert_eq!(
            SolverFamily::from_solver_name("buoyantSimpleFoam"),
            SolverFamily::Simple
        );
        assert_eq!(SolverFamily::from_solver_name("icoFoam"), SolverFamily::Piso);
        assert_eq!(SolverFamily::from_solver_name("pimpleFoam"), SolverFamily::Pimple);
    }

    #[test]
    fn steady_schemes() {
        let d = fv_schemes("simpleFoam");
        assert_eq!(d.get("ddtSchemes/default"), Some(&Value::word("steadyState")));
        let s = fv_solution("simpleFoam");
        assert!(s.get("SIMPLE/residualControl/p").is_some());
        assert!(s.get("relaxationFactors").is_some());
    }

    #[test]
    fn transient_solution_has_final_solver() {
        let s = fv_solution("pisoFoam");
        assert!(s.get("PISO/nCorrectors").is_some());
        assert!(s.get("solvers/pFinal").is_some());
        assert!(s.get("relaxationFactors").is_none());
    }

    #[test]
    fn templates_parse_back() {
        for solver in ["simpleFoam", "icoFoam", "pimpleFoam"] {
            for doc in [control_dict(solver), fv_schemes(solver), fv_solution(solver)] {
                let back = FoamDict::parse(&doc.to_foam_string()).unwrap();
                assert_eq!(back, doc);
            }
        }
    }
}
