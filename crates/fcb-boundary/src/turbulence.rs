//! Turbulence model families and inlet turbulence estimates.

use fcb_core::Real;

use crate::schema::{TurbulenceSpec, TurbulenceSpecification};

const C_MU: Real = 0.09;

const K_EPSILON: &[&str] = &["kEpsilon", "RNGkEpsilon", "realizableKE", "LaunderSharmaKE"];
const K_OMEGA: &[&str] = &["kOmega", "kOmegaSST"];
const LES: &[&str] = &[
    "DeardorffDiffStress",
    "Smagorinsky",
    "SpalartAllmarasDDES",
    "SpalartAllmarasDES",
    "SpalartAllmarasIDDES",
    "WALE",
    "dynamicKEqn",
    "dynamicLagrangian",
    "kEqn",
    "kOmegaSSTDES",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurbulenceModel {
    Laminar,
    Inviscid,
    Dns,
    KEpsilon(String),
    KOmega(String),
    SpalartAllmaras,
    Les(String),
    Unsupported(String),
}

impl TurbulenceModel {
    pub fn from_name(name: &str) -> Self {
        match name {
            "laminar" => TurbulenceModel::Laminar,
            "invisid" | "inviscid" => TurbulenceModel::Inviscid,
            "DNS" => TurbulenceModel::Dns,
            "SpalartAllmaras" => TurbulenceModel::SpalartAllmaras,
            n if K_EPSILON.contains(&n) => TurbulenceModel::KEpsilon(n.to_string()),
            n if K_OMEGA.contains(&n) => TurbulenceModel::KOmega(n.to_string()),
            n if LES.contains(&n) => TurbulenceModel::Les(n.to_string()),
            n => TurbulenceModel::Unsupported(n.to_string()),
        }
    }

    /// Models that solve no turbulence transport equations.
    pub fn is_laminar(&self) -> bool {
        matches!(
            self,
            TurbulenceModel::Laminar | TurbulenceModel::Inviscid | TurbulenceModel::Dns
        )
    }

    pub fn name(&self) -> &str {
        match self {
            TurbulenceModel::Laminar => "laminar",
            TurbulenceModel::Inviscid => "inviscid",
            TurbulenceModel::Dns => "DNS",
            TurbulenceModel::SpalartAllmaras => "SpalartAllmaras",
            TurbulenceModel::KEpsilon(n)
            | TurbulenceModel::KOmega(n)
            | TurbulenceModel::Les(n)
            | TurbulenceModel::Unsupported(n) => n,
        }
    }

    /// `simulationType` of `turbulenceProperties`.
    pub fn simulation_type(&self) -> &'static str {
        match self {
            TurbulenceModel::Les(_) => "LES",
            TurbulenceModel::KEpsilon(_)
            | TurbulenceModel::KOmega(_)
            | TurbulenceModel::SpalartAllmaras => "RAS",
            _ => "laminar",
        }
    }

    /// Turbulent viscosity field name.
    ///
    /// `nut` for current releases; LES uses `nuSgs`, and compressible
    /// solvers on old (< 3) or foam-extend installs use the `mu` names.
    pub fn viscosity_variable(&self, compressible: bool, legacy: bool) -> &'static str {
        match (self, legacy) {
            (TurbulenceModel::Les(_), true) => "muSgs",
            (TurbulenceModel::Les(_), false) => "nuSgs",
            (_, true) if compressible => "mut",
            _ => "nut",
        }
    }

    /// Field files the model needs in `0/`, in writing order.
    pub fn variables(&self, compressible: bool, legacy: bool) -> Vec<&'static str> {
        let nut = self.viscosity_variable(compressible, legacy);
        match self {
            TurbulenceModel::KEpsilon(_) => vec!["k", "epsilon", nut],
            TurbulenceModel::KOmega(_) => vec!["k", "omega", nut],
            TurbulenceModel::SpalartAllmaras => vec![nut, "nuTilda"],
            TurbulenceModel::Les(_) => vec![nut],
            _ => Vec::new(),
        }
    }
}

/// Estimated turbulence quantities at an inlet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceValues {
    pub k: Real,
    pub epsilon: Real,
    pub omega: Real,
    pub nu_tilda: Real,
}

impl TurbulenceValues {
    /// Derive `k`, `epsilon`, `omega`, `nuTilda` from a specification, the
    /// inlet speed, and the laminar kinematic viscosity.
    ///
    /// `k = 1.5 (|U| I)²`; with a mixing length `L`,
    /// `epsilon = Cmu^0.75 k^1.5 / L` and `omega = sqrt(k) / (Cmu^0.25 L)`;
    /// a hydraulic diameter gives `L = 0.07 D`.
    pub fn estimate(spec: &TurbulenceSpec, speed: Real, nu: Real) -> Self {
        let intensity = spec.intensity;
        let k = 1.5 * (speed * intensity).powi(2);

        let (epsilon, omega, length) = match spec.specification {
            TurbulenceSpecification::IntensityDissipationRate => {
                let epsilon = spec.length_value;
                let omega = safe_div(epsilon, C_MU * k);
                (epsilon, omega, safe_div(C_MU.powf(0.75) * k.powf(1.5), epsilon))
            }
            TurbulenceSpecification::IntensitySpecificDissipationRate => {
                let omega = spec.length_value;
                let length = safe_div(k.sqrt(), C_MU.powf(0.25) * omega);
                (C_MU * k * omega, omega, length)
            }
            TurbulenceSpecification::IntensityViscosityRatio => {
                let nut = spec.length_value * nu;
                let epsilon = safe_div(C_MU * k * k, nut);
                let omega = safe_div(k, nut);
                (epsilon, omega, safe_div(C_MU.powf(0.75) * k.powf(1.5), epsilon))
            }
            TurbulenceSpecification::IntensityLengthScale => {
                mixing_length(k, spec.length_value)
            }
            TurbulenceSpecification::IntensityHydraulicDiameter => {
                mixing_length(k, 0.07 * spec.length_value)
            }
        };

        let nu_tilda = 1.5f64.sqrt() * speed * intensity * length;
        Self {
            k,
            epsilon,
            omega,
            nu_tilda,
        }
    }
}

fn mixing_length(k: Real, length: Real) -> (Real, Real, Real) {
    let epsilon = safe_div(C_MU.powf(0.75) * k.powf(1.5), length);
    let omega = safe_div(k.sqrt(), C_MU.powf(0.25) * length);
    (epsilon, omega, length)
}

fn safe_div(a: Real, b: Real) -> Real {
    if b.abs() < Real::EPSILON { 0.0 } else { a / b }
}
