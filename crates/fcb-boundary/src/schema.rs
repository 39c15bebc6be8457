//! Boundary descriptors as entered by the user.

use core::fmt;

use fcb_core::{BoundaryId, Real, SpatialDim};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryType {
    Wall,
    Inlet,
    Outlet,
    FarField,
    Interface,
    Freestream,
}

impl BoundaryType {
    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryType::Wall => "wall",
            BoundaryType::Inlet => "inlet",
            BoundaryType::Outlet => "outlet",
            BoundaryType::FarField => "farField",
            BoundaryType::Interface => "interface",
            BoundaryType::Freestream => "freestream",
        }
    }

    /// Subtypes offered for this boundary type, in display order.
    pub fn subtypes(self) -> &'static [BoundarySubtype] {
        use BoundarySubtype::*;
        match self {
            BoundaryType::Wall => &[Fixed, Slip, PartialSlip, Moving, Rough],
            BoundaryType::Inlet => &[
                UniformVelocity,
                VolumetricFlowRate,
                MassFlowRate,
                TotalPressure,
                StaticPressure,
            ],
            BoundaryType::Outlet => &[StaticPressure, UniformVelocity, OutFlow],
            BoundaryType::FarField | BoundaryType::Freestream => {
                &[FreestreamPressure, FreestreamVelocity, Characteristic]
            }
            BoundaryType::Interface => &[Symmetry, Wedge, Cyclic, Empty, Coupled],
        }
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical subtype. Free text that matches none of the known names is
/// kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BoundarySubtype {
    Fixed,
    Slip,
    PartialSlip,
    Moving,
    Rough,
    UniformVelocity,
    VolumetricFlowRate,
    MassFlowRate,
    TotalPressure,
    StaticPressure,
    OutFlow,
    FreestreamPressure,
    FreestreamVelocity,
    Characteristic,
    Symmetry,
    Wedge,
    Cyclic,
    Empty,
    Coupled,
    Other(String),
}

impl BoundarySubtype {
    pub fn as_str(&self) -> &str {
        use BoundarySubtype::*;
        match self {
            Fixed => "fixed",
            Slip => "slip",
            PartialSlip => "partialSlip",
            Moving => "moving",
            Rough => "rough",
            UniformVelocity => "uniformVelocity",
            VolumetricFlowRate => "volumetricFlowRate",
            MassFlowRate => "massFlowRate",
            TotalPressure => "totalPressure",
            StaticPressure => "staticPressure",
            OutFlow => "outFlow",
            FreestreamPressure => "freestreamPressure",
            FreestreamVelocity => "freestreamVelocity",
            Characteristic => "characteristic",
            Symmetry => "symmetry",
            Wedge => "wedge",
            Cyclic => "cyclic",
            Empty => "empty",
            Coupled => "coupled",
            Other(s) => s,
        }
    }
}

impl From<&str> for BoundarySubtype {
    fn from(s: &str) -> Self {
        use BoundarySubtype::*;
        match s {
            "fixed" => Fixed,
            "slip" => Slip,
            "partialSlip" => PartialSlip,
            "moving" => Moving,
            "rough" => Rough,
            "uniformVelocity" => UniformVelocity,
            "volumetricFlowRate" => VolumetricFlowRate,
            "massFlowRate" => MassFlowRate,
            "totalPressure" => TotalPressure,
            "staticPressure" => StaticPressure,
            "outFlow" => OutFlow,
            "freestreamPressure" => FreestreamPressure,
            "freestreamVelocity" => FreestreamVelocity,
            "characteristic" => Characteristic,
            "symmetry" => Symmetry,
            "wedge" => Wedge,
            "cyclic" => Cyclic,
            "empty" => Empty,
            "coupled" => Coupled,
            other => Other(other.to_string()),
        }
    }
}

impl From<String> for BoundarySubtype {
    fn from(s: String) -> Self {
        BoundarySubtype::from(s.as_str())
    }
}

impl From<BoundarySubtype> for String {
    fn from(s: BoundarySubtype) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for BoundarySubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar (pressure, flow rate, speed) or vector (velocity) boundary value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryValue {
    Scalar(Real),
    Vector(Vec<Real>),
}

impl BoundaryValue {
    pub fn scalar(&self) -> Option<Real> {
        match self {
            BoundaryValue::Scalar(v) => Some(*v),
            BoundaryValue::Vector(_) => None,
        }
    }

    /// Euclidean norm for vectors, absolute value for scalars.
    pub fn magnitude(&self) -> Real {
        match self {
            BoundaryValue::Scalar(v) => v.abs(),
            BoundaryValue::Vector(v) => fcb_core::magnitude(v),
        }
    }
}

impl Default for BoundaryValue {
    fn default() -> Self {
        BoundaryValue::Scalar(0.0)
    }
}

fn default_temperature() -> Real {
    300.0
}

fn default_thermal_subtype() -> String {
    "zeroGradient".to_string()
}

/// Heat-transfer settings of one boundary.
///
/// `subtype` stays a string: it is validated during translation, where an
/// unknown name is a hard error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalSettings {
    #[serde(default = "default_thermal_subtype")]
    pub subtype: String,
    #[serde(default = "default_temperature")]
    pub temperature: Real,
    #[serde(default)]
    pub heat_flux: Real,
    /// Heat transfer coefficient, W/m²/K.
    #[serde(default)]
    pub htc: Real,
}

impl Default for ThermalSettings {
    fn default() -> Self {
        Self {
            subtype: default_thermal_subtype(),
            temperature: default_temperature(),
            heat_flux: 0.0,
            htc: 0.0,
        }
    }
}

/// How the two turbulence inputs of an inlet are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurbulenceSpecification {
    /// Intensity and dissipation rate `epsilon` (m²/s³).
    #[serde(rename = "intensity&DissipationRate")]
    IntensityDissipationRate,
    /// Intensity and specific dissipation rate `omega` (1/s).
    #[serde(rename = "intensity&SpecificDissipationRate")]
    IntensitySpecificDissipationRate,
    /// Intensity and turbulent-to-laminar viscosity ratio.
    #[serde(rename = "intensity&ViscosityRatio")]
    IntensityViscosityRatio,
    /// Intensity and mixing length (m).
    #[serde(rename = "intensity&LengthScale")]
    IntensityLengthScale,
    /// Intensity and hydraulic diameter (m).
    #[serde(rename = "intensity&HydraulicDiameter")]
    IntensityHydraulicDiameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceSpec {
    pub specification: TurbulenceSpecification,
    /// Turbulence intensity, fraction (0.05 is 5%).
    pub intensity: Real,
    /// Second input; meaning depends on `specification`.
    pub length_value: Real,
}

impl Default for TurbulenceSpec {
    fn default() -> Self {
        Self {
            specification: TurbulenceSpecification::IntensityLengthScale,
            intensity: 0.05,
            length_value: 0.1,
        }
    }
}

/// One physical boundary patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub boundary_type: BoundaryType,
    pub subtype: BoundarySubtype,
    #[serde(default)]
    pub value: BoundaryValue,
    /// Flow direction for `uniformVelocity`; normalised before use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Vec<Real>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbulence: Option<TurbulenceSpec>,
}

impl BoundaryDescriptor {
    pub fn new(
        name: impl Into<String>,
        boundary_type: BoundaryType,
        subtype: impl Into<BoundarySubtype>,
        value: BoundaryValue,
    ) -> Self {
        Self {
            name: name.into(),
            boundary_type,
            subtype: subtype.into(),
            value,
            direction: None,
            thermal: None,
            turbulence: None,
        }
    }

    pub fn with_direction(mut self, direction: impl Into<Vec<Real>>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn with_thermal(mut self, thermal: ThermalSettings) -> Self {
        self.thermal = Some(thermal);
        self
    }

    pub fn with_turbulence(mut self, turbulence: TurbulenceSpec) -> Self {
        self.turbulence = Some(turbulence);
        self
    }
}

/// Physics switches that decide which fields are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    #[serde(default)]
    pub dimension: SpatialDim,
    #[serde(default)]
    pub heat_transfer: bool,
    #[serde(default = "default_turbulence_model")]
    pub turbulence_model: String,
    #[serde(default)]
    pub compressible: bool,
    /// Kinematic viscosity, m²/s; used by viscosity-ratio specifications.
    #[serde(default = "default_viscosity")]
    pub kinematic_viscosity: Real,
    /// Speed used for turbulence estimates where the patch has none.
    #[serde(default = "default_reference_speed")]
    pub reference_speed: Real,
}

fn default_turbulence_model() -> String {
    "laminar".to_string()
}

fn default_viscosity() -> Real {
    1e-3
}

fn default_reference_speed() -> Real {
    1.0
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            dimension: SpatialDim::default(),
            heat_transfer: false,
            turbulence_model: default_turbulence_model(),
            compressible: false,
            kinematic_viscosity: default_viscosity(),
            reference_speed: default_reference_speed(),
        }
    }
}

/// Non-fatal translation problem; the boundary is left out of the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub boundary: String,
    pub id: BoundaryId,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boundary '{}' (id {}): {}", self.boundary, self.id, self.message)
    }
}
