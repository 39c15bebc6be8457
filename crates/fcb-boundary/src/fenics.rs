//! Boundary conditions for the FEniCS solvers.

use std::collections::BTreeMap;

use fcb_core::{BoundaryId, Real, SpatialDim};
use serde::Serialize;

use crate::schema::{
    BoundaryDescriptor, BoundarySubtype, BoundaryType, BoundaryValue, Diagnostic,
    PhysicsSettings, ThermalSettings, TurbulenceSpec,
};
use crate::table::BoundaryTable;
use crate::turbulence::TurbulenceModel;
use crate::{BoundaryError, BoundaryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericalType {
    Dirichlet,
    Neumann,
    Robin,
    #[serde(rename = "heatFlux")]
    HeatFlux,
    #[serde(rename = "coupled")]
    Coupled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FenicsCondition {
    pub variable: String,
    #[serde(rename = "type")]
    pub kind: NumericalType,
    pub value: Option<BoundaryValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambient: Option<Real>,
}

impl FenicsCondition {
    fn new(variable: &str, kind: NumericalType, value: Option<BoundaryValue>) -> Self {
        Self {
            variable: variable.to_string(),
            kind,
            value,
            ambient: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurbulenceRecord {
    pub name: String,
    pub specification: crate::schema::TurbulenceSpecification,
    pub intensity_value: Real,
    pub length_value: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FenicsBoundary {
    #[serde(skip)]
    pub name: String,
    pub boundary_id: BoundaryId,
    /// Conditions keyed by variable name.
    pub values: BTreeMap<String, FenicsCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turbulence_settings: Option<TurbulenceRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FenicsTranslation {
    pub boundaries: Vec<FenicsBoundary>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate descriptors into FEniCS boundary records.
///
/// Fluid rules are applied in order: freestream type or `outFlow` subtype
/// (unsupported), a subtype naming velocity, a subtype naming pressure,
/// then walls (`fixed` or `moving`). Anything else, interfaces included,
/// is unsupported and yields a diagnostic instead of a flow record; the
/// patch keeps its temperature record when heat transfer is on.
pub fn translate_fenics(
    descriptors: &[BoundaryDescriptor],
    physics: &PhysicsSettings,
) -> BoundaryResult<FenicsTranslation> {
    let table = BoundaryTable::assign(descriptors)?;
    let model = TurbulenceModel::from_name(&physics.turbulence_model);
    let mut out = FenicsTranslation::default();

    for desc in descriptors {
        let id = table.id_of(&desc.name).unwrap_or(BoundaryId::DEFAULT_WALL);

        let temperature = if physics.heat_transfer {
            let thermal = desc.thermal.clone().unwrap_or_default();
            Some(thermal_condition(&desc.name, &thermal)?)
        } else {
            None
        };

        let fluid = match fluid_condition(desc, physics.dimension) {
            Ok(c) => Some(c),
            Err(message) => {
                tracing::warn!(boundary = %desc.name, %message, "flow condition left out");
                out.diagnostics.push(Diagnostic {
                    boundary: desc.name.clone(),
                    id,
                    message,
                });
                None
            }
        };
        if fluid.is_none() && temperature.is_none() {
            continue;
        }
        let has_flow = fluid.is_some();

        let mut values = BTreeMap::new();
        for condition in fluid.into_iter().chain(temperature) {
            values.insert(condition.variable.clone(), condition);
        }

        let turbulence_settings = match desc.boundary_type {
            BoundaryType::Inlet | BoundaryType::FarField if has_flow && !model.is_laminar() => {
                let spec = desc.turbulence.unwrap_or_else(TurbulenceSpec::default);
                Some(TurbulenceRecord {
                    name: physics.turbulence_model.clone(),
                    specification: spec.specification,
                    intensity_value: spec.intensity,
                    length_value: spec.length_value,
                })
            }
            _ => None,
        };

        out.boundaries.push(FenicsBoundary {
            name: desc.name.clone(),
            boundary_id: id,
            values,
            turbulence_settings,
        });
    }
    Ok(out)
}

fn fluid_condition(desc: &BoundaryDescriptor, dim: SpatialDim) -> Result<FenicsCondition, String> {
    let subtype = desc.subtype.as_str().to_lowercase();

    if desc.boundary_type == BoundaryType::Freestream || subtype == "outflow" {
        return Err(format!(
            "boundary type {} with subtype {} is not supported",
            desc.boundary_type, desc.subtype
        ));
    }
    if subtype.contains("velocity") {
        let value = velocity_value(desc, dim)?;
        return Ok(FenicsCondition::new(
            "velocity",
            NumericalType::Dirichlet,
            Some(value),
        ));
    }
    if subtype.contains("pressure") {
        return Ok(FenicsCondition::new(
            "pressure",
            NumericalType::Dirichlet,
            Some(desc.value.clone()),
        ));
    }
    match (desc.boundary_type, &desc.subtype) {
        (BoundaryType::Wall, BoundarySubtype::Fixed) => Ok(FenicsCondition::new(
            "velocity",
            NumericalType::Dirichlet,
            Some(BoundaryValue::Vector(dim.zero_vector())),
        )),
        (BoundaryType::Wall, BoundarySubtype::Moving) => Ok(FenicsCondition::new(
            "velocity",
            NumericalType::Dirichlet,
            Some(truncate(&desc.value, dim)),
        )),
        (BoundaryType::Wall, other) => Err(format!("wall subtype {other} is not supported")),
        (BoundaryType::Interface, other) => {
            Err(format!("interface subtype {other} is not supported"))
        }
        (ty, other) => Err(format!(
            "boundary type {ty} with subtype {other} is not supported"
        )),
    }
}

/// Velocity value; `uniformVelocity` scales the normalised direction by the
/// scalar value, keeping only the first `dim` components.
fn velocity_value(desc: &BoundaryDescriptor, dim: SpatialDim) -> Result<BoundaryValue, String> {
    match (&desc.subtype, &desc.direction, &desc.value) {
        (BoundarySubtype::UniformVelocity, Some(direction), BoundaryValue::Scalar(speed)) => {
            let unit = fcb_core::normalize(direction, "flow direction").map_err(|e| e.to_string())?;
            Ok(BoundaryValue::Vector(
                dim.truncate(&unit).iter().map(|c| c * speed).collect(),
            ))
        }
        (_, _, value) => Ok(truncate(value, dim)),
    }
}

fn truncate(value: &BoundaryValue, dim: SpatialDim) -> BoundaryValue {
    match value {
        BoundaryValue::Vector(v) => BoundaryValue::Vector(dim.truncate(v)),
        other => other.clone(),
    }
}

/// Thermal subtype table. Unknown subtypes are an error.
fn thermal_condition(boundary: &str, thermal: &ThermalSettings) -> BoundaryResult<FenicsCondition> {
    let scalar = |v: Real| Some(BoundaryValue::Scalar(v));
    let condition = match thermal.subtype.as_str() {
        "fixedValue" => FenicsCondition::new(
            "temperature",
            NumericalType::Dirichlet,
            scalar(thermal.temperature),
        ),
        "zeroGradient" => FenicsCondition::new("temperature", NumericalType::Neumann, scalar(0.0)),
        "fixedGradient" => FenicsCondition::new(
            "temperature",
            NumericalType::Neumann,
            scalar(thermal.heat_flux),
        ),
        "heatFlux" => FenicsCondition::new(
            "temperature",
            NumericalType::HeatFlux,
            scalar(thermal.heat_flux),
        ),
        "mixed" => FenicsCondition {
            ambient: Some(thermal.temperature),
            ..FenicsCondition::new(
                "temperature",
                NumericalType::HeatFlux,
                scalar(thermal.heat_flux),
            )
        },
        "HTC" => FenicsCondition {
            ambient: Some(thermal.temperature),
            ..FenicsCondition::new("temperature", NumericalType::Robin, scalar(thermal.htc))
        },
        "coupled" => FenicsCondition::new("temperature", NumericalType::Coupled, None),
        other => {
            return Err(BoundaryError::ThermalSubtypeInvalid {
                boundary: boundary.to_string(),
                subtype: other.to_string(),
            });
        }
    };
    Ok(condition)
}
