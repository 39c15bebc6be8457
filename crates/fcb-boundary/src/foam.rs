//! Boundary conditions for OpenFOAM field files.

use fcb_core::{DEFAULT_WALL_NAME, Real};
use fcb_dict::{Dictionary, Value, uniform_scalar, uniform_vector};

use crate::schema::{
    BoundaryDescriptor, BoundarySubtype, BoundaryType, BoundaryValue, Diagnostic,
    PhysicsSettings, ThermalSettings, TurbulenceSpec,
};
use crate::table::BoundaryTable;
use crate::turbulence::{TurbulenceModel, TurbulenceValues};
use crate::{BoundaryError, BoundaryResult};

/// Installation traits that change boundary type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoamDialect {
    pub major: u32,
    pub fork_extend: bool,
}

impl FoamDialect {
    /// Pre-3.0 or foam-extend naming (`mut`, `muSgs`).
    pub fn legacy(self) -> bool {
        self.major < 3 || self.fork_extend
    }

    fn has_no_slip(self) -> bool {
        self.major >= 4 && !self.fork_extend
    }
}

impl Default for FoamDialect {
    fn default() -> Self {
        Self {
            major: 5,
            fork_extend: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Scalar,
    Vector,
}

impl FieldClass {
    pub fn class_name(self) -> &'static str {
        match self {
            FieldClass::Scalar => "volScalarField",
            FieldClass::Vector => "volVectorField",
        }
    }
}

/// Everything needed to write one `0/<field>` file.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoundaries {
    pub field: String,
    pub class: FieldClass,
    /// Dimension set in `[M L T Θ N I J]` form.
    pub dimensions: &'static str,
    /// Suggested `internalField` value.
    pub internal: Value,
    /// `boundaryField` body: one sub-dictionary per patch.
    pub boundary_field: Dictionary,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoamTranslation {
    pub fields: Vec<FieldBoundaries>,
    pub diagnostics: Vec<Diagnostic>,
    /// Case-wide problems, such as an unknown turbulence model.
    pub warnings: Vec<String>,
}

impl FoamTranslation {
    pub fn field(&self, name: &str) -> Option<&FieldBoundaries> {
        self.fields.iter().find(|f| f.field == name)
    }
}

/// How turbulence fields treat a patch.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Wall,
    Inflow,
    Outflow,
    Constraint(&'static str),
}

fn entry(pairs: &[(&str, Value)]) -> Dictionary {
    pairs.iter().cloned().collect()
}

fn typed(name: &str) -> Dictionary {
    entry(&[("type", Value::word(name))])
}

fn vec3(v: &[Real]) -> Vec<Real> {
    let mut out = [0.0; 3];
    for (dst, src) in out.iter_mut().zip(v) {
        *dst = *src;
    }
    out.to_vec()
}

fn field_spec(name: &str, compressible: bool) -> (FieldClass, &'static str) {
    match name {
        "U" => (FieldClass::Vector, "[0 1 -1 0 0 0 0]"),
        "p" if compressible => (FieldClass::Scalar, "[1 -1 -2 0 0 0 0]"),
        "p" => (FieldClass::Scalar, "[0 2 -2 0 0 0 0]"),
        "T" => (FieldClass::Scalar, "[0 0 0 1 0 0 0]"),
        "k" => (FieldClass::Scalar, "[0 2 -2 0 0 0 0]"),
        "epsilon" => (FieldClass::Scalar, "[0 2 -3 0 0 0 0]"),
        "omega" => (FieldClass::Scalar, "[0 0 -1 0 0 0 0]"),
        "mut" | "muSgs" => (FieldClass::Scalar, "[1 -1 -1 0 0 0 0]"),
        _ => (FieldClass::Scalar, "[0 2 -1 0 0 0 0]"),
    }
}

/// Translate descriptors into `boundaryField` dictionaries, one per field.
///
/// Fields are `U`, `p`, `T` with heat transfer, and the turbulence fields
/// of the selected model. `default_patch` names the converter's catch-all
/// patch, which is treated as a fixed wall.
pub fn translate_foam(
    descriptors: &[BoundaryDescriptor],
    physics: &PhysicsSettings,
    dialect: FoamDialect,
    default_patch: Option<&str>,
) -> BoundaryResult<FoamTranslation> {
    let table = BoundaryTable::assign(descriptors)?;
    let model = TurbulenceModel::from_name(&physics.turbulence_model);
    let mut out = FoamTranslation::default();

    let mut names = vec!["U", "p"];
    if physics.heat_transfer {
        names.push("T");
    }
    if let TurbulenceModel::Unsupported(name) = &model {
        let msg = format!("turbulence model {name} is not supported; no turbulence fields written");
        tracing::warn!(model = %name, "unsupported turbulence model");
        out.warnings.push(msg);
    }
    names.extend(model.variables(physics.compressible, dialect.legacy()));

    let reference = reference_turbulence(descriptors, physics);
    for name in &names {
        let (class, dimensions) = field_spec(name, physics.compressible);
        out.fields.push(FieldBoundaries {
            field: name.to_string(),
            class,
            dimensions,
            internal: internal_value(name, &reference),
            boundary_field: Dictionary::new(),
        });
    }

    let patch_ctx = PatchContext {
        physics,
        dialect,
        model: &model,
        reference,
    };

    if let Some(default_patch) = default_patch {
        let wall = BoundaryDescriptor::new(
            default_patch,
            BoundaryType::Wall,
            BoundarySubtype::Fixed,
            BoundaryValue::default(),
        );
        if let Ok(entries) = patch_ctx.patch_entries(&wall, &names) {
            insert_patch(&mut out.fields, default_patch, entries);
        }
    }

    for desc in descriptors {
        let id = table
            .id_of(&desc.name)
            .unwrap_or(fcb_core::BoundaryId::DEFAULT_WALL);

        let thermal = if physics.heat_transfer {
            let settings = desc.thermal.clone().unwrap_or_default();
            Some(thermal_entry(&desc.name, &settings)?)
        } else {
            None
        };

        match patch_ctx.patch_entries(desc, &names) {
            Ok(mut entries) => {
                if let Some(t) = thermal {
                    if let Some(slot) = entries.iter_mut().find(|(f, _)| *f == "T") {
                        if !matches!(patch_ctx.role(desc), Some(Role::Constraint(_))) {
                            slot.1 = t;
                        }
                    }
                }
                insert_patch(&mut out.fields, &desc.name, entries);
            }
            Err(message) => {
                tracing::warn!(boundary = %desc.name, %message, "flow fields left out");
                out.diagnostics.push(Diagnostic {
                    boundary: desc.name.clone(),
                    id,
                    message,
                });
                if let Some(t) = thermal {
                    insert_patch(&mut out.fields, &desc.name, vec![("T", t)]);
                }
            }
        }
    }

    tracing::debug!(
        fields = out.fields.len(),
        diagnostics = out.diagnostics.len(),
        default_wall = DEFAULT_WALL_NAME,
        "OpenFOAM boundary translation done"
    );
    Ok(out)
}

fn insert_patch(fields: &mut [FieldBoundaries], patch: &str, entries: Vec<(&str, Dictionary)>) {
    for (field, dict) in entries {
        if let Some(f) = fields.iter_mut().find(|f| f.field == field) {
            f.boundary_field.insert(patch, dict);
        }
    }
}

/// Turbulence values used where a patch has no specification of its own:
/// the first inlet's, otherwise the default specification.
fn reference_turbulence(
    descriptors: &[BoundaryDescriptor],
    physics: &PhysicsSettings,
) -> TurbulenceValues {
    let spec = descriptors
        .iter()
        .find(|d| d.boundary_type == BoundaryType::Inlet)
        .and_then(|d| d.turbulence)
        .unwrap_or_default();
    TurbulenceValues::estimate(&spec, physics.reference_speed, physics.kinematic_viscosity)
}

fn internal_value(field: &str, t: &TurbulenceValues) -> Value {
    match field {
        "U" => uniform_vector(&[0.0, 0.0, 0.0]),
        "T" => uniform_scalar(300.0),
        "k" => uniform_scalar(t.k),
        "epsilon" => uniform_scalar(t.epsilon),
        "omega" => uniform_scalar(t.omega),
        "nuTilda" => uniform_scalar(t.nu_tilda),
        _ => uniform_scalar(0.0),
    }
}

struct PatchContext<'a> {
    physics: &'a PhysicsSettings,
    dialect: FoamDialect,
    model: &'a TurbulenceModel,
    reference: TurbulenceValues,
}

impl PatchContext<'_> {
    fn role(&self, desc: &BoundaryDescriptor) -> Option<Role> {
        use BoundarySubtype as S;
        match (desc.boundary_type, &desc.subtype) {
            (BoundaryType::Wall, _) => Some(Role::Wall),
            (BoundaryType::Inlet | BoundaryType::FarField, _) => Some(Role::Inflow),
            (BoundaryType::Outlet, _) => Some(Role::Outflow),
            (BoundaryType::Interface, S::Symmetry) => Some(Role::Constraint("symmetry")),
            (BoundaryType::Interface, S::Wedge) => Some(Role::Constraint("wedge")),
            (BoundaryType::Interface, S::Cyclic) => Some(Role::Constraint("cyclic")),
            (BoundaryType::Interface, S::Empty) => Some(Role::Constraint("empty")),
            _ => None,
        }
    }

    /// Velocity for this patch as three components.
    fn velocity(&self, desc: &BoundaryDescriptor) -> Result<Vec<Real>, String> {
        match (&desc.direction, &desc.value) {
            (Some(direction), BoundaryValue::Scalar(speed)) => {
                let unit =
                    fcb_core::normalize(direction, "flow direction").map_err(|e| e.to_string())?;
                Ok(vec3(&unit).iter().map(|c| c * speed).collect())
            }
            (None, BoundaryValue::Scalar(speed)) => Ok(vec![*speed, 0.0, 0.0]),
            (_, BoundaryValue::Vector(v)) => Ok(vec3(v)),
        }
    }

    fn scalar(&self, desc: &BoundaryDescriptor) -> Result<Real, String> {
        desc.value
            .scalar()
            .ok_or_else(|| format!("subtype {} needs a scalar value", desc.subtype))
    }

    /// `U` and `p` entries for a patch.
    fn flow_entries(&self, desc: &BoundaryDescriptor) -> Result<(Dictionary, Dictionary), String> {
        use BoundarySubtype as S;
        use BoundaryType as T;

        let zero = uniform_vector(&[0.0, 0.0, 0.0]);
        let zero_gradient = typed("zeroGradient");

        let pair = match (desc.boundary_type, &desc.subtype) {
            (T::Wall, S::Fixed) => {
                let u = if self.dialect.has_no_slip() {
                    typed("noSlip")
                } else {
                    entry(&[("type", Value::word("fixedValue")), ("value", zero)])
                };
                (u, zero_gradient)
            }
            (T::Wall, S::Slip) => (typed("slip"), zero_gradient),
            (T::Wall, S::PartialSlip) => {
                let fraction = desc.value.scalar().unwrap_or(0.5);
                let u = entry(&[
                    ("type", Value::word("partialSlip")),
                    ("valueFraction", uniform_scalar(fraction)),
                    ("value", zero),
                ]);
                (u, zero_gradient)
            }
            (T::Wall, S::Moving) => {
                let u = entry(&[
                    ("type", Value::word("movingWallVelocity")),
                    ("value", uniform_vector(&self.velocity(desc)?)),
                ]);
                (u, zero_gradient)
            }
            (T::Inlet | T::Outlet, S::UniformVelocity) => {
                let u = entry(&[
                    ("type", Value::word("fixedValue")),
                    ("value", uniform_vector(&self.velocity(desc)?)),
                ]);
                (u, zero_gradient)
            }
            (T::Inlet, S::VolumetricFlowRate) => {
                let u = entry(&[
                    ("type", Value::word("flowRateInletVelocity")),
                    ("volumetricFlowRate", Value::number(self.scalar(desc)?)),
                    ("value", zero),
                ]);
                (u, zero_gradient)
            }
            (T::Inlet, S::MassFlowRate) => {
                let u = entry(&[
                    ("type", Value::word("flowRateInletVelocity")),
                    ("massFlowRate", Value::number(self.scalar(desc)?)),
                    ("rhoInlet", Value::number(1.0)),
                    ("value", zero),
                ]);
                (u, zero_gradient)
            }
            (T::Inlet, S::TotalPressure) => {
                let p0 = uniform_scalar(self.scalar(desc)?);
                let p = entry(&[
                    ("type", Value::word("totalPressure")),
                    ("p0", p0.clone()),
                    ("value", p0),
                ]);
                let u = entry(&[
                    ("type", Value::word("pressureInletOutletVelocity")),
                    ("value", zero),
                ]);
                (u, p)
            }
            (T::Inlet, S::StaticPressure) => {
                let p = entry(&[
                    ("type", Value::word("fixedValue")),
                    ("value", uniform_scalar(self.scalar(desc)?)),
                ]);
                let u = entry(&[
                    ("type", Value::word("pressureInletOutletVelocity")),
                    ("value", zero),
                ]);
                (u, p)
            }
            (T::Outlet, S::StaticPressure) => {
                let p = entry(&[
                    ("type", Value::word("fixedValue")),
                    ("value", uniform_scalar(self.scalar(desc)?)),
                ]);
                let u = entry(&[
                    ("type", Value::word("inletOutlet")),
                    ("inletValue", zero.clone()),
                    ("value", zero),
                ]);
                (u, p)
            }
            (T::FarField, S::FreestreamPressure | S::FreestreamVelocity) => {
                let (velocity, pressure) = if desc.subtype == S::FreestreamVelocity {
                    (self.velocity(desc)?, 0.0)
                } else {
                    (vec![0.0; 3], self.scalar(desc)?)
                };
                let u = entry(&[
                    ("type", Value::word("freestream")),
                    ("freestreamValue", uniform_vector(&velocity)),
                ]);
                let p = entry(&[
                    ("type", Value::word("freestreamPressure")),
                    ("freestreamValue", uniform_scalar(pressure)),
                ]);
                (u, p)
            }
            (ty, sub) => {
                return Err(format!(
                    "boundary type {ty} with subtype {sub} is not supported"
                ));
            }
        };
        Ok(pair)
    }

    fn turbulence_entry(&self, field: &str, role: Role, own: &TurbulenceValues) -> Dictionary {
        let r = &self.reference;
        let pick = |t: &TurbulenceValues| match field {
            "k" => t.k,
            "epsilon" => t.epsilon,
            "omega" => t.omega,
            "nuTilda" => t.nu_tilda,
            _ => 0.0,
        };
        let is_viscosity = matches!(field, "nut" | "mut" | "nuSgs" | "muSgs");

        match role {
            Role::Constraint(c) => typed(c),
            Role::Wall => match field {
                "k" => entry(&[
                    ("type", Value::word("kqRWallFunction")),
                    ("value", uniform_scalar(r.k)),
                ]),
                "epsilon" => entry(&[
                    ("type", Value::word("epsilonWallFunction")),
                    ("value", uniform_scalar(r.epsilon)),
                ]),
                "omega" => entry(&[
                    ("type", Value::word("omegaWallFunction")),
                    ("value", uniform_scalar(r.omega)),
                ]),
                "nuTilda" => entry(&[
                    ("type", Value::word("fixedValue")),
                    ("value", uniform_scalar(0.0)),
                ]),
                "nut" if *self.model == TurbulenceModel::SpalartAllmaras => entry(&[
                    ("type", Value::word("nutUSpaldingWallFunction")),
                    ("value", uniform_scalar(0.0)),
                ]),
                "nut" => entry(&[
                    ("type", Value::word("nutkWallFunction")),
                    ("value", uniform_scalar(0.0)),
                ]),
                "mut" => entry(&[
                    ("type", Value::word("mutkWallFunction")),
                    ("value", uniform_scalar(0.0)),
                ]),
                _ => typed("zeroGradient"),
            },
            Role::Inflow if is_viscosity => entry(&[
                ("type", Value::word("calculated")),
                ("value", uniform_scalar(0.0)),
            ]),
            Role::Inflow => entry(&[
                ("type", Value::word("fixedValue")),
                ("value", uniform_scalar(pick(own))),
            ]),
            Role::Outflow if is_viscosity => entry(&[
                ("type", Value::word("calculated")),
                ("value", uniform_scalar(0.0)),
            ]),
            Role::Outflow => entry(&[
                ("type", Value::word("inletOutlet")),
                ("inletValue", uniform_scalar(pick(r))),
                ("value", uniform_scalar(pick(r))),
            ]),
        }
    }

    /// Entries for every field, or the reason the patch is unsupported.
    fn patch_entries<'n>(
        &self,
        desc: &BoundaryDescriptor,
        fields: &[&'n str],
    ) -> Result<Vec<(&'n str, Dictionary)>, String> {
        if desc.boundary_type == BoundaryType::Freestream {
            return Err(format!(
                "boundary type {} is not supported",
                desc.boundary_type
            ));
        }
        let role = self.role(desc).ok_or_else(|| {
            format!(
                "boundary type {} with subtype {} is not supported",
                desc.boundary_type, desc.subtype
            )
        })?;

        let (u, p) = match role {
            Role::Constraint(c) => (typed(c), typed(c)),
            _ => self.flow_entries(desc)?,
        };

        let own = match role {
            Role::Inflow => {
                let speed = if desc.subtype.as_str().to_lowercase().contains("velocity") {
                    self.velocity(desc).map(|v| fcb_core::magnitude(&v))?
                } else {
                    self.physics.reference_speed
                };
                let spec = desc.turbulence.unwrap_or_else(TurbulenceSpec::default);
                TurbulenceValues::estimate(&spec, speed, self.physics.kinematic_viscosity)
            }
            _ => self.reference,
        };

        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            let dict = match *field {
                "U" => u.clone(),
                "p" => p.clone(),
                "T" => match role {
                    Role::Constraint(c) => typed(c),
                    _ => typed("zeroGradient"),
                },
                other => self.turbulence_entry(other, role, &own),
            };
            entries.push((*field, dict));
        }
        Ok(entries)
    }
}

/// `T` entry from the thermal subtype table. Unknown subtypes are an error.
fn thermal_entry(boundary: &str, thermal: &ThermalSettings) -> BoundaryResult<Dictionary> {
    let t = uniform_scalar(thermal.temperature);
    let dict = match thermal.subtype.as_str() {
        "fixedValue" => entry(&[("type", Value::word("fixedValue")), ("value", t)]),
        "zeroGradient" => typed("zeroGradient"),
        "fixedGradient" => entry(&[
            ("type", Value::word("fixedGradient")),
            ("gradient", uniform_scalar(thermal.heat_flux)),
        ]),
        "heatFlux" => entry(&[
            ("type", Value::word("externalWallHeatFluxTemperature")),
            ("kappaMethod", Value::word("fluidThermo")),
            ("q", uniform_scalar(thermal.heat_flux)),
            ("value", t),
        ]),
        "mixed" | "HTC" => entry(&[
            ("type", Value::word("externalWallHeatFluxTemperature")),
            ("kappaMethod", Value::word("fluidThermo")),
            ("h", uniform_scalar(thermal.htc)),
            ("Ta", t.clone()),
            ("value", t),
        ]),
        "coupled" => entry(&[
            (
                "type",
                Value::word("compressible::turbulentTemperatureCoupledBaffleMixed"),
            ),
            ("Tnbr", Value::word("T")),
            ("kappaMethod", Value::word("fluidThermo")),
            ("value", t),
        ]),
        other => {
            return Err(BoundaryError::ThermalSubtypeInvalid {
                boundary: boundary.to_string(),
                subtype: other.to_string(),
            });
        }
    };
    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_pads_and_truncates() {
        assert_eq!(vec3(&[1.0, 2.0]), vec![1.0, 2.0, 0.0]);
        assert_eq!(vec3(&[1.0, 2.0, 3.0, 4.0]), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn dialect_naming() {
        assert!(FoamDialect { major: 2, fork_extend: false }.legacy());
        assert!(FoamDialect { major: 4, fork_extend: true }.legacy());
        assert!(!FoamDialect::default().legacy());
        assert!(!FoamDialect { major: 3, fork_extend: false }.has_no_slip());
    }

    #[test]
    fn thermal_types() {
        let mut t = ThermalSettings {
            subtype: "HTC".into(),
            temperature: 290.0,
            heat_flux: 0.0,
            htc: 12.0,
        };
        let d = thermal_entry("w", &t).unwrap();
        assert_eq!(d.get("h").unwrap().to_string(), "uniform 12");
        assert_eq!(d.get("Ta").unwrap().to_string(), "uniform 290");
        t.subtype = "bogus".into();
        assert!(matches!(
            thermal_entry("w", &t),
            Err(BoundaryError::ThermalSubtypeInvalid { .. })
        ));
    }
}
