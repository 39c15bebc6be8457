// fcb-core/src/units.rs

use crate::Real;
use uom::si::f64::Length;
use uom::si::length::{inch, meter, millimeter};

/// CAD document unit schema.
///
/// The CAD side models geometry in millimetres unless the user picked a
/// metre-based schema; the solver always works in metres.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitSchema {
    /// mm / kg / s
    #[default]
    Standard,
    /// m / kg / s
    Mks,
    /// inch based imperial
    Imperial,
    /// metre based building schema
    BuildingEuro,
}

impl UnitSchema {
    /// Length of one CAD model unit.
    pub fn model_length_unit(self) -> Length {
        match self {
            UnitSchema::Standard => Length::new::<millimeter>(1.0),
            UnitSchema::Mks | UnitSchema::BuildingEuro => Length::new::<meter>(1.0),
            UnitSchema::Imperial => Length::new::<inch>(1.0),
        }
    }

    /// Factor that converts mesh coordinates into metres.
    pub fn mesh_scale(self) -> Real {
        self.model_length_unit().get::<meter>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetre_schema_scales_by_one_thousandth() {
        assert_eq!(UnitSchema::Standard.mesh_scale(), 0.001);
    }

    #[test]
    fn metre_schema_is_identity() {
        assert_eq!(UnitSchema::Mks.mesh_scale(), 1.0);
        assert_eq!(UnitSchema::BuildingEuro.mesh_scale(), 1.0);
    }

    #[test]
    fn imperial_schema_scales_by_inch() {
        assert!((UnitSchema::Imperial.mesh_scale() - 0.0254).abs() < 1e-12);
    }
}
