use core::fmt;

/// Ordinal of a boundary patch within one case.
///
/// - `0` is reserved for the synthetic `default_wall` patch
/// - explicit boundaries are numbered from 1 in enumeration order
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BoundaryId(u32);

/// Name of the fallback patch that claims every face no boundary owns.
pub const DEFAULT_WALL_NAME: &str = "default_wall";

impl BoundaryId {
    pub const DEFAULT_WALL: BoundaryId = BoundaryId(0);

    /// Ordinal for the boundary at 0-based `position` in the input list.
    pub fn from_position(position: usize) -> Self {
        let ordinal = u32::try_from(position).unwrap_or(u32::MAX - 1) + 1;
        Self(ordinal)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_default_wall(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundaryId({})", self.0)
    }
}

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        for (pos, expected) in [(0_usize, 1_u32), (1, 2), (41, 42)] {
            assert_eq!(BoundaryId::from_position(pos).get(), expected);
        }
    }

    #[test]
    fn default_wall_is_zero() {
        assert!(BoundaryId::DEFAULT_WALL.is_default_wall());
        assert!(!BoundaryId::from_position(0).is_default_wall());
    }
}
