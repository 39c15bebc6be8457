use crate::CoreError;

/// Floating point type used throughout the builder
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn magnitude(v: &[Real]) -> Real {
    v.iter().map(|c| c * c).sum::<Real>().sqrt()
}

/// Unit vector in the direction of `v`.
pub fn normalize(v: &[Real], what: &'static str) -> Result<Vec<Real>, CoreError> {
    let mag = magnitude(v);
    if mag <= Real::MIN_POSITIVE {
        return Err(CoreError::ZeroLength { what });
    }
    Ok(v.iter().map(|c| c / mag).collect())
}

/// Spatial dimension of the geometry being meshed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpatialDim {
    Two,
    #[default]
    Three,
}

impl SpatialDim {
    pub fn count(self) -> usize {
        match self {
            SpatialDim::Two => 2,
            SpatialDim::Three => 3,
        }
    }

    /// First `count()` components of `v`.
    pub fn truncate(self, v: &[Real]) -> Vec<Real> {
        v.iter().copied().take(self.count()).collect()
    }

    pub fn zero_vector(self) -> Vec<Real> {
        vec![0.0; self.count()]
    }
}
