//! fcb-core: shared foundation for the foam case builder.
//!
//! Contains:
//! - ids (stable boundary ordinals, `default_wall` = 0)
//! - numeric (Real, tolerances, vector helpers, spatial dimension)
//! - units (CAD unit schema and mesh scale factor)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::CoreError;
pub use ids::*;
pub use numeric::*;
pub use units::*;
