//! Boundary ordinals and polyMesh patch types.

use std::collections::HashSet;

use fcb_core::{BoundaryId, DEFAULT_WALL_NAME};

use crate::schema::{BoundaryDescriptor, BoundarySubtype, BoundaryType};
use crate::{BoundaryError, BoundaryResult};

/// Boundary names with their ordinals.
///
/// Ordinals follow enumeration order (1-based); `default_wall` is always
/// present with id 0 for faces no descriptor claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTable {
    entries: Vec<(String, BoundaryId)>,
}

impl BoundaryTable {
    pub fn assign(descriptors: &[BoundaryDescriptor]) -> BoundaryResult<Self> {
        let mut seen = HashSet::new();
        let mut entries = vec![(DEFAULT_WALL_NAME.to_string(), BoundaryId::DEFAULT_WALL)];
        for (pos, desc) in descriptors.iter().enumerate() {
            if desc.name == DEFAULT_WALL_NAME || !seen.insert(desc.name.as_str()) {
                return Err(BoundaryError::DuplicateName {
                    name: desc.name.clone(),
                });
            }
            entries.push((desc.name.clone(), BoundaryId::from_position(pos)));
        }
        Ok(Self { entries })
    }

    pub fn id_of(&self, name: &str) -> Option<BoundaryId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, BoundaryId)> {
        self.entries.iter().map(|(n, id)| (n.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Patch type written to `constant/polyMesh/boundary`.
pub fn patch_type(boundary_type: BoundaryType, subtype: &BoundarySubtype) -> &'static str {
    match (boundary_type, subtype) {
        (BoundaryType::Wall, _) => "wall",
        (BoundaryType::Interface, BoundarySubtype::Symmetry) => "symmetry",
        (BoundaryType::Interface, BoundarySubtype::Wedge) => "wedge",
        (BoundaryType::Interface, BoundarySubtype::Cyclic) => "cyclic",
        (BoundaryType::Interface, BoundarySubtype::Empty) => "empty",
        _ => "patch",
    }
}
