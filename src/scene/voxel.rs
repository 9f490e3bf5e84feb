//! Voxel primitives as seen by the slicer.

use crate::clipping::ClippingPlaneCollection;
use crate::float_types::Real;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelId(pub u32);

/// A volumetric primitive clipped directly in world coordinates.
///
/// The voxel renderer keeps the negative side of each plane, so its planes
/// are the globe planes with every normal reversed.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelPrimitive {
    id: VoxelId,
    pub clipping_planes: Option<ClippingPlaneCollection>,
}

impl VoxelPrimitive {
    pub const fn new(id: VoxelId) -> Self {
        VoxelPrimitive { id, clipping_planes: None }
    }

    pub const fn id(&self) -> VoxelId {
        self.id
    }

    /// Whether the voxel content at world position `point` is cut away.
    pub fn is_point_clipped(&self, point: &Point3<Real>) -> bool {
        self.clipping_planes
            .as_ref()
            .is_some_and(|cpc| cpc.is_clipped_mirrored(point))
    }
}
