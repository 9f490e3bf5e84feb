//! Streamed 3D tilesets as seen by the slicer.

use crate::clipping::ClippingPlaneCollection;
use crate::config::BELOW_TERRAIN_HEIGHT;
use crate::float_types::Real;
use crate::float_types::parry3d::bounding_volume::BoundingSphere;
use crate::geodesy::{Cartographic, east_north_up_to_fixed_frame};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Stable handle of a tileset, independent of its load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilesetId(pub u32);

/// Root tile of a loaded tileset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRoot {
    /// Local-to-world transform of the root tile
    pub transform: Matrix4<Real>,
}

impl TileRoot {
    pub fn is_identity(&self) -> bool {
        self.transform == Matrix4::identity()
    }

    pub fn translation(&self) -> Vector3<Real> {
        self.transform.fixed_view::<3, 1>(0, 3).into_owned()
    }
}

/// A clippable primitive.
///
/// Its clipping planes are expressed in the clipping-planes origin frame,
/// `root.transform * initial_clipping_planes_origin_matrix`, further
/// transformed by the collection's own model matrix.
#[derive(Debug, Clone)]
pub struct Tileset {
    id: TilesetId,
    root: Option<TileRoot>,
    bounding_sphere: Option<BoundingSphere>,
    initial_clipping_planes_origin_matrix: Matrix4<Real>,
    generation: u64,
    pub clipping_planes: Option<ClippingPlaneCollection>,
}

impl Tileset {
    /// A tileset whose root tile is still loading.
    pub fn new(id: TilesetId) -> Self {
        Tileset {
            id,
            root: None,
            bounding_sphere: None,
            initial_clipping_planes_origin_matrix: Matrix4::identity(),
            generation: 0,
            clipping_planes: None,
        }
    }

    pub fn loaded(id: TilesetId, root_transform: Matrix4<Real>, local_sphere: BoundingSphere) -> Self {
        let mut tileset = Tileset::new(id);
        tileset.load(root_transform, local_sphere);
        tileset
    }

    /// Marks the root tile as loaded, or reloaded with new content.
    /// A reload drops the clipping planes, the slicer has to re-apply them.
    ///
    /// `local_sphere` is the bounding sphere before the root transform is
    /// applied. When its center is above [`BELOW_TERRAIN_HEIGHT`] the clipping
    /// origin gets an east-north-up orientation there, otherwise the origin
    /// comes from the root transform alone.
    pub fn load(&mut self, root_transform: Matrix4<Real>, local_sphere: BoundingSphere) {
        let local_center = local_sphere.center;
        self.initial_clipping_planes_origin_matrix = match Cartographic::from_cartesian(&local_center) {
            Some(c) if c.height > BELOW_TERRAIN_HEIGHT => east_north_up_to_fixed_frame(&local_center),
            _ => Matrix4::identity(),
        };
        let world_center = root_transform.transform_point(&local_center);
        self.bounding_sphere = Some(BoundingSphere::new(world_center, local_sphere.radius));
        self.root = Some(TileRoot { transform: root_transform });
        self.clipping_planes = None;
        self.generation += 1;
    }

    pub const fn id(&self) -> TilesetId {
        self.id
    }

    pub const fn root(&self) -> Option<&TileRoot> {
        self.root.as_ref()
    }

    /// World-space bounding sphere.
    pub const fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere.as_ref()
    }

    /// Clipping is only possible once root and bounding sphere are known.
    pub const fn is_loaded(&self) -> bool {
        self.root.is_some() && self.bounding_sphere.is_some()
    }

    /// Bumped on every (re)load.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn initial_clipping_planes_origin_matrix(&self) -> &Matrix4<Real> {
        &self.initial_clipping_planes_origin_matrix
    }

    pub fn clipping_planes_origin_matrix(&self) -> Matrix4<Real> {
        match &self.root {
            Some(root) => root.transform * self.initial_clipping_planes_origin_matrix,
            None => self.initial_clipping_planes_origin_matrix,
        }
    }

    /// Whether the tileset geometry at world position `point` is cut away.
    pub fn is_point_clipped(&self, point: &Point3<Real>) -> bool {
        let Some(cpc) = &self.clipping_planes else {
            return false;
        };
        let to_world = self.clipping_planes_origin_matrix() * cpc.model_matrix;
        match to_world.try_inverse() {
            Some(to_local) => cpc.is_clipped(&to_local.transform_point(point)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::cartesian_from_degrees;

    #[test]
    fn surface_sphere_gets_enu_origin() {
        let center = cartesian_from_degrees(7.0, 46.0, 500.0);
        let tileset = Tileset::loaded(TilesetId(1), Matrix4::identity(), BoundingSphere::new(center, 100.0));
        let origin = tileset.clipping_planes_origin_matrix();
        assert!((origin.transform_point(&Point3::origin()) - center).norm() < 1e-6);
    }

    #[test]
    fn deep_sphere_keeps_identity_origin() {
        let tileset = Tileset::loaded(TilesetId(2), Matrix4::identity(), BoundingSphere::new(Point3::origin(), 100.0));
        assert_eq!(*tileset.initial_clipping_planes_origin_matrix(), Matrix4::identity());
    }

    #[test]
    fn reload_bumps_generation() {
        let mut tileset = Tileset::new(TilesetId(3));
        assert!(!tileset.is_loaded());
        tileset.load(Matrix4::identity(), BoundingSphere::new(Point3::origin(), 1.0));
        tileset.load(Matrix4::identity(), BoundingSphere::new(Point3::origin(), 2.0));
        assert!(tileset.is_loaded());
        assert_eq!(tileset.generation(), 2);
    }
}
