//! Line slicing: one vertical plane through two ground points.

use crate::clipping::ClippingPlaneCollection;
use crate::config::SlicerConfig;
use crate::errors::SlicingError;
use crate::float_types::{EPSILON, Real};
use crate::geodesy::transforms::east_north_up_axes;
use crate::plane::{Plane, plane_from_two_points};
use crate::scene::{Scene, SceneView, Tileset, TilesetId, VoxelId};
use crate::slicer::SlicingTool;
use crate::slicer::helper::{create_clipping_planes, create_cpc_model_matrix_from_sphere, get_orthogonal_view_points};
use crate::slicer::options::SliceOptions;
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
pub struct SlicingLine {
    config: SlicerConfig,
    slice_points: [Point3<Real>; 2],
    negate: bool,
    /// World plane, already negated when `negate` is set
    plane: Plane,
}

impl SlicingLine {
    pub const fn plane(&self) -> &Plane {
        &self.plane
    }

    pub const fn slice_points(&self) -> &[Point3<Real>; 2] {
        &self.slice_points
    }

    /// Plane for a tileset positioned by its root transform, derived in the
    /// east-north-up frame at the tile center.
    fn local_plane(&self, tileset: &Tileset) -> Option<Plane> {
        let root = tileset.root()?;
        let translation = root.translation();
        let tile_center = if translation == Vector3::zeros() {
            tileset.bounding_sphere()?.center
        } else {
            Point3::from(translation)
        };
        let (east, north, _) = east_north_up_axes(&tile_center);
        let direction = self.slice_points[1] - self.slice_points[0];
        let normal = Vector3::new(-direction.dot(&north), direction.dot(&east), 0.0);
        if normal.norm_squared() < EPSILON {
            return None;
        }
        let mut normal = normal.normalize();
        if self.negate {
            normal.x = -normal.x;
            normal.y = -normal.y;
        }
        Some(Plane::new(normal, self.plane.point_distance(&tile_center)))
    }

    /// Voxels keep the negative side, so their plane is built the other way round.
    fn voxel_collection(&self) -> ClippingPlaneCollection {
        let plane = plane_from_two_points(&self.slice_points[0], &self.slice_points[1], !self.negate);
        let mut clipping_planes = create_clipping_planes(vec![plane], false);
        clipping_planes.edge_width = self.config.edge_width;
        clipping_planes
    }

    fn tileset_plane(&self, tileset: &Tileset) -> Option<Plane> {
        let root = tileset.root()?;
        if root.is_identity() {
            let model_matrix = create_cpc_model_matrix_from_sphere(tileset)?;
            self.plane.transform(&model_matrix)
        } else {
            self.local_plane(tileset)
        }
    }
}

impl SlicingTool for SlicingLine {
    fn activate(
        options: &mut SliceOptions,
        config: &SlicerConfig,
        view: &dyn SceneView,
        scene: &mut Scene,
    ) -> Result<Self, SlicingError> {
        let slice_points = match options.slice_points.as_slice() {
            [first, second] => [*first, *second],
            points if points.len() < 2 => {
                let points = get_orthogonal_view_points(view, &scene.globe.cartographic_limit_rectangle)?;
                options.slice_points = points.to_vec();
                points
            },
            points => return Err(SlicingError::InvalidSlicePoints { expected: 2, found: points.len() }),
        };
        let negate = options.negate;
        let plane = plane_from_two_points(&slice_points[0], &slice_points[1], negate);

        let mut globe_planes = create_clipping_planes(vec![plane], false);
        globe_planes.edge_width = config.edge_width;
        scene.globe.clipping_planes = Some(globe_planes);

        let mut tool = SlicingLine {
            config: config.clone(),
            slice_points,
            negate,
            plane,
        };
        let ids: Vec<TilesetId> = scene.tilesets.iter().map(Tileset::id).collect();
        for id in ids {
            tool.add_clipping_planes(id, scene);
        }
        for voxel in scene.voxels.iter_mut() {
            voxel.clipping_planes = Some(tool.voxel_collection());
        }
        debug!(negate, normal = ?plane.normal, "line slicing activated");
        Ok(tool)
    }

    fn deactivate(self, _scene: &mut Scene) {
        debug!("line slicing deactivated");
    }

    fn add_clipping_planes(&mut self, tileset: TilesetId, scene: &mut Scene) {
        let Some(target) = scene.tileset_mut(tileset) else {
            return;
        };
        if !target.is_loaded() {
            trace!(tileset = tileset.0, "tileset not loaded yet");
            return;
        }
        match self.tileset_plane(target) {
            Some(plane) => {
                let mut clipping_planes = create_clipping_planes(vec![plane], false);
                clipping_planes.edge_width = self.config.edge_width;
                target.clipping_planes = Some(clipping_planes);
            },
            None => warn!(tileset = tileset.0, "tileset transform is not invertible, clipping skipped"),
        }
    }

    fn add_voxel_clipping_planes(&mut self, voxel: VoxelId, scene: &mut Scene) {
        if let Some(target) = scene.voxel_mut(voxel) {
            target.clipping_planes = Some(self.voxel_collection());
        }
    }
}
