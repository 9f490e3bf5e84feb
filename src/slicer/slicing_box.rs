//! Box slicing: keeps either the inside or the outside of an oriented box.
//!
//! The box footprint is four ground corners. Its four side planes are always
//! re-derived from those corners, the down/up pair lives in the east-north-up
//! frame at the footprint center and follows the vertical limits.

use crate::clipping::ClippingPlaneCollection;
use crate::config::SlicerConfig;
use crate::errors::SlicingError;
use crate::float_types::Real;
use crate::geodesy::{east_north_up_to_fixed_frame, height_of, with_height};
use crate::plane::{Plane, plane_from_two_points};
use crate::scene::{BoxVolume, Scene, SceneView, Tileset, TilesetId, VoxelId};
use crate::slicer::SlicingTool;
use crate::slicer::arrows::{
    HandleSide, SLICE_BOX_ARROWS_INSIDE, SLICE_BOX_ARROWS_OUTSIDE, SLICING_GEOMETRY_COLOR, SlicerArrows,
};
use crate::slicer::helper::{
    BBox, BoxCorners, create_clipping_planes, create_cpc_model_matrix_from_sphere, get_bbox_from_rectangle,
    get_bbox_from_view_ratio, move_slicing_box_corners_bounded, project_point_on_segment, terrain_altitude,
    update_height_for_positions,
};
use crate::slicer::options::{BoxSliceInfo, SliceOptions, SliceType, SyncBoxPlanesCallback};
use hashbrown::HashMap;
use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};
use std::fmt;
use tracing::{debug, trace, warn};

const BOX_VOLUME_ALPHA: f32 = 0.2;

/// Side planes of the box footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidePlanes {
    pub back: Plane,
    pub left: Plane,
    pub front: Plane,
    pub right: Plane,
}

impl SidePlanes {
    /// Non-negated planes face the box interior.
    pub fn from_corners(corners: &BoxCorners, negate: bool) -> Self {
        SidePlanes {
            back: plane_from_two_points(&corners.bottom_left, &corners.bottom_right, negate),
            left: plane_from_two_points(&corners.top_left, &corners.bottom_left, negate),
            front: plane_from_two_points(&corners.top_right, &corners.top_left, negate),
            right: plane_from_two_points(&corners.bottom_right, &corners.top_right, negate),
        }
    }

    pub const fn to_array(&self) -> [Plane; 4] {
        [self.back, self.left, self.front, self.right]
    }
}

/// World-to-tileset matrices, valid for one tileset generation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TileTransform {
    generation: u64,
    world_to_local: Matrix4<Real>,
    box_frame_to_local: Matrix4<Real>,
}

pub struct SlicingBox {
    config: SlicerConfig,
    slice_type: SliceType,
    negate: bool,
    bbox: BBox,
    /// Local-to-world frame at the footprint center, fixed for the activation
    box_frame: Matrix4<Real>,
    side_planes: SidePlanes,
    /// down, up; in `box_frame`
    z_planes: [Plane; 2],
    show_box: bool,
    exaggerated: bool,
    arrows: SlicerArrows,
    tile_transforms: HashMap<TilesetId, TileTransform>,
    sync_callback: Option<SyncBoxPlanesCallback>,
}

impl fmt::Debug for SlicingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlicingBox")
            .field("slice_type", &self.slice_type)
            .field("negate", &self.negate)
            .field("bbox", &self.bbox)
            .field("show_box", &self.show_box)
            .field("cached_tilesets", &self.tile_transforms.len())
            .finish_non_exhaustive()
    }
}

impl SlicingBox {
    pub const fn bbox(&self) -> &BBox {
        &self.bbox
    }

    pub const fn side_planes(&self) -> &SidePlanes {
        &self.side_planes
    }

    pub const fn arrows(&self) -> &SlicerArrows {
        &self.arrows
    }

    pub const fn is_negated(&self) -> bool {
        self.negate
    }

    pub const fn show_box(&self) -> bool {
        self.show_box
    }

    /// Number of tilesets with a cached local transform.
    pub fn cached_tilesets(&self) -> usize {
        self.tile_transforms.len()
    }

    fn update_side_planes(&mut self) {
        self.side_planes = SidePlanes::from_corners(&self.bbox.corners, self.negate);
    }

    fn update_z_planes(&mut self) {
        let lower_limit = self.bbox.lower_limit;
        self.z_planes = [
            Plane::new(Vector3::z(), -lower_limit),
            Plane::new(-Vector3::z(), lower_limit + self.bbox.height),
        ];
    }

    fn new_collection(&self) -> ClippingPlaneCollection {
        let mut cpc = create_clipping_planes(Vec::new(), !self.negate);
        cpc.edge_width = self.config.edge_width;
        cpc
    }

    fn update_box_globe_clipping_planes(&self, clipping_planes: &mut ClippingPlaneCollection) {
        clipping_planes.remove_all();
        for plane in self.side_planes.to_array() {
            clipping_planes.add(plane);
        }
        if !self.negate {
            for plane in &self.z_planes {
                if let Some(world) = plane.transform(&self.box_frame) {
                    clipping_planes.add(world);
                }
            }
        }
    }

    /// World planes with reversed normals, the z-planes through the negated box frame.
    fn update_box_voxel_clipping_planes(&self, clipping_planes: &mut ClippingPlaneCollection) {
        clipping_planes.remove_all();
        for plane in SidePlanes::from_corners(&self.bbox.corners, !self.negate).to_array() {
            clipping_planes.add(plane);
        }
        if !self.negate {
            let transform = -self.box_frame;
            for plane in &self.z_planes {
                if let Some(world) = plane.transform(&transform) {
                    clipping_planes.add(world);
                }
            }
        }
    }

    fn tile_transform(&mut self, tileset: &Tileset) -> Option<TileTransform> {
        if let Some(cached) = self.tile_transforms.get(&tileset.id()) {
            if cached.generation == tileset.generation() {
                return Some(*cached);
            }
        }
        let root = tileset.root()?;
        let world_to_local = if root.is_identity() {
            create_cpc_model_matrix_from_sphere(tileset)?
        } else {
            root.transform.try_inverse()?
        };
        let box_frame_to_local = tileset.clipping_planes_origin_matrix().try_inverse()? * self.box_frame;
        let transform = TileTransform {
            generation: tileset.generation(),
            world_to_local,
            box_frame_to_local,
        };
        self.tile_transforms.insert(tileset.id(), transform);
        Some(transform)
    }

    fn update_box_tile_clipping_planes(&mut self, tileset: &mut Tileset) {
        if tileset.clipping_planes.is_none() || !tileset.is_loaded() {
            return;
        }
        let id = tileset.id();
        let transform = self.tile_transform(tileset);
        let footprint = SidePlanes::from_corners(&self.bbox.corners, false);
        let negate = self.negate;
        let Some(clipping_planes) = tileset.clipping_planes.as_mut() else {
            return;
        };
        clipping_planes.remove_all();

        let Some(transform) = transform else {
            warn!(tileset = id.0, "tileset transform is not invertible, clipping skipped");
            return;
        };
        for plane in footprint.to_array() {
            if let Some(mut local) = plane.transform(&transform.world_to_local) {
                if negate {
                    local.negate();
                }
                clipping_planes.add(local);
            }
        }
        if !negate {
            for plane in &self.z_planes {
                if let Some(local) = plane.transform(&transform.box_frame_to_local) {
                    clipping_planes.add(local);
                }
            }
        }
    }

    /// Re-derives every plane and pushes them to the globe and all clipped
    /// tilesets, then reports the box.
    pub fn sync_planes(&mut self, scene: &mut Scene) {
        self.update_side_planes();
        if let Some(clipping_planes) = scene.globe.clipping_planes.as_mut() {
            self.update_box_globe_clipping_planes(clipping_planes);
        }
        for tileset in scene.tilesets.iter_mut() {
            if tileset.is_loaded() {
                self.update_box_tile_clipping_planes(tileset);
            }
        }
        for voxel in scene.voxels.iter_mut() {
            if let Some(clipping_planes) = voxel.clipping_planes.as_mut() {
                self.update_box_voxel_clipping_planes(clipping_planes);
            }
        }
        trace!(width = self.bbox.width, length = self.bbox.length, height = self.bbox.height, "box planes synced");
        self.on_box_planes_change();
    }

    fn on_box_planes_change(&mut self) {
        let info = self.box_slice_info();
        if let Some(callback) = self.sync_callback.as_mut() {
            callback(&info);
        }
    }

    pub fn box_slice_info(&self) -> BoxSliceInfo {
        let bottom = height_of(&self.bbox.center) - self.bbox.height / 2.0;
        BoxSliceInfo {
            slice_type: self.slice_type,
            slice_points: self.bbox.corners.to_array().to_vec(),
            lower_limit: bottom - self.bbox.altitude,
            height: self.bbox.height,
            show_box: self.show_box,
            negate: self.negate,
        }
    }

    /// Applies a handle move of `amount` meters along `side`.
    pub fn on_plane_move(
        &mut self,
        side: HandleSide,
        amount: Real,
        move_vector: Vector3<Real>,
        view: &dyn SceneView,
        scene: &mut Scene,
    ) {
        let footprint = SidePlanes::from_corners(&self.bbox.corners, false);
        let min_size = self.config.min_box_size;
        let both_side_move = match side {
            HandleSide::Left => {
                let c = &mut self.bbox.corners;
                move_slicing_box_corners_bounded(
                    &mut c.top_left,
                    &mut c.bottom_left,
                    &mut c.top_right,
                    &mut c.bottom_right,
                    &footprint.right,
                    &move_vector,
                    min_size,
                )
            },
            HandleSide::Right => {
                let c = &mut self.bbox.corners;
                move_slicing_box_corners_bounded(
                    &mut c.top_right,
                    &mut c.bottom_right,
                    &mut c.top_left,
                    &mut c.bottom_left,
                    &footprint.left,
                    &move_vector,
                    min_size,
                )
            },
            HandleSide::Front => {
                let c = &mut self.bbox.corners;
                move_slicing_box_corners_bounded(
                    &mut c.top_left,
                    &mut c.top_right,
                    &mut c.bottom_left,
                    &mut c.bottom_right,
                    &footprint.back,
                    &move_vector,
                    min_size,
                )
            },
            HandleSide::Back => {
                let c = &mut self.bbox.corners;
                move_slicing_box_corners_bounded(
                    &mut c.bottom_left,
                    &mut c.bottom_right,
                    &mut c.top_left,
                    &mut c.top_right,
                    &footprint.front,
                    &move_vector,
                    min_size,
                )
            },
            HandleSide::Down | HandleSide::Up => move_vertical_limit(&mut self.bbox, side, amount, min_size),
        };
        self.bbox.height = self.bbox.height.max(min_size);

        self.bbox.corners.project_to_ground();
        self.bbox.width = nalgebra::distance(&self.bbox.corners.top_left, &self.bbox.corners.bottom_left);
        self.bbox.length = nalgebra::distance(&self.bbox.corners.bottom_right, &self.bbox.corners.bottom_left);
        // the reported lower limit is relative to the terrain under the moved footprint
        self.bbox.altitude = terrain_altitude(view, &self.bbox.corners.footprint_center());

        let shift = if both_side_move { move_vector } else { move_vector / 2.0 };
        let center_height = self.bbox.lower_limit + self.bbox.height / 2.0;
        self.bbox.center = with_height(&(self.bbox.center + shift), center_height);
        self.update_z_planes();

        trace!(%side, amount, both_side_move, "box plane moved");
        self.sync_planes(scene);
        self.refresh_entities(view, scene);
    }

    /// Where the handle of `side` sits for the current box and view.
    pub fn arrow_position(&self, side: HandleSide, view: &dyn SceneView) -> Point3<Real> {
        let center_height = height_of(&self.bbox.center);
        let box_height = self.bbox.height;
        let corners = &self.bbox.corners;
        let view_center = view.pick_center_on_ellipsoid().unwrap_or(self.bbox.center);

        if side.is_vertical() {
            let edges = [
                nalgebra::center(&corners.bottom_left, &corners.bottom_right),
                nalgebra::center(&corners.top_left, &corners.top_right),
                nalgebra::center(&corners.bottom_left, &corners.top_left),
                nalgebra::center(&corners.bottom_right, &corners.top_right),
            ];
            let nearest = edges
                .into_iter()
                .min_by(|a, b| {
                    nalgebra::distance(a, &view_center).total_cmp(&nalgebra::distance(b, &view_center))
                })
                .unwrap_or(self.bbox.center);
            let height = match side {
                HandleSide::Down => center_height - box_height / 2.0,
                _ => center_height + box_height / 2.0,
            };
            return with_height(&nearest, height);
        }

        let offset = box_height / 2.0 + self.config.handle_height_offset;
        let height = if view.camera_underground() {
            center_height - offset
        } else {
            center_height + offset
        };
        let (start, end) = match side {
            HandleSide::Right => (&corners.bottom_right, &corners.top_right),
            HandleSide::Left => (&corners.bottom_left, &corners.top_left),
            HandleSide::Back => (&corners.bottom_right, &corners.bottom_left),
            _ => (&corners.top_right, &corners.top_left),
        };
        let (band_start, band_end) = self.config.handle_band;
        project_point_on_segment(&view_center, start, end, band_start, band_end, height)
    }

    /// Rewrites the box volume and handle positions in the entity snapshot.
    pub fn refresh_entities(&self, view: &dyn SceneView, scene: &mut Scene) {
        let corners = &self.bbox.corners;
        let ring = [
            corners.bottom_right,
            corners.bottom_left,
            corners.top_left,
            corners.top_right,
            corners.bottom_right,
        ];
        let bottom = height_of(&self.bbox.center) - self.bbox.height / 2.0;
        scene.entities.box_volume = Some(BoxVolume {
            positions: update_height_for_positions(&ring, bottom),
            shape: vec![
                Vector2::zeros(),
                Vector2::zeros(),
                Vector2::new(1.0, 0.0),
                Vector2::new(0.0, self.bbox.height),
            ],
            show: self.show_box,
            material: SLICING_GEOMETRY_COLOR.with_alpha(BOX_VOLUME_ALPHA),
        });
        self.arrows
            .update_positions(&mut scene.entities, |side| self.arrow_position(side, view));
    }

    /// Shows or hides the box volume and its handles. Clipping is unaffected.
    pub fn toggle_box_visibility(&mut self, show: bool, scene: &mut Scene) {
        self.show_box = show;
        if let Some(volume) = scene.entities.box_volume.as_mut() {
            volume.show = show;
        }
        self.arrows
            .toggle_arrows_visibility(&mut scene.entities, show && !self.exaggerated);
        self.on_box_planes_change();
    }

    /// Handles are hidden while the terrain is exaggerated.
    pub fn on_exaggeration_changed(&mut self, exaggeration: Real, scene: &mut Scene) {
        self.exaggerated = exaggeration > 1.0;
        self.arrows
            .toggle_arrows_visibility(&mut scene.entities, self.show_box && !self.exaggerated);
    }

    pub fn on_left_down(&mut self, position: &Point2<Real>, view: &dyn SceneView, scene: &mut Scene) -> bool {
        self.arrows.on_left_down(position, view, scene)
    }

    pub fn on_mouse_move(&mut self, position: &Point2<Real>, view: &dyn SceneView, scene: &mut Scene) {
        if let Some(handle_move) = self.arrows.on_mouse_move(position, view, scene, &self.bbox.corners) {
            self.on_plane_move(handle_move.side, handle_move.amount, handle_move.vector, view, scene);
        }
    }

    pub fn on_left_up(&mut self, scene: &mut Scene) {
        self.arrows.on_left_up(scene);
    }
}

/// Moves the down or up limit by `amount` (positive downward). When the box
/// would get thinner than `min_size` both limits move instead.
fn move_vertical_limit(bbox: &mut BBox, side: HandleSide, amount: Real, min_size: Real) -> bool {
    let new_height = match side {
        HandleSide::Down => bbox.height + amount,
        _ => bbox.height - amount,
    };
    let translate = new_height < min_size;
    match side {
        HandleSide::Down => bbox.lower_limit -= amount,
        _ if translate => bbox.lower_limit -= amount,
        _ => {},
    }
    if !translate {
        bbox.height = new_height;
    }
    translate
}

impl SlicingTool for SlicingBox {
    fn activate(
        options: &mut SliceOptions,
        config: &SlicerConfig,
        view: &dyn SceneView,
        scene: &mut Scene,
    ) -> Result<Self, SlicingError> {
        let slice_type = options.slice_type.ok_or(SlicingError::UnknownSliceType(None))?;
        let bbox = if options.slice_points.is_empty() {
            get_bbox_from_view_ratio(view, &scene.globe, config.view_ratio)?
        } else {
            get_bbox_from_rectangle(&options.slice_points, view, &scene.globe, options.lower_limit, options.height)?
        };
        let negate = options.negate;
        let frame_origin = with_height(&nalgebra::center(&bbox.corners.bottom_right, &bbox.corners.top_left), 0.0);
        let arrows_list = if negate {
            SLICE_BOX_ARROWS_INSIDE
        } else {
            SLICE_BOX_ARROWS_OUTSIDE
        };

        let mut tool = SlicingBox {
            config: config.clone(),
            slice_type,
            negate,
            box_frame: east_north_up_to_fixed_frame(&frame_origin),
            side_planes: SidePlanes::from_corners(&bbox.corners, negate),
            z_planes: [Plane::new(Vector3::z(), 0.0), Plane::new(-Vector3::z(), 0.0)],
            show_box: true,
            exaggerated: false,
            arrows: SlicerArrows::new(arrows_list, bbox.orientation),
            tile_transforms: HashMap::new(),
            sync_callback: options.callbacks.sync_box_planes.take(),
            bbox,
        };
        tool.update_z_planes();

        tool.arrows.show(&mut scene.entities, |side| tool.arrow_position(side, view));
        tool.refresh_entities(view, scene);

        scene.globe.clipping_planes = Some(tool.new_collection());
        for tileset in scene.tilesets.iter_mut().filter(|t| t.is_loaded()) {
            tileset.clipping_planes = Some(tool.new_collection());
        }
        for voxel in scene.voxels.iter_mut() {
            voxel.clipping_planes = Some(tool.new_collection());
        }
        tool.sync_planes(scene);

        if let Some(show) = options.show_box {
            tool.toggle_box_visibility(show, scene);
        }
        debug!(
            %slice_type,
            negate,
            width = tool.bbox.width,
            length = tool.bbox.length,
            height = tool.bbox.height,
            "box slicing activated"
        );
        Ok(tool)
    }

    fn deactivate(mut self, scene: &mut Scene) {
        self.arrows.hide(scene);
        debug!(cached_tilesets = self.tile_transforms.len(), "box slicing deactivated");
    }

    fn add_clipping_planes(&mut self, tileset: TilesetId, scene: &mut Scene) {
        let collection = self.new_collection();
        match scene.tileset_mut(tileset) {
            Some(target) if target.is_loaded() => target.clipping_planes = Some(collection),
            Some(_) => {
                trace!(tileset = tileset.0, "tileset not loaded yet");
                return;
            },
            None => return,
        }
        self.sync_planes(scene);
    }

    fn add_voxel_clipping_planes(&mut self, voxel: VoxelId, scene: &mut Scene) {
        let mut collection = self.new_collection();
        self.update_box_voxel_clipping_planes(&mut collection);
        if let Some(target) = scene.voxel_mut(voxel) {
            target.clipping_planes = Some(collection);
        }
    }
}
