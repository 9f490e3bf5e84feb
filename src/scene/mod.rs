//! The parts of the host 3D engine the slicer reads from and writes to.
//!
//! [`SceneView`] answers camera, terrain and picking queries. [`Scene`]
//! holds the mutable targets: the globe, tileset and voxel clipping slots, the
//! camera input flag and the slicer's own entity snapshot.

use crate::clipping::ClippingPlaneCollection;
use crate::float_types::Real;
use crate::geodesy::{Cartographic, Rectangle};
use nalgebra::{Point2, Point3};

pub mod entities;
pub mod tileset;
pub mod voxel;

pub use entities::{BoxVolume, Color, EntityCollection, HandleEntity};
pub use tileset::{TileRoot, Tileset, TilesetId};
pub use voxel::{VoxelId, VoxelPrimitive};

/// Camera, terrain and picking queries answered by the host engine.
///
/// Window positions are in pixels with the origin at the top-left corner and
/// `y` growing downward.
pub trait SceneView {
    /// Globe position under the viewport center, or the camera position when
    /// the globe is not hit.
    fn pick_center(&self) -> Point3<Real>;

    /// Ellipsoid position under the viewport center, ignoring terrain.
    fn pick_center_on_ellipsoid(&self) -> Option<Point3<Real>>;

    /// Geographic extent currently visible, `None` when the ellipsoid is not in view.
    fn view_rectangle(&self) -> Option<Rectangle>;

    /// Camera heading in radians, clockwise from north.
    fn camera_heading(&self) -> Real;

    fn camera_underground(&self) -> bool;

    /// Terrain height at the given position, `None` while the tile is not loaded.
    fn terrain_height(&self, cartographic: &Cartographic) -> Option<Real>;

    /// Window position of a world position, `None` when behind the camera.
    fn world_to_screen(&self, position: &Point3<Real>) -> Option<Point2<Real>>;

    /// Size in meters of one pixel at the distance of `position`.
    fn pixel_size(&self, position: &Point3<Real>) -> Real;

    /// Id of the entity drawn at `window_position`, if any.
    fn pick(&self, window_position: &Point2<Real>) -> Option<String>;
}

/// Globe clipping slot and map extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Globe {
    pub clipping_planes: Option<ClippingPlaneCollection>,
    /// The globe is only rendered inside this rectangle
    pub cartographic_limit_rectangle: Rectangle,
}

impl Globe {
    pub const fn new(cartographic_limit_rectangle: Rectangle) -> Self {
        Globe {
            clipping_planes: None,
            cartographic_limit_rectangle,
        }
    }

    /// Whether the globe surface at world position `point` is cut away.
    pub fn is_point_clipped(&self, point: &Point3<Real>) -> bool {
        let Some(cpc) = &self.clipping_planes else {
            return false;
        };
        match cpc.model_matrix.try_inverse() {
            Some(to_planes) => cpc.is_clipped(&to_planes.transform_point(point)),
            None => false,
        }
    }
}

/// Shared camera input switch, turned off while a handle is dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraController {
    pub enable_inputs: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        CameraController { enable_inputs: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Shown over a draggable handle
    Pointer,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub globe: Globe,
    pub tilesets: Vec<Tileset>,
    pub voxels: Vec<VoxelPrimitive>,
    pub camera_controller: CameraController,
    /// Entities owned by the slicer (box volume and handles)
    pub entities: EntityCollection,
    pub cursor: Cursor,
}

impl Scene {
    pub fn new(map_rectangle: Rectangle) -> Self {
        Scene {
            globe: Globe::new(map_rectangle),
            tilesets: Vec::new(),
            voxels: Vec::new(),
            camera_controller: CameraController::default(),
            entities: EntityCollection::default(),
            cursor: Cursor::Default,
        }
    }

    pub fn add_tileset(&mut self, tileset: Tileset) {
        self.tilesets.push(tileset);
    }

    pub fn tileset(&self, id: TilesetId) -> Option<&Tileset> {
        self.tilesets.iter().find(|t| t.id() == id)
    }

    pub fn tileset_mut(&mut self, id: TilesetId) -> Option<&mut Tileset> {
        self.tilesets.iter_mut().find(|t| t.id() == id)
    }

    pub fn add_voxel(&mut self, voxel: VoxelPrimitive) {
        self.voxels.push(voxel);
    }

    pub fn voxel(&self, id: VoxelId) -> Option<&VoxelPrimitive> {
        self.voxels.iter().find(|v| v.id() == id)
    }

    pub fn voxel_mut(&mut self, id: VoxelId) -> Option<&mut VoxelPrimitive> {
        self.voxels.iter_mut().find(|v| v.id() == id)
    }
}
