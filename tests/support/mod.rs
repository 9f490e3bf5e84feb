//! Test support library
//! A scripted top-down camera and a few ready-made scenes.
#![allow(dead_code)]

use globe_slicer::{
    float_types::{
        Real,
        parry3d::bounding_volume::BoundingSphere,
    },
    geodesy::{
        Cartographic, Rectangle, cartesian_from_degrees, east_north_up_to_fixed_frame,
        transforms::east_north_up_axes,
    },
    scene::{Scene, SceneView, Tileset, TilesetId, VoxelId, VoxelPrimitive},
};
use nalgebra::{Matrix4, Point2, Point3};
use std::cell::RefCell;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

pub fn points_approx_eq(a: &Point3<Real>, b: &Point3<Real>, eps: Real) -> bool {
    nalgebra::distance(a, b) < eps
}

/// Roughly the extent of Switzerland.
pub fn map_rectangle() -> Rectangle {
    Rectangle::from_degrees(5.14, 45.4, 11.47, 48.23)
}

/// Camera looking straight down at a ground point.
///
/// The screen is a tangent-plane projection at the view center with a fixed
/// ground resolution, so pixel deltas convert to meters exactly.
pub struct MockView {
    pub center: Point3<Real>,
    pub view_rectangle: Option<Rectangle>,
    pub heading: Real,
    pub underground: bool,
    pub terrain_height: Option<Real>,
    /// Terrain rise in meters per degree of longitude east of the view center
    pub terrain_slope: Real,
    pub center_longitude: Real,
    pub meters_per_pixel: Real,
    pub viewport: (Real, Real),
    /// Entity id returned by every pick
    pub picked: RefCell<Option<String>>,
}

impl MockView {
    /// Looks at `(longitude, latitude)` and sees `span_lon` by `span_lat` degrees.
    pub fn looking_at(longitude: Real, latitude: Real, span_lon: Real, span_lat: Real) -> Self {
        MockView {
            center: cartesian_from_degrees(longitude, latitude, 0.0),
            view_rectangle: Some(Rectangle::from_degrees(
                longitude - span_lon / 2.0,
                latitude - span_lat / 2.0,
                longitude + span_lon / 2.0,
                latitude + span_lat / 2.0,
            )),
            heading: 0.0,
            underground: false,
            terrain_height: Some(0.0),
            terrain_slope: 0.0,
            center_longitude: longitude,
            meters_per_pixel: 20.0,
            viewport: (1920.0, 1080.0),
            picked: RefCell::new(None),
        }
    }

    pub fn with_heading(mut self, heading_degrees: Real) -> Self {
        self.heading = heading_degrees.to_radians();
        self
    }

    pub fn with_terrain(mut self, height: Real) -> Self {
        self.terrain_height = Some(height);
        self
    }

    /// Terrain at `height` under the view center, rising eastward.
    pub fn with_sloped_terrain(mut self, height: Real, meters_per_degree: Real) -> Self {
        self.terrain_height = Some(height);
        self.terrain_slope = meters_per_degree;
        self
    }

    pub fn pick_returns(&self, id: Option<String>) {
        *self.picked.borrow_mut() = id;
    }
}

impl SceneView for MockView {
    fn pick_center(&self) -> Point3<Real> {
        self.center
    }

    fn pick_center_on_ellipsoid(&self) -> Option<Point3<Real>> {
        Some(self.center)
    }

    fn view_rectangle(&self) -> Option<Rectangle> {
        self.view_rectangle
    }

    fn camera_heading(&self) -> Real {
        self.heading
    }

    fn camera_underground(&self) -> bool {
        self.underground
    }

    fn terrain_height(&self, cartographic: &Cartographic) -> Option<Real> {
        let east = cartographic.longitude.to_degrees() - self.center_longitude;
        self.terrain_height.map(|h| h + self.terrain_slope * east)
    }

    fn world_to_screen(&self, position: &Point3<Real>) -> Option<Point2<Real>> {
        let (east, north, _) = east_north_up_axes(&self.center);
        let (sin, cos) = self.heading.sin_cos();
        let forward = north * cos + east * sin;
        let right = east * cos - north * sin;
        let offset = position - self.center;
        Some(Point2::new(
            self.viewport.0 / 2.0 + offset.dot(&right) / self.meters_per_pixel,
            self.viewport.1 / 2.0 - offset.dot(&forward) / self.meters_per_pixel,
        ))
    }

    fn pixel_size(&self, _position: &Point3<Real>) -> Real {
        self.meters_per_pixel
    }

    fn pick(&self, _window_position: &Point2<Real>) -> Option<String> {
        self.picked.borrow().clone()
    }
}

/// Tileset with an identity root whose content sits on the surface.
pub fn surface_tileset(id: u32, longitude: Real, latitude: Real, height: Real) -> Tileset {
    let center = cartesian_from_degrees(longitude, latitude, height);
    Tileset::loaded(TilesetId(id), Matrix4::identity(), BoundingSphere::new(center, 2_000.0))
}

/// Tileset placed by an east-north-up root transform, content around its local origin.
pub fn placed_tileset(id: u32, longitude: Real, latitude: Real) -> Tileset {
    let root = east_north_up_to_fixed_frame(&cartesian_from_degrees(longitude, latitude, 0.0));
    Tileset::loaded(TilesetId(id), root, BoundingSphere::new(Point3::origin(), 2_000.0))
}

/// Tileset with an identity root and a sphere far below any terrain.
pub fn deep_tileset(id: u32) -> Tileset {
    Tileset::loaded(TilesetId(id), Matrix4::identity(), BoundingSphere::new(Point3::origin(), 7_000_000.0))
}

/// Map scene with one tileset of each positioning kind around `(longitude, latitude)`
/// and one voxel primitive.
pub fn scene_with_tilesets(longitude: Real, latitude: Real) -> Scene {
    let mut scene = Scene::new(map_rectangle());
    scene.add_tileset(surface_tileset(1, longitude, latitude, 300.0));
    scene.add_tileset(placed_tileset(2, longitude + 0.005, latitude + 0.005));
    scene.add_tileset(deep_tileset(3));
    scene.add_voxel(VoxelPrimitive::new(VoxelId(1)));
    scene
}

pub fn ground(longitude: Real, latitude: Real, height: Real) -> Point3<Real> {
    cartesian_from_degrees(longitude, latitude, height)
}
