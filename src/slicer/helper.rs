//! Geometry shared by the slicing tools.

use crate::clipping::ClippingPlaneCollection;
use crate::config::{BELOW_TERRAIN_HEIGHT, SLICING_BOX_HEIGHT, SLICING_BOX_LOWER_LIMIT, SLICING_BOX_MIN_SIZE};
use crate::errors::SlicingError;
use crate::float_types::{EPSILON, KILOMETER, Real};
use crate::geodesy::transforms::east_north_up_axes;
use crate::geodesy::{Cartographic, Rectangle, east_north_up_to_fixed_frame, heading_pitch_roll_quaternion, with_height};
use crate::plane::Plane;
use crate::scene::{Globe, SceneView, Tileset};
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// The four ground corners of a slicing box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxCorners {
    pub bottom_right: Point3<Real>,
    pub bottom_left: Point3<Real>,
    pub top_right: Point3<Real>,
    pub top_left: Point3<Real>,
}

impl BoxCorners {
    /// bottomRight, bottomLeft, topRight, topLeft
    pub const fn to_array(&self) -> [Point3<Real>; 4] {
        [self.bottom_right, self.bottom_left, self.top_right, self.top_left]
    }

    /// Midpoint of the bottom-right to top-left diagonal.
    pub fn footprint_center(&self) -> Point3<Real> {
        nalgebra::center(&self.top_left, &self.bottom_right)
    }

    /// Moves every corner back to ellipsoid height zero.
    pub fn project_to_ground(&mut self) {
        for corner in [&mut self.bottom_right, &mut self.bottom_left, &mut self.top_right, &mut self.top_left] {
            *corner = with_height(corner, 0.0);
        }
    }
}

/// Live state of the box tool.
#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    pub center: Point3<Real>,
    /// Distance topLeft to bottomLeft
    pub width: Real,
    /// Distance bottomRight to bottomLeft
    pub length: Real,
    pub height: Real,
    /// Absolute ellipsoid height of the box bottom
    pub lower_limit: Real,
    /// Terrain height under the center when the box was derived
    pub altitude: Real,
    pub corners: BoxCorners,
    pub orientation: Option<UnitQuaternion<Real>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxHeight {
    pub lower_limit: Real,
    pub height: Real,
}

const SMALL_AREA: Real = 0.005;
const LARGE_AREA: Real = 25.0;
const SMALL_BOX: BoxHeight = BoxHeight { lower_limit: -150.0, height: 300.0 };
const LARGE_BOX: BoxHeight = BoxHeight { lower_limit: SLICING_BOX_LOWER_LIMIT, height: SLICING_BOX_HEIGHT };

/// Starting vertical extent for a footprint of `area` square kilometers.
///
/// The lower limit is relative to the terrain; callers add the altitude.
pub fn calculate_box_height(area: Real) -> BoxHeight {
    if area <= SMALL_AREA {
        return SMALL_BOX;
    }
    if area >= LARGE_AREA {
        return LARGE_BOX;
    }
    let t = (area - SMALL_AREA) / (LARGE_AREA - SMALL_AREA);
    BoxHeight {
        lower_limit: SMALL_BOX.lower_limit + (LARGE_BOX.lower_limit - SMALL_BOX.lower_limit) * t,
        height: SMALL_BOX.height + (LARGE_BOX.height - SMALL_BOX.height) * t,
    }
}

fn cartographic_of(point: &Point3<Real>) -> Result<Cartographic, SlicingError> {
    Cartographic::from_cartesian(point).ok_or(SlicingError::InvalidCoordinate(*point))
}

/// Terrain height under `point`, zero while the terrain there is not loaded.
pub fn terrain_altitude(view: &dyn SceneView, point: &Point3<Real>) -> Real {
    Cartographic::from_cartesian(point)
        .and_then(|c| view.terrain_height(&c))
        .unwrap_or(0.0)
}

fn midpoint(a: &Point3<Real>, b: &Point3<Real>) -> Point3<Real> {
    nalgebra::center(a, b)
}

fn footprint_area(width: Real, length: Real) -> Real {
    (width / KILOMETER) * (length / KILOMETER)
}

/// Box covering `ratio` of the current view, with its bottom-left corner at
/// the view center.
pub fn get_bbox_from_view_ratio(view: &dyn SceneView, globe: &Globe, ratio: Real) -> Result<BBox, SlicingError> {
    let scene_center = view.pick_center();
    let mut slicing_center = cartographic_of(&scene_center)?.with_height(0.0);
    let map_rect = globe.cartographic_limit_rectangle;

    // nearest position on the map
    let map_southwest = map_rect.southwest();
    slicing_center.longitude = slicing_center.longitude.max(map_southwest.longitude);
    slicing_center.latitude = slicing_center.latitude.max(map_southwest.latitude);
    if !map_rect.contains(&slicing_center) {
        slicing_center = map_rect.center();
    }

    let mut view_rect = view.view_rectangle().unwrap_or(map_rect);
    if view_rect.width() > map_rect.width() || view_rect.height() > map_rect.height() {
        view_rect = map_rect;
    }

    let map_northeast = map_rect.northeast();
    let mut northeast_lon = slicing_center.longitude + ratio * view_rect.width();
    let mut northeast_lat = slicing_center.latitude + ratio * view_rect.height();
    if !map_rect.contains(&Cartographic::from_radians(northeast_lon, northeast_lat, 0.0)) {
        northeast_lon = northeast_lon.min(map_northeast.longitude);
        northeast_lat = northeast_lat.min(map_northeast.latitude);
    }

    let bottom_left = slicing_center.to_cartesian();
    let bottom_right = Cartographic::from_radians(northeast_lon, slicing_center.latitude, 0.0).to_cartesian();
    let top_left = Cartographic::from_radians(slicing_center.longitude, northeast_lat, 0.0).to_cartesian();
    let top_right = Cartographic::from_radians(northeast_lon, northeast_lat, 0.0).to_cartesian();

    let center = midpoint(&top_left, &bottom_right);
    let width = nalgebra::distance(&top_left, &bottom_left);
    let length = nalgebra::distance(&bottom_right, &bottom_left);

    let cart_center = cartographic_of(&center)?;
    let altitude = terrain_altitude(view, &center);
    let BoxHeight { lower_limit, height } = calculate_box_height(footprint_area(width, length));
    let lower_limit = lower_limit + altitude;

    Ok(BBox {
        center: cart_center.with_height(height / 2.0 + lower_limit).to_cartesian(),
        width,
        length,
        height,
        lower_limit,
        altitude,
        corners: BoxCorners { bottom_right, bottom_left, top_right, top_left },
        orientation: None,
    })
}

/// Box from four user-given corners in any order.
///
/// `lower_limit` is relative to the terrain under the center. When neither
/// limit is given the extent comes from [`calculate_box_height`].
pub fn get_bbox_from_rectangle(
    positions: &[Point3<Real>],
    view: &dyn SceneView,
    globe: &Globe,
    lower_limit: Option<Real>,
    height: Option<Real>,
) -> Result<BBox, SlicingError> {
    if positions.len() != 4 {
        return Err(SlicingError::InvalidSlicePoints { expected: 4, found: positions.len() });
    }
    let mut cartos = positions.iter().map(cartographic_of).collect::<Result<Vec<_>, _>>()?;

    // two smallest longitudes are the left side
    cartos.sort_by(|a, b| a.longitude.total_cmp(&b.longitude));
    let by_latitude = |a: Cartographic, b: Cartographic| if a.latitude <= b.latitude { (a, b) } else { (b, a) };
    let (bottom_left, top_left) = by_latitude(cartos[0], cartos[1]);
    let (bottom_right, top_right) = by_latitude(cartos[2], cartos[3]);

    let corners = BoxCorners {
        bottom_right: bottom_right.with_height(0.0).to_cartesian(),
        bottom_left: bottom_left.with_height(0.0).to_cartesian(),
        top_right: top_right.with_height(0.0).to_cartesian(),
        top_left: top_left.with_height(0.0).to_cartesian(),
    };
    let center = corners.footprint_center();

    // rotation of the box top edge against the map top edge
    let map_rect = globe.cartographic_limit_rectangle;
    let map_northwest = map_rect.northwest().to_cartesian();
    let map_northeast = map_rect.northeast().to_cartesian();
    let top_vector = map_northwest - map_northeast;
    let line_vector = corners.top_left - corners.top_right;
    let (east, _, _) = east_north_up_axes(&center);
    let direction = if (corners.top_left - corners.bottom_left).dot(&east) >= 0.0 { 1.0 } else { -1.0 };
    let angle = top_vector.angle(&line_vector) * direction;

    let cart_center = cartographic_of(&center)?;
    let altitude = terrain_altitude(view, &center);
    let width = nalgebra::distance(&corners.top_left, &corners.bottom_left);
    let length = nalgebra::distance(&corners.bottom_right, &corners.bottom_left);

    let BoxHeight { lower_limit, height } = match (lower_limit, height) {
        (None, None) => calculate_box_height(footprint_area(width, length)),
        (lower_limit, height) => BoxHeight {
            lower_limit: lower_limit.unwrap_or(SLICING_BOX_LOWER_LIMIT),
            height: height.unwrap_or(SLICING_BOX_HEIGHT),
        },
    };
    let lower_limit = lower_limit + altitude;

    Ok(BBox {
        center: cart_center.with_height(height / 2.0 + lower_limit).to_cartesian(),
        width,
        length,
        height,
        lower_limit,
        altitude,
        corners,
        orientation: Some(heading_pitch_roll_quaternion(&center, angle, 0.0, 0.0)),
    })
}

/// Clipping-plane collection with the renderer defaults (enabled, unit edge).
pub fn create_clipping_planes(planes: Vec<Plane>, union_clipping_regions: bool) -> ClippingPlaneCollection {
    ClippingPlaneCollection::new(planes, union_clipping_regions)
}

/// World-to-local matrix for a tileset positioned by its bounding sphere.
///
/// The world frame is the east-north-up frame at the sphere center when that
/// center is above [`BELOW_TERRAIN_HEIGHT`], the fixed frame otherwise.
/// `None` while the tileset is loading or when an origin is singular.
pub fn create_cpc_model_matrix_from_sphere(tileset: &Tileset) -> Option<Matrix4<Real>> {
    let center = tileset.bounding_sphere()?.center;
    tileset.root()?;
    let global = match Cartographic::from_cartesian(&center) {
        Some(c) if c.height > BELOW_TERRAIN_HEIGHT => east_north_up_to_fixed_frame(&center),
        _ => Matrix4::identity(),
    };
    let to_local = tileset.clipping_planes_origin_matrix().try_inverse()?;
    let inverse_reference = tileset.initial_clipping_planes_origin_matrix().try_inverse()?;
    Some(inverse_reference * to_local * global)
}

/// Moves the edge `position1`-`position2` by `move_vector`.
///
/// When the edge would cross the opposite edge's plane, or shrink the box
/// below [`SLICING_BOX_MIN_SIZE`], the opposite edge moves by the same vector
/// and `true` is returned.
pub fn move_slicing_box_corners(
    position1: &mut Point3<Real>,
    position2: &mut Point3<Real>,
    opposite_position1: &mut Point3<Real>,
    opposite_position2: &mut Point3<Real>,
    opposite_plane: &Plane,
    move_vector: &Vector3<Real>,
) -> bool {
    move_slicing_box_corners_bounded(
        position1,
        position2,
        opposite_position1,
        opposite_position2,
        opposite_plane,
        move_vector,
        SLICING_BOX_MIN_SIZE,
    )
}

/// [`move_slicing_box_corners`] with an explicit minimum edge separation.
pub fn move_slicing_box_corners_bounded(
    position1: &mut Point3<Real>,
    position2: &mut Point3<Real>,
    opposite_position1: &mut Point3<Real>,
    opposite_position2: &mut Point3<Real>,
    opposite_plane: &Plane,
    move_vector: &Vector3<Real>,
    min_size: Real,
) -> bool {
    let distance = nalgebra::distance(position1, opposite_position1);
    *position1 += move_vector;
    *position2 += move_vector;
    let new_distance = nalgebra::distance(position1, opposite_position1);
    let direction = opposite_plane.point_distance(position1);
    if direction < 0.0 || (new_distance < min_size && new_distance < distance) {
        *opposite_position1 += move_vector;
        *opposite_position2 += move_vector;
        return true;
    }
    false
}

/// Projects `point` onto the segment, keeps it within the `[band_start, band_end]`
/// fraction of the segment and moves it to ellipsoid `height`.
pub fn project_point_on_segment(
    point: &Point3<Real>,
    start: &Point3<Real>,
    end: &Point3<Real>,
    band_start: Real,
    band_end: Real,
    height: Real,
) -> Point3<Real> {
    let axis = end - start;
    let length_squared = axis.norm_squared();
    let t = if length_squared < EPSILON {
        band_start
    } else {
        ((point - start).dot(&axis) / length_squared).clamp(band_start, band_end)
    };
    with_height(&(start + axis * t), height)
}

/// Copies of `positions` moved to ellipsoid `height`.
pub fn update_height_for_positions(positions: &[Point3<Real>], height: Real) -> Vec<Point3<Real>> {
    positions.iter().map(|p| with_height(p, height)).collect()
}

/// Two ground points through the view center, orthogonal to the camera
/// heading and as far apart as the view rectangle is wide.
pub fn get_orthogonal_view_points(view: &dyn SceneView, fallback_rect: &Rectangle) -> Result<[Point3<Real>; 2], SlicingError> {
    let center = match view.pick_center_on_ellipsoid() {
        Some(center) => center,
        None => with_height(&view.pick_center(), 0.0),
    };
    cartographic_of(&center)?;

    let view_rect = view.view_rectangle().unwrap_or(*fallback_rect);
    let west = midpoint(&view_rect.northwest().to_cartesian(), &view_rect.southwest().to_cartesian());
    let east_point = midpoint(&view_rect.northeast().to_cartesian(), &view_rect.southeast().to_cartesian());
    let half_length = nalgebra::distance(&west, &east_point) / 2.0;

    let heading = view.camera_heading();
    let (east, north, _) = east_north_up_axes(&center);
    let right = east * heading.cos() - north * heading.sin();

    let left = with_height(&(center - right * half_length), 0.0);
    let right = with_height(&(center + right * half_length), 0.0);
    Ok([left, right])
}
