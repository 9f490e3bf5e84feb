//! Local frames on the ellipsoid.

use crate::float_types::{EPSILON, Real};
use crate::geodesy::Ellipsoid;
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

/// East, north and up unit vectors at `origin`.
pub fn east_north_up_axes(origin: &Point3<Real>) -> (Vector3<Real>, Vector3<Real>, Vector3<Real>) {
    let up = Ellipsoid::WGS84
        .geodetic_surface_normal(origin)
        .unwrap_or_else(Vector3::z);

    // At the poles east is undefined; pick the +y axis like the host engine does.
    let east = Vector3::new(-origin.y, origin.x, 0.0);
    let east = if east.norm_squared() < EPSILON {
        Vector3::new(0.0, up.z.signum(), 0.0)
    } else {
        east.normalize()
    };
    let north = up.cross(&east);
    (east, north, up)
}

/// Local east-north-up frame at `origin`, as a local-to-world matrix.
/// Columns are east, north, up and the origin itself.
pub fn east_north_up_to_fixed_frame(origin: &Point3<Real>) -> Matrix4<Real> {
    let (east, north, up) = east_north_up_axes(origin);
    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 1>(0, 0).copy_from(&east);
    m.fixed_view_mut::<3, 1>(0, 1).copy_from(&north);
    m.fixed_view_mut::<3, 1>(0, 2).copy_from(&up);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(&origin.coords);
    m
}

/// World orientation of a heading/pitch/roll given in the east-north-up frame at `origin`.
///
/// Heading is clockwise from north, i.e. a rotation about the negative up axis.
pub fn heading_pitch_roll_quaternion(
    origin: &Point3<Real>,
    heading: Real,
    pitch: Real,
    roll: Real,
) -> UnitQuaternion<Real> {
    let roll_q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), roll);
    let pitch_q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -pitch);
    let heading_q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -heading);
    let local = heading_q * pitch_q * roll_q;

    let (east, north, up) = east_north_up_axes(origin);
    let frame = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[east, north, up]));
    UnitQuaternion::from_rotation_matrix(&frame) * local
}
