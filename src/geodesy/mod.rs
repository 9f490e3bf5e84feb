//! Geodetic primitives on the WGS84 ellipsoid.
//!
//! World positions are earth-centered, earth-fixed Cartesian coordinates in
//! meters. [`Cartographic`] holds longitude/latitude in radians plus the
//! height above the ellipsoid.

use crate::float_types::{EPSILON, Real};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

pub mod rectangle;
pub mod transforms;

pub use rectangle::Rectangle;
pub use transforms::{east_north_up_to_fixed_frame, heading_pitch_roll_quaternion};

/// Positions closer than this (in scaled squared units) to the ellipsoid
/// center are projected radially instead of along the surface normal.
const CENTER_TOLERANCE_SQUARED: Real = 0.1;
const SURFACE_ITERATION_LIMIT: usize = 64;

/// A triaxial ellipsoid, in practice always [`Ellipsoid::WGS84`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    radii_squared: Vector3<Real>,
    one_over_radii_squared: Vector3<Real>,
}

impl Ellipsoid {
    /// The WGS84 reference ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid::from_radii(6378137.0, 6378137.0, 6356752.3142451793);

    pub const fn from_radii(x: Real, y: Real, z: Real) -> Self {
        Ellipsoid {
            radii_squared: Vector3::new(x * x, y * y, z * z),
            one_over_radii_squared: Vector3::new(1.0 / (x * x), 1.0 / (y * y), 1.0 / (z * z)),
        }
    }

    /// Unit normal of the surface at the given geographic position.
    pub fn geodetic_surface_normal_cartographic(&self, cartographic: &Cartographic) -> Vector3<Real> {
        let cos_latitude = cartographic.latitude.cos();
        Vector3::new(
            cos_latitude * cartographic.longitude.cos(),
            cos_latitude * cartographic.longitude.sin(),
            cartographic.latitude.sin(),
        )
        .normalize()
    }

    /// Unit normal of the ellipsoid surface passing through `position`.
    /// `None` at the ellipsoid center.
    pub fn geodetic_surface_normal(&self, position: &Point3<Real>) -> Option<Vector3<Real>> {
        if position.coords.norm_squared() < EPSILON {
            return None;
        }
        Some(position.coords.component_mul(&self.one_over_radii_squared).normalize())
    }

    pub fn cartographic_to_cartesian(&self, cartographic: &Cartographic) -> Point3<Real> {
        let n = self.geodetic_surface_normal_cartographic(cartographic);
        let k = self.radii_squared.component_mul(&n);
        let gamma = n.dot(&k).sqrt();
        Point3::from(k / gamma + n * cartographic.height)
    }

    /// Projects `position` onto the surface along the geodetic normal.
    pub fn scale_to_geodetic_surface(&self, position: &Point3<Real>) -> Option<Point3<Real>> {
        let p = position.coords;
        if !p.iter().all(|c| c.is_finite()) {
            return None;
        }
        let inv = &self.one_over_radii_squared;
        let x2 = p.x * p.x * inv.x;
        let y2 = p.y * p.y * inv.y;
        let z2 = p.z * p.z * inv.z;

        let squared_norm = x2 + y2 + z2;
        let ratio = (1.0 / squared_norm).sqrt();
        if !ratio.is_finite() {
            return None;
        }
        let intersection = p * ratio;
        if squared_norm < CENTER_TOLERANCE_SQUARED {
            return Some(Point3::from(intersection));
        }

        let gradient = intersection.component_mul(inv) * 2.0;
        let mut lambda = (1.0 - ratio) * p.norm() / (0.5 * gradient.norm());
        let mut correction: Real = 0.0;
        let mut multiplier = Vector3::new(1.0, 1.0, 1.0);

        for _ in 0..SURFACE_ITERATION_LIMIT {
            lambda -= correction;

            multiplier = Vector3::new(
                1.0 / (1.0 + lambda * inv.x),
                1.0 / (1.0 + lambda * inv.y),
                1.0 / (1.0 + lambda * inv.z),
            );
            let m2 = multiplier.component_mul(&multiplier);
            let m3 = m2.component_mul(&multiplier);

            let func = x2 * m2.x + y2 * m2.y + z2 * m2.z - 1.0;
            if func.abs() <= 1e-12 {
                break;
            }

            let denominator = x2 * m3.x * inv.x + y2 * m3.y * inv.y + z2 * m3.z * inv.z;
            let derivative = -2.0 * denominator;
            correction = func / derivative;
        }

        Some(Point3::from(p.component_mul(&multiplier)))
    }

    pub fn cartesian_to_cartographic(&self, position: &Point3<Real>) -> Option<Cartographic> {
        let surface = self.scale_to_geodetic_surface(position)?;
        let n = self.geodetic_surface_normal(&surface)?;
        let h = position - surface;

        let longitude = n.y.atan2(n.x);
        let latitude = n.z.asin();
        let height = h.dot(&position.coords).signum() * h.norm();

        Some(Cartographic { longitude, latitude, height })
    }
}

/// A geographic position: longitude and latitude in radians, height in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cartographic {
    pub longitude: Real,
    pub latitude: Real,
    pub height: Real,
}

impl Cartographic {
    pub const fn from_radians(longitude: Real, latitude: Real, height: Real) -> Self {
        Cartographic { longitude, latitude, height }
    }

    pub fn from_degrees(longitude: Real, latitude: Real, height: Real) -> Self {
        Cartographic {
            longitude: longitude.to_radians(),
            latitude: latitude.to_radians(),
            height,
        }
    }

    /// `None` for positions at the ellipsoid center or with non-finite coordinates.
    pub fn from_cartesian(position: &Point3<Real>) -> Option<Self> {
        Ellipsoid::WGS84.cartesian_to_cartographic(position)
    }

    pub fn to_cartesian(&self) -> Point3<Real> {
        Ellipsoid::WGS84.cartographic_to_cartesian(self)
    }

    pub const fn with_height(mut self, height: Real) -> Self {
        self.height = height;
        self
    }
}

/// Shorthand for a WGS84 Cartesian position from degrees.
pub fn cartesian_from_degrees(longitude: Real, latitude: Real, height: Real) -> Point3<Real> {
    Cartographic::from_degrees(longitude, latitude, height).to_cartesian()
}

/// Geodetic "up" at `position`, falling back to the geocentric direction.
pub fn up_at(position: &Point3<Real>) -> Vector3<Real> {
    Ellipsoid::WGS84
        .geodetic_surface_normal(position)
        .unwrap_or_else(Vector3::z)
}

/// Height above the ellipsoid of `position`, zero when it has none.
pub fn height_of(position: &Point3<Real>) -> Real {
    Cartographic::from_cartesian(position).map_or(0.0, |c| c.height)
}

/// Returns `position` moved along its geodetic normal to `height`.
/// Positions that cannot be placed on the ellipsoid are returned unchanged.
pub fn with_height(position: &Point3<Real>, height: Real) -> Point3<Real> {
    match Cartographic::from_cartesian(position) {
        Some(c) => c.with_height(height).to_cartesian(),
        None => *position,
    }
}
