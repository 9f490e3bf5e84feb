//! Clipping-plane collections as handed to the globe and to tilesets.

use crate::float_types::Real;
use crate::plane::Plane;
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

/// Edge highlight width the renderer draws along the cut.
pub const DEFAULT_EDGE_WIDTH: Real = 1.0;

/// An ordered set of planes combined with union or intersection semantics.
///
/// With `union_clipping_regions` a point is clipped as soon as it is outside
/// any plane, so only the intersection of the kept half-spaces stays visible.
/// Without it a point is clipped only when it is outside every plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippingPlaneCollection {
    planes: Vec<Plane>,
    pub union_clipping_regions: bool,
    pub enabled: bool,
    pub edge_width: Real,
    /// Extra transform applied to the planes on top of the owner's origin frame
    pub model_matrix: Matrix4<Real>,
}

impl ClippingPlaneCollection {
    pub fn new(planes: Vec<Plane>, union_clipping_regions: bool) -> Self {
        ClippingPlaneCollection {
            planes,
            union_clipping_regions,
            enabled: true,
            edge_width: DEFAULT_EDGE_WIDTH,
            model_matrix: Matrix4::identity(),
        }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn add(&mut self, plane: Plane) {
        self.planes.push(plane);
    }

    pub fn remove_all(&mut self) {
        self.planes.clear();
    }

    /// Classifies a point given in the planes' own frame.
    /// Disabled or empty collections clip nothing.
    pub fn is_clipped(&self, point: &Point3<Real>) -> bool {
        self.classify(point, 1.0)
    }

    /// [`is_clipped`](Self::is_clipped) for renderers that keep the negative
    /// side of each plane.
    pub fn is_clipped_mirrored(&self, point: &Point3<Real>) -> bool {
        self.classify(point, -1.0)
    }

    fn classify(&self, point: &Point3<Real>, facing: Real) -> bool {
        if !self.enabled || self.planes.is_empty() {
            return false;
        }
        let mut outside = self
            .planes
            .iter()
            .map(|plane| facing * plane.point_distance(point) < 0.0);
        if self.union_clipping_regions {
            outside.any(|o| o)
        } else {
            outside.all(|o| o)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn slab() -> Vec<Plane> {
        // keeps 0 <= x <= 1
        vec![Plane::new(Vector3::x(), 0.0), Plane::new(-Vector3::x(), 1.0)]
    }

    #[test]
    fn union_keeps_the_intersection() {
        let cpc = ClippingPlaneCollection::new(slab(), true);
        assert!(!cpc.is_clipped(&Point3::new(0.5, 0.0, 0.0)));
        assert!(cpc.is_clipped(&Point3::new(-0.5, 0.0, 0.0)));
        assert!(cpc.is_clipped(&Point3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn intersection_clips_only_outside_all() {
        let planes: Vec<Plane> = slab().iter().map(Plane::negated).collect();
        let cpc = ClippingPlaneCollection::new(planes, false);
        assert!(cpc.is_clipped(&Point3::new(0.5, 0.0, 0.0)));
        assert!(!cpc.is_clipped(&Point3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn mirrored_keeps_the_negative_sides() {
        let planes: Vec<Plane> = slab().iter().map(Plane::negated).collect();
        let cpc = ClippingPlaneCollection::new(planes, true);
        assert!(!cpc.is_clipped_mirrored(&Point3::new(0.5, 0.0, 0.0)));
        assert!(cpc.is_clipped_mirrored(&Point3::new(1.5, 0.0, 0.0)));
        assert!(cpc.is_clipped(&Point3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn disabled_clips_nothing() {
        let mut cpc = ClippingPlaneCollection::new(slab(), true);
        cpc.enabled = false;
        assert!(!cpc.is_clipped(&Point3::new(-3.0, 0.0, 0.0)));
        cpc.enabled = true;
        cpc.remove_all();
        assert!(!cpc.is_clipped(&Point3::new(-3.0, 0.0, 0.0)));
    }
}
