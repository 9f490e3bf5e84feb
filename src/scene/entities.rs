//! Plain-data snapshot of the entities the slicer draws.
//!
//! The slicer rewrites these on every refresh; the renderer only reads them.

use crate::float_types::Real;
use crate::slicer::arrows::HandleSide;
use nalgebra::{Point3, UnitQuaternion, Vector2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Color { red, green, blue, alpha }
    }

    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Ground polyline extruded along `shape` into the visible box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxVolume {
    /// Closed footprint ring at the box bottom height
    pub positions: Vec<Point3<Real>>,
    /// Cross-section swept along `positions`
    pub shape: Vec<Vector2<Real>>,
    pub show: bool,
    pub material: Color,
}

/// A draggable arrow model.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleEntity {
    pub id: String,
    pub side: HandleSide,
    pub opposite_side: HandleSide,
    pub uri: &'static str,
    pub position: Point3<Real>,
    pub orientation: Option<UnitQuaternion<Real>>,
    pub color: Color,
    pub show: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCollection {
    pub box_volume: Option<BoxVolume>,
    pub handles: Vec<HandleEntity>,
}

impl EntityCollection {
    pub fn handle(&self, side: HandleSide) -> Option<&HandleEntity> {
        self.handles.iter().find(|h| h.side == side)
    }

    pub fn handle_mut(&mut self, side: HandleSide) -> Option<&mut HandleEntity> {
        self.handles.iter_mut().find(|h| h.side == side)
    }

    pub fn handle_by_id(&self, id: &str) -> Option<&HandleEntity> {
        self.handles.iter().find(|h| h.id == id)
    }

    pub fn remove_all(&mut self) {
        self.box_volume = None;
        self.handles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.box_volume.is_none() && self.handles.is_empty()
    }
}
