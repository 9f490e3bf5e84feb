//! Cartographic rectangles (west/south/east/north in radians).
//!
//! Backed by a [`geo::Rect`] whose x axis is longitude and y axis latitude.
//! Rectangles crossing the antimeridian are not supported.

use crate::float_types::Real;
use crate::geodesy::Cartographic;
use geo::{Coord, Intersects, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    rect: Rect<Real>,
}

impl Rectangle {
    /// Bounds in radians. Swapped bounds are normalized.
    pub fn new(west: Real, south: Real, east: Real, north: Real) -> Self {
        Rectangle {
            rect: Rect::new(Coord { x: west, y: south }, Coord { x: east, y: north }),
        }
    }

    pub fn from_degrees(west: Real, south: Real, east: Real, north: Real) -> Self {
        Self::new(west.to_radians(), south.to_radians(), east.to_radians(), north.to_radians())
    }

    pub fn west(&self) -> Real {
        self.rect.min().x
    }

    pub fn south(&self) -> Real {
        self.rect.min().y
    }

    pub fn east(&self) -> Real {
        self.rect.max().x
    }

    pub fn north(&self) -> Real {
        self.rect.max().y
    }

    /// Longitude span in radians.
    pub fn width(&self) -> Real {
        self.rect.width()
    }

    /// Latitude span in radians.
    pub fn height(&self) -> Real {
        self.rect.height()
    }

    pub fn center(&self) -> Cartographic {
        let c = self.rect.center();
        Cartographic::from_radians(c.x, c.y, 0.0)
    }

    pub fn southwest(&self) -> Cartographic {
        Cartographic::from_radians(self.west(), self.south(), 0.0)
    }

    pub fn northwest(&self) -> Cartographic {
        Cartographic::from_radians(self.west(), self.north(), 0.0)
    }

    pub fn northeast(&self) -> Cartographic {
        Cartographic::from_radians(self.east(), self.north(), 0.0)
    }

    pub fn southeast(&self) -> Cartographic {
        Cartographic::from_radians(self.east(), self.south(), 0.0)
    }

    /// Boundary inclusive.
    pub fn contains(&self, cartographic: &Cartographic) -> bool {
        self.rect.intersects(&Coord { x: cartographic.longitude, y: cartographic.latitude })
    }
}
