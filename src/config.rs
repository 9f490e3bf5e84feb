//! Slicer tuning knobs and the constants they default to.

use crate::errors::SlicingError;
use crate::float_types::Real;
use serde::{Deserialize, Serialize};

/// Smallest box height and edge separation, in meters.
pub const SLICING_BOX_MIN_SIZE: Real = 450.0;
/// Box height used when only one vertical limit is given.
pub const SLICING_BOX_HEIGHT: Real = 10_000.0;
/// Lower limit used when only the height is given.
pub const SLICING_BOX_LOWER_LIMIT: Real = -5_000.0;
/// Share of the view rectangle covered by a view-derived box.
pub const DEFAULT_VIEW_RATIO: Real = 1.0 / 3.0;
/// Vertical clearance between the box top (or bottom) and the side handles.
pub const HANDLE_HEIGHT_OFFSET: Real = 20.0;
/// Side handles stay within this fraction of their edge.
pub const HANDLE_BAND: (Real, Real) = (0.05, 0.95);

/// Ellipsoid height under which a tileset bounding-sphere center gets no
/// east-north-up orientation.
///
/// This is the minimum terrain height the host engine assumes for the whole
/// planet (deepest ocean trench with margin). A center below it cannot be a
/// real surface position, so the tileset is taken to be positioned entirely
/// by its root transform.
pub const BELOW_TERRAIN_HEIGHT: Real = -100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlicerConfig {
    pub view_ratio: Real,
    pub min_box_size: Real,
    pub handle_height_offset: Real,
    pub handle_band: (Real, Real),
    pub edge_width: Real,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        SlicerConfig {
            view_ratio: DEFAULT_VIEW_RATIO,
            min_box_size: SLICING_BOX_MIN_SIZE,
            handle_height_offset: HANDLE_HEIGHT_OFFSET,
            handle_band: HANDLE_BAND,
            edge_width: crate::clipping::DEFAULT_EDGE_WIDTH,
        }
    }
}

impl SlicerConfig {
    /// Missing keys keep their default value.
    pub fn from_json(json: &str) -> Result<Self, SlicingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SlicingError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SlicerConfig::from_json(r#"{ "viewRatio": 0.5, "handleBand": [0.1, 0.9] }"#).unwrap();
        assert_eq!(config.view_ratio, 0.5);
        assert_eq!(config.handle_band, (0.1, 0.9));
        assert_eq!(config.min_box_size, SLICING_BOX_MIN_SIZE);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(SlicerConfig::from_json("{ viewRatio: }"), Err(SlicingError::Json(_))));
    }
}
