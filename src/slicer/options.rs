//! Slice configuration coming in, box geometry going out.

use crate::errors::SlicingError;
use crate::float_types::Real;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SliceType {
    Box,
    /// Box derived from the current view
    ViewBox,
    Line,
    /// Line derived from the current view
    ViewLine,
}

impl SliceType {
    pub const fn as_str(self) -> &'static str {
        match self {
            SliceType::Box => "box",
            SliceType::ViewBox => "view-box",
            SliceType::Line => "line",
            SliceType::ViewLine => "view-line",
        }
    }
}

impl Display for SliceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SliceType {
    type Err = SlicingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(SliceType::Box),
            "view-box" => Ok(SliceType::ViewBox),
            "line" => Ok(SliceType::Line),
            "view-line" => Ok(SliceType::ViewLine),
            other => Err(SlicingError::UnknownSliceType(Some(other.to_string()))),
        }
    }
}

pub type LifecycleCallback = Box<dyn FnMut()>;
pub type SyncBoxPlanesCallback = Box<dyn FnMut(&BoxSliceInfo)>;

/// Hooks fired by the slicer. Never serialized.
#[derive(Default)]
pub struct SliceCallbacks {
    pub activation: Option<LifecycleCallback>,
    pub deactivation: Option<LifecycleCallback>,
    /// Fired with the live box geometry after every plane sync
    pub sync_box_planes: Option<SyncBoxPlanesCallback>,
}

impl Debug for SliceCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceCallbacks")
            .field("activation", &self.activation.is_some())
            .field("deactivation", &self.deactivation.is_some())
            .field("sync_box_planes", &self.sync_box_planes.is_some())
            .finish()
    }
}

/// What to slice and how.
///
/// `lower_limit` is relative to the terrain altitude under the box center.
/// Empty `slice_points` derive the geometry from the current view.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliceOptions {
    #[serde(rename = "type")]
    pub slice_type: Option<SliceType>,
    pub slice_points: Vec<Point3<Real>>,
    pub negate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_box: Option<bool>,
    #[serde(skip)]
    pub callbacks: SliceCallbacks,
}

impl SliceOptions {
    pub fn new(slice_type: SliceType) -> Self {
        SliceOptions {
            slice_type: Some(slice_type),
            ..Default::default()
        }
    }

    pub fn with_points(mut self, points: Vec<Point3<Real>>) -> Self {
        self.slice_points = points;
        self
    }

    pub const fn negated(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub const fn with_limits(mut self, lower_limit: Real, height: Real) -> Self {
        self.lower_limit = Some(lower_limit);
        self.height = Some(height);
        self
    }

    pub fn on_activation(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callbacks.activation = Some(Box::new(callback));
        self
    }

    pub fn on_deactivation(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callbacks.deactivation = Some(Box::new(callback));
        self
    }

    pub fn on_sync_box_planes(mut self, callback: impl FnMut(&BoxSliceInfo) + 'static) -> Self {
        self.callbacks.sync_box_planes = Some(Box::new(callback));
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SlicingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SlicingError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Externally relevant box state, reported after every sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSliceInfo {
    #[serde(rename = "type")]
    pub slice_type: SliceType,
    /// bottomRight, bottomLeft, topRight, topLeft
    pub slice_points: Vec<Point3<Real>>,
    /// Relative to the terrain altitude under the box center
    pub lower_limit: Real,
    pub height: Real,
    pub show_box: bool,
    pub negate: bool,
}

impl From<&BoxSliceInfo> for SliceOptions {
    fn from(info: &BoxSliceInfo) -> Self {
        SliceOptions {
            slice_type: Some(info.slice_type),
            slice_points: info.slice_points.clone(),
            negate: info.negate,
            lower_limit: Some(info.lower_limit),
            height: Some(info.height),
            show_box: Some(info.show_box),
            callbacks: SliceCallbacks::default(),
        }
    }
}
