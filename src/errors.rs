//! Slicing errors

use crate::float_types::Real;
use nalgebra::Point3;
use std::fmt::Display;

/// All the possible failures of the slicing engine.
///
/// Only configuration problems are fatal. A tileset that is not loaded yet or
/// whose transform cannot be inverted is skipped instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum SlicingError {
    /// (UnknownSliceType) The slice type is missing or not one of box, view-box, line, view-line
    UnknownSliceType(Option<String>),
    /// (InvalidSlicePoints) The slice points cannot describe the requested shape
    InvalidSlicePoints { expected: usize, found: usize },
    /// (InvalidCoordinate) The coordinate has a NaN or infinite, or sits at the ellipsoid center
    InvalidCoordinate(Point3<Real>),
    /// (Json) Options or config could not be (de)serialized
    Json(#[from] serde_json::Error),
}

impl Display for SlicingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlicingError::UnknownSliceType(Some(name)) => write!(f, "(UnknownSliceType) Incorrect slicing type: {}", name),
            SlicingError::UnknownSliceType(None) => write!(f, "(UnknownSliceType) Incorrect slicing type: no type given"),
            SlicingError::InvalidSlicePoints { expected, found } => write!(f, "(InvalidSlicePoints) Expected {} slice points, found {}", expected, found),
            SlicingError::InvalidCoordinate(opoint) => write!(f, "(InvalidCoordinate) The coordinate ({}) cannot be placed on the ellipsoid", opoint),
            SlicingError::Json(error) => write!(f, "(Json) {}", error),
        }
    }
}
