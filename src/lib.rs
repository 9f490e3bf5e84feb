//! Interactive **box and line slicing** of a 3D globe and its tilesets.
//!
//! A slice is a set of half-space [clipping planes](plane::Plane) computed in
//! earth-centered world coordinates. The same cut is pushed to the globe and,
//! re-expressed in each tileset's local clipping frame, to every loaded
//! [tileset](scene::Tileset).
//!
//! - **box** / **view-box**: keeps the inside of an oriented box (or the
//!   outside when negated). The box comes from four corners or from a share
//!   of the current view, and is edited through draggable handles.
//! - **line** / **view-line**: keeps one side of a vertical plane through two
//!   ground points, or through the view center when none are given.
//!
//! The host engine is reached through [`scene::SceneView`] for camera,
//! terrain and picking queries; all mutable targets live in [`scene::Scene`].
//! [`slicer::Slicer`] is the entry point.
//!
//! ```no_run
//! use globe_slicer::scene::{Scene, SceneView};
//! use globe_slicer::slicer::{SliceOptions, SliceType, Slicer};
//!
//! fn start(view: &dyn SceneView, scene: &mut Scene) -> Result<(), globe_slicer::errors::SlicingError> {
//!     let mut slicer = Slicer::default();
//!     slicer.set_options(SliceOptions::new(SliceType::ViewBox).on_sync_box_planes(|info| {
//!         println!("box is now {} m high", info.height);
//!     }));
//!     slicer.set_active(true, view, scene)?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod clipping;
pub mod config;
pub mod errors;
pub mod float_types;
pub mod geodesy;
pub mod plane;
pub mod scene;
pub mod slicer;

pub use clipping::ClippingPlaneCollection;
pub use config::SlicerConfig;
pub use errors::SlicingError;
pub use plane::Plane;
pub use slicer::{Slicer, SliceOptions, SliceType};
