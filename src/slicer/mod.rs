//! The slicing facade and its two tools.
//!
//! [`Slicer`] is the single entry point: it owns the [`SliceOptions`], picks
//! the tool for the slice type on activation and tears every clipping slot
//! down on deactivation. At most one tool is active at any time, which
//! [`SlicerState`] makes unrepresentable otherwise.

use crate::config::SlicerConfig;
use crate::errors::SlicingError;
use crate::float_types::Real;
use crate::scene::{Scene, SceneView, TilesetId, VoxelId};
use nalgebra::Point2;
use tracing::debug;

pub mod arrows;
pub mod helper;
pub mod options;
pub mod slicing_box;
pub mod slicing_line;

pub use options::{BoxSliceInfo, SliceCallbacks, SliceOptions, SliceType};
pub use slicing_box::SlicingBox;
pub use slicing_line::SlicingLine;

/// Contract every slicing tool fulfills.
///
/// Activation builds the tool, so an inactive tool does not exist and
/// deactivation consumes it.
pub trait SlicingTool: Sized {
    fn activate(
        options: &mut SliceOptions,
        config: &SlicerConfig,
        view: &dyn SceneView,
        scene: &mut Scene,
    ) -> Result<Self, SlicingError>;

    fn deactivate(self, scene: &mut Scene);

    /// Clips one more tileset. A no-op until the tileset is loaded.
    fn add_clipping_planes(&mut self, tileset: TilesetId, scene: &mut Scene);

    fn add_voxel_clipping_planes(&mut self, voxel: VoxelId, scene: &mut Scene);
}

/// Tool family selected by the slice type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Box,
    Line,
}

#[derive(Debug, Default)]
pub enum SlicerState {
    #[default]
    Inactive,
    Box(SlicingBox),
    Line(SlicingLine),
}

#[derive(Debug, Default)]
pub struct Slicer {
    options: SliceOptions,
    state: SlicerState,
    config: SlicerConfig,
}

impl Slicer {
    pub fn new(config: SlicerConfig) -> Self {
        Slicer {
            options: SliceOptions::default(),
            state: SlicerState::Inactive,
            config,
        }
    }

    pub const fn options(&self) -> &SliceOptions {
        &self.options
    }

    /// Takes effect on the next activation.
    pub fn set_options(&mut self, options: SliceOptions) {
        self.options = options;
    }

    pub const fn config(&self) -> &SlicerConfig {
        &self.config
    }

    pub const fn state(&self) -> &SlicerState {
        &self.state
    }

    pub const fn is_active(&self) -> bool {
        !matches!(self.state, SlicerState::Inactive)
    }

    pub const fn slicing_box(&self) -> Option<&SlicingBox> {
        match &self.state {
            SlicerState::Box(tool) => Some(tool),
            _ => None,
        }
    }

    pub const fn slicing_line(&self) -> Option<&SlicingLine> {
        match &self.state {
            SlicerState::Line(tool) => Some(tool),
            _ => None,
        }
    }

    /// Tool family for the configured slice type.
    pub fn get_slicing_tool(&self) -> Result<ToolKind, SlicingError> {
        match self.options.slice_type {
            Some(SliceType::Box | SliceType::ViewBox) => Ok(ToolKind::Box),
            Some(SliceType::Line | SliceType::ViewLine) => Ok(ToolKind::Line),
            None => Err(SlicingError::UnknownSliceType(None)),
        }
    }

    /// Activates the tool for the current options, or tears slicing down.
    ///
    /// Activating while active replaces the running tool without firing the
    /// deactivation callback.
    pub fn set_active(&mut self, active: bool, view: &dyn SceneView, scene: &mut Scene) -> Result<(), SlicingError> {
        if !active {
            self.deactivate(scene);
            return Ok(());
        }

        let kind = self.get_slicing_tool()?;
        debug!(?kind, slice_type = ?self.options.slice_type, "selected slicing tool");
        if self.is_active() {
            self.teardown(scene);
        }
        self.state = match kind {
            ToolKind::Box => SlicerState::Box(SlicingBox::activate(&mut self.options, &self.config, view, scene)?),
            ToolKind::Line => SlicerState::Line(SlicingLine::activate(&mut self.options, &self.config, view, scene)?),
        };
        if let Some(callback) = self.options.callbacks.activation.as_mut() {
            callback();
        }
        Ok(())
    }

    fn deactivate(&mut self, scene: &mut Scene) {
        if !self.is_active() {
            return;
        }
        if let Some(callback) = self.options.callbacks.deactivation.as_mut() {
            callback();
        }
        self.options = SliceOptions::default();
        self.teardown(scene);
        debug!("slicing deactivated");
    }

    fn teardown(&mut self, scene: &mut Scene) {
        scene.entities.remove_all();
        match std::mem::take(&mut self.state) {
            SlicerState::Box(tool) => tool.deactivate(scene),
            SlicerState::Line(tool) => tool.deactivate(scene),
            SlicerState::Inactive => {},
        }

        if let Some(clipping_planes) = scene.globe.clipping_planes.as_mut() {
            clipping_planes.enabled = false;
        }
        scene.globe.clipping_planes = None;
        for tileset in scene.tilesets.iter_mut() {
            if let Some(clipping_planes) = tileset.clipping_planes.as_mut() {
                clipping_planes.enabled = false;
            }
            tileset.clipping_planes = None;
        }
        for voxel in scene.voxels.iter_mut() {
            voxel.clipping_planes = None;
        }
    }

    /// Clips a tileset that became ready after activation.
    /// A no-op when inactive or when the tileset is clipped already.
    pub fn apply_clipping_planes_to_tileset(&mut self, tileset: TilesetId, scene: &mut Scene) {
        let already_clipped = scene
            .tileset(tileset)
            .is_none_or(|t| t.clipping_planes.is_some());
        if already_clipped {
            return;
        }
        match &mut self.state {
            SlicerState::Box(tool) => tool.add_clipping_planes(tileset, scene),
            SlicerState::Line(tool) => tool.add_clipping_planes(tileset, scene),
            SlicerState::Inactive => {},
        }
    }

    /// Clips a voxel primitive added after activation.
    pub fn apply_clipping_planes_to_voxel(&mut self, voxel: VoxelId, scene: &mut Scene) {
        let already_clipped = scene.voxel(voxel).is_none_or(|v| v.clipping_planes.is_some());
        if already_clipped {
            return;
        }
        match &mut self.state {
            SlicerState::Box(tool) => tool.add_voxel_clipping_planes(voxel, scene),
            SlicerState::Line(tool) => tool.add_voxel_clipping_planes(voxel, scene),
            SlicerState::Inactive => {},
        }
    }

    pub fn toggle_box_visibility(&mut self, show: bool, scene: &mut Scene) {
        if let SlicerState::Box(tool) = &mut self.state {
            tool.toggle_box_visibility(show, scene);
        }
    }

    pub fn on_exaggeration_changed(&mut self, exaggeration: Real, scene: &mut Scene) {
        if let SlicerState::Box(tool) = &mut self.state {
            tool.on_exaggeration_changed(exaggeration, scene);
        }
    }

    /// Returns `true` when a handle drag started.
    pub fn on_left_down(&mut self, position: &Point2<Real>, view: &dyn SceneView, scene: &mut Scene) -> bool {
        match &mut self.state {
            SlicerState::Box(tool) => tool.on_left_down(position, view, scene),
            _ => false,
        }
    }

    pub fn on_mouse_move(&mut self, position: &Point2<Real>, view: &dyn SceneView, scene: &mut Scene) {
        if let SlicerState::Box(tool) = &mut self.state {
            tool.on_mouse_move(position, view, scene);
        }
    }

    pub fn on_left_up(&mut self, scene: &mut Scene) {
        if let SlicerState::Box(tool) = &mut self.state {
            tool.on_left_up(scene);
        }
    }

    /// Per-frame refresh of the derived entity positions.
    pub fn on_post_render(&mut self, view: &dyn SceneView, scene: &mut Scene) {
        if let SlicerState::Box(tool) = &self.state {
            tool.refresh_entities(view, scene);
        }
    }
}
