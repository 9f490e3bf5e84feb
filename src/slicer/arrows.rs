//! Draggable arrow handles of the slicing box.
//!
//! Handles follow `idle -> hovered -> dragging -> idle`. A drag tick turns
//! the pointer position into a [`HandleMove`] that the box applies; the
//! handles never move themselves, their positions are rewritten from the box
//! state on every refresh.

use crate::float_types::{EPSILON, Real};
use crate::geodesy::{up_at, with_height};
use crate::scene::{Color, Cursor, EntityCollection, HandleEntity, Scene, SceneView};
use crate::slicer::helper::BoxCorners;
use nalgebra::{Point2, Point3, UnitQuaternion, Vector3};
use std::fmt;
use tracing::trace;

/// Normal handle color.
pub const SLICING_GEOMETRY_COLOR: Color = Color::WHITE;
/// Color of the handle under the pointer.
pub const HIGHLIGHT_COLOR: Color = Color::YELLOW;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleSide {
    Left,
    Right,
    Back,
    Front,
    Down,
    Up,
}

impl HandleSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            HandleSide::Left => "left",
            HandleSide::Right => "right",
            HandleSide::Back => "back",
            HandleSide::Front => "front",
            HandleSide::Down => "down",
            HandleSide::Up => "up",
        }
    }

    pub const fn is_vertical(self) -> bool {
        matches!(self, HandleSide::Down | HandleSide::Up)
    }
}

impl fmt::Display for HandleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowListItem {
    pub side: HandleSide,
    pub opposite_side: HandleSide,
    /// Arrow model
    pub uri: &'static str,
}

const fn arrow(side: HandleSide, opposite_side: HandleSide, uri: &'static str) -> ArrowListItem {
    ArrowListItem { side, opposite_side, uri }
}

/// Handles of a negated box, which has no vertical extent to edit.
pub const SLICE_BOX_ARROWS_INSIDE: &[ArrowListItem] = &[
    arrow(HandleSide::Left, HandleSide::Right, "/images/arrowV.glb"),
    arrow(HandleSide::Right, HandleSide::Left, "/images/arrowV.glb"),
    arrow(HandleSide::Back, HandleSide::Front, "/images/arrowH.glb"),
    arrow(HandleSide::Front, HandleSide::Back, "/images/arrowH.glb"),
];

pub const SLICE_BOX_ARROWS_OUTSIDE: &[ArrowListItem] = &[
    arrow(HandleSide::Left, HandleSide::Right, "/images/arrowV.glb"),
    arrow(HandleSide::Right, HandleSide::Left, "/images/arrowV.glb"),
    arrow(HandleSide::Back, HandleSide::Front, "/images/arrowH.glb"),
    arrow(HandleSide::Front, HandleSide::Back, "/images/arrowH.glb"),
    arrow(HandleSide::Down, HandleSide::Up, "/images/arrowA.glb"),
    arrow(HandleSide::Up, HandleSide::Down, "/images/arrowA.glb"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleState {
    #[default]
    Idle,
    Hovered(HandleSide),
    Dragging(HandleSide),
}

/// A drag tick converted to box space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMove {
    pub side: HandleSide,
    /// Meters; positive toward the box interior for side handles and
    /// downward for vertical handles
    pub amount: Real,
    pub vector: Vector3<Real>,
}

pub fn handle_id(side: HandleSide) -> String {
    format!("slicer-arrow-{}", side)
}

#[derive(Debug, Clone)]
pub struct SlicerArrows {
    arrows_list: &'static [ArrowListItem],
    orientation: Option<UnitQuaternion<Real>>,
    state: HandleState,
    /// Camera input flag saved when a drag starts
    enable_inputs: bool,
}

impl SlicerArrows {
    pub fn new(arrows_list: &'static [ArrowListItem], orientation: Option<UnitQuaternion<Real>>) -> Self {
        SlicerArrows {
            arrows_list,
            orientation,
            state: HandleState::Idle,
            enable_inputs: true,
        }
    }

    pub const fn state(&self) -> HandleState {
        self.state
    }

    pub const fn arrows_list(&self) -> &'static [ArrowListItem] {
        self.arrows_list
    }

    /// Adds one entity per handle, placed by `position`.
    pub fn show(&self, entities: &mut EntityCollection, position: impl Fn(HandleSide) -> Point3<Real>) {
        entities.handles.retain(|h| !self.arrows_list.iter().any(|a| a.side == h.side));
        for arrow in self.arrows_list {
            entities.handles.push(HandleEntity {
                id: handle_id(arrow.side),
                side: arrow.side,
                opposite_side: arrow.opposite_side,
                uri: arrow.uri,
                position: position(arrow.side),
                orientation: self.orientation,
                color: SLICING_GEOMETRY_COLOR,
                show: true,
            });
        }
    }

    /// Ends any drag, giving the camera its inputs back.
    pub fn hide(&mut self, scene: &mut Scene) {
        if let HandleState::Dragging(_) = self.state {
            scene.camera_controller.enable_inputs = self.enable_inputs;
        }
        self.unhighlight_arrow(scene);
        self.state = HandleState::Idle;
    }

    pub fn update_positions(&self, entities: &mut EntityCollection, position: impl Fn(HandleSide) -> Point3<Real>) {
        for handle in entities.handles.iter_mut() {
            handle.position = position(handle.side);
        }
    }

    pub fn toggle_arrows_visibility(&self, entities: &mut EntityCollection, show: bool) {
        for arrow in self.arrows_list {
            if let Some(handle) = entities.handle_mut(arrow.side) {
                handle.show = show;
            }
        }
    }

    fn picked_side(&self, view: &dyn SceneView, scene: &Scene, position: &Point2<Real>) -> Option<HandleSide> {
        let id = view.pick(position)?;
        let handle = scene.entities.handle_by_id(&id)?;
        handle.show.then_some(handle.side)
    }

    /// Starts a drag when a handle is under the pointer.
    pub fn on_left_down(&mut self, position: &Point2<Real>, view: &dyn SceneView, scene: &mut Scene) -> bool {
        let Some(side) = self.picked_side(view, scene, position) else {
            return false;
        };
        if !matches!(self.state, HandleState::Dragging(_)) {
            self.enable_inputs = scene.camera_controller.enable_inputs;
        }
        scene.camera_controller.enable_inputs = false;
        self.state = HandleState::Dragging(side);
        trace!(%side, "handle drag started");
        true
    }

    pub fn on_left_up(&mut self, scene: &mut Scene) {
        if let HandleState::Dragging(side) = self.state {
            scene.camera_controller.enable_inputs = self.enable_inputs;
            trace!(%side, "handle drag ended");
        }
        self.state = HandleState::Idle;
        self.unhighlight_arrow(scene);
    }

    /// Highlights the hovered handle, or while dragging returns the move the
    /// pointer asks for.
    pub fn on_mouse_move(
        &mut self,
        position: &Point2<Real>,
        view: &dyn SceneView,
        scene: &mut Scene,
        corners: &BoxCorners,
    ) -> Option<HandleMove> {
        match self.state {
            HandleState::Dragging(side) => self.drag_move(side, position, view, &scene.entities, corners),
            _ => {
                self.highlight_arrow(position, view, scene);
                None
            },
        }
    }

    fn highlight_arrow(&mut self, position: &Point2<Real>, view: &dyn SceneView, scene: &mut Scene) {
        match self.picked_side(view, scene, position) {
            Some(side) => {
                if let HandleState::Hovered(previous) = self.state {
                    if previous != side {
                        self.unhighlight_arrow(scene);
                    }
                }
                if let Some(handle) = scene.entities.handle_mut(side) {
                    handle.color = HIGHLIGHT_COLOR;
                }
                scene.cursor = Cursor::Pointer;
                self.state = HandleState::Hovered(side);
            },
            None => {
                self.unhighlight_arrow(scene);
                self.state = HandleState::Idle;
            },
        }
    }

    fn unhighlight_arrow(&self, scene: &mut Scene) {
        let side = match self.state {
            HandleState::Hovered(side) | HandleState::Dragging(side) => side,
            HandleState::Idle => return,
        };
        if let Some(handle) = scene.entities.handle_mut(side) {
            handle.color = SLICING_GEOMETRY_COLOR;
        }
        scene.cursor = Cursor::Default;
    }

    fn drag_move(
        &self,
        side: HandleSide,
        pointer: &Point2<Real>,
        view: &dyn SceneView,
        entities: &EntityCollection,
        corners: &BoxCorners,
    ) -> Option<HandleMove> {
        let handle = entities.handle(side)?;
        let handle_2d = view.world_to_screen(&handle.position)?;
        let pixel_size = view.pixel_size(&handle.position);

        if side.is_vertical() {
            let amount = (pointer.y - handle_2d.y) * pixel_size;
            let vector = -up_at(&handle.position) * amount;
            trace!(%side, amount, "vertical handle move");
            return Some(HandleMove { side, amount, vector });
        }

        let opposite = entities.handle(handle.opposite_side)?;
        let opposite_2d = view.world_to_screen(&opposite.position)?;
        let axis_2d = opposite_2d - handle_2d;
        let axis_length_squared = axis_2d.norm_squared();
        if axis_length_squared < EPSILON {
            return None;
        }
        let scalar = (pointer - handle_2d).dot(&axis_2d) / axis_length_squared;
        let meters = (axis_2d * scalar).norm() * pixel_size;
        let sign = if scalar > 0.0 {
            1.0
        } else if scalar < 0.0 {
            -1.0
        } else {
            0.0
        };
        let vector = ground_axis(side, corners)? * meters * sign;
        trace!(%side, amount = meters * sign, "side handle move");
        Some(HandleMove { side, amount: meters * sign, vector })
    }
}

/// Unit ground vector from the edge of `side` toward the opposite edge.
pub fn ground_axis(side: HandleSide, corners: &BoxCorners) -> Option<Vector3<Real>> {
    let ground_mid = |a: &Point3<Real>, b: &Point3<Real>| with_height(&nalgebra::center(a, b), 0.0);
    let left = || ground_mid(&corners.bottom_left, &corners.top_left);
    let right = || ground_mid(&corners.bottom_right, &corners.top_right);
    let top = || ground_mid(&corners.top_left, &corners.top_right);
    let bottom = || ground_mid(&corners.bottom_left, &corners.bottom_right);
    let axis = match side {
        HandleSide::Left => right() - left(),
        HandleSide::Right => left() - right(),
        HandleSide::Back => top() - bottom(),
        HandleSide::Front => bottom() - top(),
        HandleSide::Down | HandleSide::Up => return None,
    };
    (axis.norm_squared() > EPSILON).then(|| axis.normalize())
}
