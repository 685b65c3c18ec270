use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::input::{ActionStates, InputAction, PointerButton, PointerStates};
use super::rendering::{TextureStore, Viewport};
use crate::level::{DrawList, LevelError};
use crate::AppPaths;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle; `(x, y)` is the top-left corner, y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Half-open containment: `[x, x + width) x [y, y + height)`.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 2.0;
pub const CAMERA_ZOOM_MAX: f32 = 5.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.25;

/// `target` is the world point shown at the viewport center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub target: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            target: Vec2::ZERO,
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn centered_on(target: Vec2, zoom: f32) -> Self {
        Self { target, zoom }
    }

    /// Zoom used for scaling; exact zero or a non-finite value falls back to 1.
    pub fn effective_zoom(&self) -> f32 {
        if self.zoom != 0.0 && self.zoom.is_finite() {
            self.zoom
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pointer: PointerStates,
    cursor_position_px: Option<Vec2>,
    pan_origin_px: Option<Vec2>,
    scroll_delta: f32,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        pointer: PointerStates,
        cursor_position_px: Option<Vec2>,
        pan_origin_px: Option<Vec2>,
        scroll_delta: f32,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            pointer,
            cursor_position_px,
            pan_origin_px,
            scroll_delta,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn pointer_down(&self, button: PointerButton) -> bool {
        self.pointer.is_down(button)
    }

    pub fn pointer_pressed(&self, button: PointerButton) -> bool {
        self.pointer.was_pressed(button)
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    /// Cursor travel since the pan button went down, while it is still held.
    pub fn pan_drag_delta_px(&self) -> Option<Vec2> {
        if !self.pointer.is_down(PointerButton::Pan) {
            return None;
        }
        let origin = self.pan_origin_px?;
        let cursor = self.cursor_position_px?;
        Some(cursor - origin)
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.window_width,
            height: self.window_height,
        }
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set_pressed(action, true);
        self
    }

    pub fn with_pointer_down(mut self, button: PointerButton, is_down: bool) -> Self {
        self.pointer.set(button, is_down);
        self
    }

    pub fn with_pointer_pressed(mut self, button: PointerButton) -> Self {
        self.pointer.set_pressed(button, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_pan_origin_px(mut self, pan_origin_px: Option<Vec2>) -> Self {
        self.pan_origin_px = pan_origin_px;
        self
    }

    pub fn with_scroll_delta(mut self, scroll_delta: f32) -> Self {
        self.scroll_delta = scroll_delta;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Restart,
    Quit,
}

/// Collaborators a scene may use while loading.
pub struct LoadContext<'a> {
    pub textures: &'a mut TextureStore,
    pub paths: &'a AppPaths,
    pub viewport: Viewport,
}

pub trait Scene {
    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LevelError>;
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self) -> DrawList;
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub(crate) fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LevelError> {
        if self.is_loaded {
            return Ok(());
        }
        self.scene.load(ctx)?;
        self.is_loaded = true;
        Ok(())
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input)
    }

    pub(crate) fn render(&mut self) -> Option<DrawList> {
        self.is_loaded.then(|| self.scene.render())
    }

    pub(crate) fn hard_reset(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LevelError> {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
        self.load(ctx)
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }
}
