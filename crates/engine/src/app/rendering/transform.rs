use crate::app::{Camera2D, Rect, Vec2};
use crate::level::GridCell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// World-space extents visible through `camera`.
///
/// An exact zero zoom shows `viewport` world units (identity scale).
pub fn view_extents(camera: &Camera2D, viewport: Viewport) -> Vec2 {
    viewport.size() * camera.effective_zoom().recip()
}

/// Maps a pixel in `[0, viewport]` linearly onto the camera's visible world rectangle.
pub fn screen_to_world(screen: Vec2, camera: &Camera2D, viewport: Viewport) -> Vec2 {
    let extents = view_extents(camera, viewport);
    let bound = camera.target - extents * 0.5;
    let size = viewport.size();
    Vec2::new(
        lerp_axis(screen.x, size.x, bound.x, extents.x),
        lerp_axis(screen.y, size.y, bound.y, extents.y),
    )
}

/// Inverse of [`screen_to_world`] for any viewport with nonzero axes.
pub fn world_to_screen(world: Vec2, camera: &Camera2D, viewport: Viewport) -> Vec2 {
    (world - camera.target) * camera.effective_zoom() + viewport.center()
}

pub fn world_to_grid(world: Vec2, tile_size: f32) -> GridCell {
    GridCell {
        col: (world.x / tile_size).floor() as i32,
        row: (world.y / tile_size).floor() as i32,
    }
}

pub fn screen_to_grid(
    screen: Vec2,
    camera: &Camera2D,
    viewport: Viewport,
    tile_size: f32,
) -> GridCell {
    world_to_grid(screen_to_world(screen, camera, viewport), tile_size)
}

pub fn view_bounds_world(camera: &Camera2D, viewport: Viewport) -> Rect {
    let min = screen_to_world(Vec2::ZERO, camera, viewport);
    let max = screen_to_world(viewport.size(), camera, viewport);
    Rect::from_min_max(min, max)
}

fn lerp_axis(screen: f32, viewport_len: f32, bound: f32, extent: f32) -> f32 {
    if viewport_len <= 0.0 {
        return bound;
    }
    bound + (screen / viewport_len) * extent
}
