//! Tile level core: grid storage, editor painting, body collision and camera rules.
//!
//! A [`Level`] is created by [`level_init`], advanced once per fixed tick by
//! [`level_update`] and drawn by [`level_render`]. All state lives in the
//! level value owned by the caller.

mod arena;
mod bounded;
mod brush;
mod camera;
mod collision;
mod draw;
mod editor;
mod grid;
mod projectile;
mod snapshot;
mod tileset;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::app::{
    screen_to_grid, screen_to_world, view_bounds_world, Camera2D, InputAction, InputSnapshot,
    Rect, Vec2, Viewport, CAMERA_ZOOM_DEFAULT,
};

pub use arena::{LevelArena, DEFAULT_LEVEL_ARENA_BYTES};
pub use bounded::{BoundedVec, CapacityError};
pub use brush::{clamp_brush_extent, erase, max_brush_size, Brush, EraseMode, MAX_BRUSH_TILES};
pub use camera::{CameraController, PAN_DAMPING};
pub use collision::{
    step_body, Body, BodyIntent, Facing, HorizontalInput, PhysicsSettings, StepReport,
    COLLISION_EPSILON,
};
pub use draw::{Color, DrawCommand, DrawList, DrawSpace};
pub use editor::{apply, EditorAction, EditorSettings};
pub use grid::{CandidateTiles, GridCell, GridError, Tile, TileGrid};
pub use projectile::{Projectile, Projectiles, MAX_PROJECTILES, PROJECTILE_SPEED};
pub use snapshot::{
    decode_snapshot, encode_snapshot, load_snapshot, save_snapshot, LevelSnapshot, SnapshotError,
    SnapshotTile, SNAPSHOT_VERSION,
};
pub use tileset::{TextureHandle, TextureId, Tileset, PICKER_MARGIN, PICKER_SCALE};

const PROJECTILE_DRAW_SIZE: f32 = 3.0;
const SWATCH_ORIGIN_PX: Vec2 = Vec2::new(10.0, 10.0);

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level arena exhausted: requested {requested_bytes} bytes, {available_bytes} available")]
    AllocationFailure {
        requested_bytes: usize,
        available_bytes: usize,
    },
    #[error("failed to load tileset {path}: {reason}")]
    AssetLoadFailure { path: PathBuf, reason: String },
    #[error("invalid level dimensions {tiles_wide}x{tiles_high} with tile size {tile_size}")]
    InvalidDimensions {
        tiles_wide: u16,
        tiles_high: u16,
        tile_size: u16,
    },
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelMode {
    Edit,
    Play,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    pub physics: PhysicsSettings,
    pub editor: EditorSettings,
    pub camera: CameraController,
    pub body_size: Vec2,
    pub initial_zoom: f32,
    pub projectile_capacity: usize,
    pub projectile_speed: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsSettings::default(),
            editor: EditorSettings::default(),
            camera: CameraController::default(),
            body_size: Vec2::new(18.0, 18.0),
            initial_zoom: CAMERA_ZOOM_DEFAULT,
            projectile_capacity: MAX_PROJECTILES,
            projectile_speed: PROJECTILE_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub fell_out_of_bounds: bool,
    pub cells_changed: usize,
    pub projectiles_culled: usize,
}

#[derive(Debug, Clone)]
pub struct Level {
    grid: TileGrid,
    tileset: Tileset,
    brush: Brush,
    camera: Camera2D,
    body: Body,
    projectiles: Projectiles,
    config: LevelConfig,
    viewport: Viewport,
    pointer_px: Option<Vec2>,
}

pub fn level_init(
    arena: &mut LevelArena,
    tiles_wide: u16,
    tiles_high: u16,
    tile_size: u16,
    texture: TextureHandle,
    viewport: Viewport,
    config: LevelConfig,
) -> Result<Level, LevelError> {
    let grid = TileGrid::allocate(arena, tiles_wide, tiles_high, tile_size)?;
    let mut tileset = Tileset::new(texture, tile_size);
    tileset.layout_picker(viewport);

    let mut level = Level {
        brush: Brush::new(grid.tile_extent()),
        grid,
        tileset,
        camera: Camera2D::centered_on(Vec2::ZERO, config.initial_zoom),
        body: Body::new(Vec2::ZERO, config.body_size),
        projectiles: Projectiles::new(config.projectile_capacity, config.projectile_speed),
        config,
        viewport,
        pointer_px: None,
    };
    level.respawn();

    info!(
        tiles_wide,
        tiles_high,
        tile_size,
        arena_used_bytes = arena.used_bytes(),
        arena_budget_bytes = arena.budget_bytes(),
        "level_initialized"
    );
    Ok(level)
}

/// One fixed tick: camera, then the editor (edit) or body, projectiles and follow (play).
pub fn level_update(
    level: &mut Level,
    mode: LevelMode,
    dt: f32,
    input: &InputSnapshot,
) -> UpdateReport {
    let viewport = input.viewport();
    if !viewport.is_empty() && viewport != level.viewport {
        level.viewport = viewport;
        level.tileset.layout_picker(viewport);
    }
    level.pointer_px = input.cursor_position_px();

    let mut report = UpdateReport::default();
    if input.was_pressed(InputAction::ResetBody) {
        apply(level, EditorAction::ResetBody);
    }

    let map_size = level.grid.world_size();
    match mode {
        LevelMode::Edit => {
            level.config.camera.update(
                &mut level.camera,
                input,
                level.viewport,
                map_size,
                None,
            );
            report.cells_changed = editor::run(level, input);
        }
        LevelMode::Play => {
            level.tileset.set_hovered(None);
            let intent = body_intent(input);
            let step = step_body(
                &mut level.body,
                &level.grid,
                intent,
                &level.config.physics,
                dt,
            );
            if input.was_pressed(InputAction::Fire) {
                level.projectiles.fire_or_warn(&level.body);
            }
            report.projectiles_culled = level.projectiles.advance(&level.grid, dt);
            level.config.camera.update(
                &mut level.camera,
                input,
                level.viewport,
                map_size,
                Some(level.body.center()),
            );
            if step.fell_out_of_bounds {
                info!(
                    body_x = level.body.position.x,
                    body_y = level.body.position.y,
                    "fell_out_of_bounds"
                );
            }
            report.fell_out_of_bounds = step.fell_out_of_bounds;
        }
    }
    report
}

fn body_intent(input: &InputSnapshot) -> BodyIntent {
    let horizontal = if input.is_down(InputAction::MoveLeft) {
        HorizontalInput::Left
    } else if input.is_down(InputAction::MoveRight) {
        HorizontalInput::Right
    } else {
        HorizontalInput::None
    };
    BodyIntent {
        horizontal,
        jump: input.was_pressed(InputAction::Jump),
    }
}

pub fn level_render(level: &Level, mode: LevelMode) -> DrawList {
    let mut list = DrawList::new(level.camera, level.viewport);
    list.clear(Color::BACKGROUND);

    let texture = level.tileset.texture().id;
    let view = view_bounds_world(&level.camera, level.viewport);
    for cell in level.grid.candidate_tiles(view) {
        let Ok(tile) = level.grid.get(cell) else {
            continue;
        };
        if tile.source.has_area() {
            list.textured_quad(DrawSpace::World, texture, tile.source, tile.dest);
        } else if tile.solid {
            list.outline_rect(DrawSpace::World, tile.dest, 1, Color::PALE_BLUE);
        }
    }

    if mode == LevelMode::Edit {
        for cell in level.grid.candidate_tiles(view) {
            list.outline_rect(
                DrawSpace::World,
                level.grid.tile_rect(cell),
                1,
                Color::GRID_LINE,
            );
        }
        if let Some(cell) = level.hovered_grid_cell() {
            let origin = level.grid.tile_rect(cell);
            let footprint = level.brush.footprint();
            list.outline_rect(
                DrawSpace::World,
                Rect::new(origin.x, origin.y, footprint.x, footprint.y),
                1,
                Color::BRUSH_PREVIEW,
            );
        }
    }

    list.fill_rect(DrawSpace::World, level.body.rect(), Color::BODY);
    for projectile in level.projectiles.iter() {
        let half = PROJECTILE_DRAW_SIZE * 0.5;
        list.fill_rect(
            DrawSpace::World,
            Rect::new(
                projectile.position.x - half,
                projectile.position.y - half,
                PROJECTILE_DRAW_SIZE,
                PROJECTILE_DRAW_SIZE,
            ),
            Color::PROJECTILE,
        );
    }

    if mode == LevelMode::Edit {
        render_picker(level, &mut list);
    }
    list
}

fn render_picker(level: &Level, list: &mut DrawList) {
    let tileset = &level.tileset;
    let picker = tileset.picker_rect_px();
    let texture = tileset.texture();
    list.fill_rect(DrawSpace::Screen, picker, Color::PICKER_BACKDROP);
    list.textured_quad(
        DrawSpace::Screen,
        texture.id,
        Rect::new(0.0, 0.0, texture.width as f32, texture.height as f32),
        picker,
    );
    if let Some(cell) = tileset.hovered() {
        list.outline_rect(
            DrawSpace::Screen,
            tileset.cell_rect_px(cell),
            2,
            Color::HIGHLIGHT,
        );
    }

    if level.brush.is_set() {
        let source = level.brush.source();
        let swatch = Rect::new(
            SWATCH_ORIGIN_PX.x,
            SWATCH_ORIGIN_PX.y,
            source.width * tileset.picker_scale(),
            source.height * tileset.picker_scale(),
        );
        list.textured_quad(DrawSpace::Screen, texture.id, source, swatch);
        list.outline_rect(DrawSpace::Screen, swatch, 2, Color::SWATCH_FRAME);
    }
}

impl Level {
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Centers the camera on the map, then re-spawns the body under the view center.
    pub fn respawn(&mut self) {
        let map_size = self.grid.world_size();
        let controller = self.config.camera;
        self.camera.target = map_size * 0.5;
        let (min_zoom, max_zoom) = controller.zoom_bounds(self.viewport, map_size);
        self.camera.zoom = self.camera.zoom.max(min_zoom).min(max_zoom);
        controller.clamp_target(&mut self.camera, self.viewport, map_size);
        self.reset_body();
    }

    /// Re-spawns the body at the world point under the viewport center.
    pub fn reset_body(&mut self) {
        let spawn = screen_to_world(self.viewport.center(), &self.camera, self.viewport);
        self.body = Body::new(spawn, self.config.body_size);
        self.projectiles.clear();
        info!(x = spawn.x, y = spawn.y, "body_reset");
    }

    pub fn screen_to_world(&self, screen_px: Vec2) -> Vec2 {
        screen_to_world(screen_px, &self.camera, self.viewport)
    }

    pub fn screen_to_grid(&self, screen_px: Vec2) -> GridCell {
        screen_to_grid(
            screen_px,
            &self.camera,
            self.viewport,
            self.grid.tile_extent(),
        )
    }

    /// Grid cell under the last pointer position, unless the picker covers it.
    fn hovered_grid_cell(&self) -> Option<GridCell> {
        let pointer = self.pointer_px?;
        if self.tileset.picker_rect_px().contains_point(pointer) {
            return None;
        }
        let cell = self.screen_to_grid(pointer);
        self.grid.contains(cell).then_some(cell)
    }
}
