use std::path::{Path, PathBuf};

use tilejump_engine::level::{
    load_snapshot, save_snapshot, Color, DrawSpace, SnapshotError, TextureHandle,
    DEFAULT_LEVEL_ARENA_BYTES,
};
use tilejump_engine::{
    level_init, level_render, level_update, Camera2D, DrawList, InputAction, InputSnapshot,
    Level, LevelArena, LevelConfig, LevelError, LevelMode, LoadContext, MetricsHandle, Rect,
    Scene, SceneCommand, TextureStore, Viewport,
};
use tracing::{info, warn};

mod mode;

use mode::{GameMode, ModeEvent};

const DEFAULT_TILESET_RELATIVE_PATH: &str = "textures/tilemap.png";
const GENERATED_TILESET_KEY: &str = "generated_tileset";
const GENERATED_TILESET_COLS: u32 = 8;
const GENERATED_TILESET_ROWS: u32 = 4;
const SAVE_FILE_NAME: &str = "level.json";
const GAME_OVER_FRAME: Color = Color([200, 48, 48, 255]);
const GAME_OVER_FRAME_PX: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TilesetSource {
    /// `assets/textures/tilemap.png` when present, otherwise a generated tileset.
    Auto,
    /// Must load; relative paths resolve against the assets directory.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub(crate) struct GameSettings {
    pub(crate) tiles_wide: u16,
    pub(crate) tiles_high: u16,
    pub(crate) tile_size: u16,
    pub(crate) arena_bytes: usize,
    pub(crate) tileset: TilesetSource,
    pub(crate) level: LevelConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tiles_wide: 80,
            tiles_high: 50,
            tile_size: 18,
            arena_bytes: DEFAULT_LEVEL_ARENA_BYTES,
            tileset: TilesetSource::Auto,
            level: LevelConfig::default(),
        }
    }
}

pub(crate) struct PlatformerScene {
    settings: GameSettings,
    metrics: MetricsHandle,
    level: Option<Level>,
    mode: GameMode,
    save_path: PathBuf,
}

impl PlatformerScene {
    pub(crate) fn new(settings: GameSettings, metrics: MetricsHandle) -> Self {
        Self {
            settings,
            metrics,
            level: None,
            mode: GameMode::default(),
            save_path: PathBuf::from(SAVE_FILE_NAME),
        }
    }

    fn load_tileset(
        &self,
        textures: &mut TextureStore,
        assets_dir: &Path,
    ) -> Result<TextureHandle, LevelError> {
        match &self.settings.tileset {
            TilesetSource::File(path) => textures.load_png(&assets_dir.join(path)),
            TilesetSource::Auto => {
                let default_path = assets_dir.join(DEFAULT_TILESET_RELATIVE_PATH);
                if default_path.is_file() {
                    textures.load_png(&default_path)
                } else {
                    textures.generate_tileset(
                        GENERATED_TILESET_KEY,
                        self.settings.tile_size,
                        GENERATED_TILESET_COLS,
                        GENERATED_TILESET_ROWS,
                    )
                }
            }
        }
    }

    fn set_mode(&mut self, event: ModeEvent) {
        let next = self.mode.on(event);
        if next != self.mode {
            info!(from = %self.mode, to = %next, ?event, "mode_changed");
            self.mode = next;
        }
    }

    fn save(&self, level: &Level) {
        if let Err(error) = save_snapshot(&self.save_path, &level.snapshot()) {
            warn!(
                path = %self.save_path.display(),
                error = %error,
                "save_failed"
            );
        }
    }

    fn load_into(path: &Path, level: &mut Level) -> Result<usize, SnapshotError> {
        let snapshot = load_snapshot(path)?;
        level.apply_snapshot(&snapshot)
    }
}

impl Scene for PlatformerScene {
    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LevelError> {
        let texture = self.load_tileset(ctx.textures, &ctx.paths.assets_dir)?;
        let mut arena = LevelArena::with_budget(self.settings.arena_bytes);
        let level = level_init(
            &mut arena,
            self.settings.tiles_wide,
            self.settings.tiles_high,
            self.settings.tile_size,
            texture,
            ctx.viewport,
            self.settings.level,
        )?;
        info!(
            arena_used_bytes = arena.used_bytes(),
            arena_budget_bytes = arena.budget_bytes(),
            "level_arena_usage"
        );
        self.level = Some(level);
        self.mode = GameMode::default();
        self.save_path = ctx.paths.saves_dir.join(SAVE_FILE_NAME);
        Ok(())
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.was_pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        if input.was_pressed(InputAction::Restart) && input.is_down(InputAction::Modifier) {
            info!(mode = %self.mode, "level_reload_requested");
            return SceneCommand::Restart;
        }
        let Some(mut level) = self.level.take() else {
            return SceneCommand::None;
        };

        if input.was_pressed(InputAction::Save) {
            self.save(&level);
        }
        if input.was_pressed(InputAction::Load) {
            match Self::load_into(&self.save_path, &mut level) {
                Ok(tiles) => info!(path = %self.save_path.display(), tiles, "snapshot_loaded"),
                Err(error) => warn!(
                    path = %self.save_path.display(),
                    error = %error,
                    "load_failed"
                ),
            }
        }
        if input.was_pressed(InputAction::Restart) && self.mode == GameMode::GameOver {
            level.respawn();
            self.set_mode(ModeEvent::Restart);
        }
        if input.was_pressed(InputAction::ToggleMode) {
            self.set_mode(ModeEvent::Toggle);
        }

        if let Some(level_mode) = self.mode.level_mode() {
            let report = level_update(&mut level, level_mode, fixed_dt_seconds, input);
            if report.fell_out_of_bounds {
                self.set_mode(ModeEvent::FellOut);
            }
        }
        self.level = Some(level);
        SceneCommand::None
    }

    fn render(&mut self) -> DrawList {
        let Some(level) = &self.level else {
            let mut list = DrawList::new(Camera2D::default(), Viewport::default());
            list.clear(Color::BACKGROUND);
            return list;
        };
        let mut list = level_render(level, self.mode.level_mode().unwrap_or(LevelMode::Play));
        if self.mode == GameMode::GameOver {
            let viewport = level.viewport();
            list.outline_rect(
                DrawSpace::Screen,
                Rect::new(0.0, 0.0, viewport.width as f32, viewport.height as f32),
                GAME_OVER_FRAME_PX,
                GAME_OVER_FRAME,
            );
        }
        list
    }

    fn unload(&mut self) {
        self.level = None;
        self.mode = GameMode::default();
        info!("scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let metrics = self.metrics.snapshot();
        let projectiles = self
            .level
            .as_ref()
            .map_or(0, |level| level.projectiles().len());
        Some(format!(
            "Tilejump | {} | {:.0} fps | {:.0} tps | projectiles {}",
            self.mode, metrics.fps, metrics.tps, projectiles
        ))
    }
}
